//! Client-facing filtering and pagination.
//!
//! The backend cannot filter or page server-side; both are recomputed over a
//! full in-memory table fetch on every call.

use crate::models::Product;
use serde::{Deserialize, Serialize};
use stockroom_core::{Warehouse, MAX_PAGE_SIZE};

/// One window of a filtered listing.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    /// Matching items across all pages.
    pub total_items: usize,
    pub total_pages: usize,
}

/// Window a filtered, in-memory sequence.
///
/// `page` is 1-based and clamped to at least 1; `page_size` is clamped to
/// `1..=MAX_PAGE_SIZE`. A page past the end is empty but keeps the totals.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items: Vec<T> = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Multi-field product filter: warehouse partition plus case-insensitive
/// substring matches, all conjunctive.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub warehouse: Option<Warehouse>,
    pub reference: Option<String>,
    pub brand: Option<String>,
    pub campaign: Option<String>,
    pub date: Option<String>,
    /// Matched against the decimal rendering of the stock count.
    pub stock: Option<String>,
    pub location: Option<String>,
    pub typology: Option<String>,
}

impl ProductFilter {
    /// Partition by warehouse only.
    pub fn for_warehouse(warehouse: Warehouse) -> Self {
        Self {
            warehouse: Some(warehouse),
            ..Self::default()
        }
    }

    /// Whether a product passes every set field.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(warehouse) = self.warehouse {
            if product.warehouse != warehouse {
                return false;
            }
        }

        contains_opt(&self.reference, &product.reference)
            && contains_opt(&self.brand, &product.brand)
            && contains_opt(&self.campaign, &product.campaign)
            && contains_opt(&self.date, &product.date)
            && contains_opt(&self.stock, &product.stock.to_string())
            && contains_opt(&self.location, &product.location)
            && contains_opt(&self.typology, &product.typology)
    }
}

fn contains_opt(needle: &Option<String>, haystack: &str) -> bool {
    match needle {
        None => true,
        Some(needle) if needle.trim().is_empty() => true,
        Some(needle) => haystack
            .to_lowercase()
            .contains(&needle.trim().to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_splits_25_items_into_10_10_5() {
        let items: Vec<u32> = (0..25).collect();

        let first = paginate(items.clone(), 1, 10);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_items, 25);
        assert_eq!(first.total_pages, 3);

        let second = paginate(items.clone(), 2, 10);
        assert_eq!(second.items, (10..20).collect::<Vec<u32>>());

        let third = paginate(items, 3, 10);
        assert_eq!(third.items, (20..25).collect::<Vec<u32>>());
    }

    #[test]
    fn test_paginate_covers_each_item_exactly_once() {
        let items: Vec<u32> = (0..25).collect();
        let mut seen = Vec::new();
        for page in 1..=3 {
            seen.extend(paginate(items.clone(), page, 10).items);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn test_paginate_past_the_end_is_empty_with_totals() {
        let page = paginate(vec![1, 2, 3], 5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_paginate_clamps_page_and_size() {
        let page = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![1]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let product = sample(Warehouse::One);
        assert!(ProductFilter::default().matches(&product));
    }

    #[test]
    fn test_warehouse_partition_is_exact() {
        let filter = ProductFilter::for_warehouse(Warehouse::Two);
        assert!(!filter.matches(&sample(Warehouse::One)));
        assert!(filter.matches(&sample(Warehouse::Two)));
    }

    #[test]
    fn test_substring_filters_are_case_insensitive_and_conjunctive() {
        let product = sample(Warehouse::One);

        let filter = ProductFilter {
            brand: Some("acme".to_string()),
            typology: Some("BAN".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product));

        let filter = ProductFilter {
            brand: Some("acme".to_string()),
            typology: Some("poster".to_string()),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product));
    }

    #[test]
    fn test_stock_matches_as_string() {
        let product = sample(Warehouse::One);
        let filter = ProductFilter {
            stock: Some("4".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product));
    }

    fn sample(warehouse: Warehouse) -> Product {
        Product {
            reference: "SKU-9".to_string(),
            image_url: String::new(),
            height: "100".to_string(),
            width: "50".to_string(),
            brand: "Acme".to_string(),
            campaign: "Natal".to_string(),
            date: "2025-12-01".to_string(),
            stock: 42,
            location: "B-07".to_string(),
            typology: "Banner".to_string(),
            notes: String::new(),
            warehouse,
        }
    }
}
