//! Integration tests for the client-facing query layer.

mod common;

use common::{actor, fresh_service, product};
use stockroom_core::Warehouse;
use stockroom_records::ProductFilter;

#[tokio::test]
async fn test_25_records_page_as_10_10_5() {
    let service = fresh_service();
    for i in 0..25 {
        service
            .create_record(&actor(), product(&format!("SKU-{i:02}"), Warehouse::One))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = service
            .list_products(&ProductFilter::default(), page, Some(10))
            .await
            .unwrap();
        assert_eq!(result.total_items, 25);
        assert_eq!(result.total_pages, 3);
        let expected_len = if page == 3 { 5 } else { 10 };
        assert_eq!(result.items.len(), expected_len);
        seen.extend(result.items.into_iter().map(|p| p.reference));
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 25, "each matching record appears exactly once");
}

#[tokio::test]
async fn test_warehouse_partition() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();
    service
        .create_record(&actor(), product("SKU-2", Warehouse::Two))
        .await
        .unwrap();
    service
        .create_record(&actor(), product("SKU-3", Warehouse::Two))
        .await
        .unwrap();

    let page = service
        .list_products(&ProductFilter::for_warehouse(Warehouse::Two), 1, Some(10))
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
    assert!(page.items.iter().all(|p| p.warehouse == Warehouse::Two));
}

#[tokio::test]
async fn test_substring_filters_narrow_the_listing() {
    let service = fresh_service();
    let mut a = product("SKU-1", Warehouse::One);
    a.brand = "Acme".to_string();
    let mut b = product("SKU-2", Warehouse::One);
    b.brand = "Globex".to_string();
    service.create_record(&actor(), a).await.unwrap();
    service.create_record(&actor(), b).await.unwrap();

    let filter = ProductFilter {
        brand: Some("glo".to_string()),
        ..ProductFilter::default()
    };
    let page = service.list_products(&filter, 1, Some(10)).await.unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].reference, "SKU-2");
}

#[tokio::test]
async fn test_stock_filter_matches_decimal_rendering() {
    let service = fresh_service();
    let mut a = product("SKU-1", Warehouse::One);
    a.stock = 140;
    let mut b = product("SKU-2", Warehouse::One);
    b.stock = 7;
    service.create_record(&actor(), a).await.unwrap();
    service.create_record(&actor(), b).await.unwrap();

    let filter = ProductFilter {
        stock: Some("14".to_string()),
        ..ProductFilter::default()
    };
    let page = service.list_products(&filter, 1, Some(10)).await.unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].reference, "SKU-1");
}

#[tokio::test]
async fn test_default_page_size_applies_when_caller_omits_it() {
    let service = fresh_service();
    for i in 0..12 {
        service
            .create_record(&actor(), product(&format!("SKU-{i:02}"), Warehouse::One))
            .await
            .unwrap();
    }

    let page = service
        .list_products(&ProductFilter::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(page.page_size, stockroom_core::DEFAULT_PAGE_SIZE);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_filtering_recomputes_on_every_fetch() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    let before = service
        .list_products(&ProductFilter::default(), 1, Some(10))
        .await
        .unwrap();
    assert_eq!(before.total_items, 1);

    service.soft_delete(&actor(), "SKU-1").await.unwrap();

    let after = service
        .list_products(&ProductFilter::default(), 1, Some(10))
        .await
        .unwrap();
    assert_eq!(after.total_items, 0);
}
