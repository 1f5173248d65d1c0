//! Facade wiring repositories, reference sets, and the audit trail.

use crate::activity::{ActivityLog, LogFilter};
use crate::error::RecordResult;
use crate::keyed::KeyedRepository;
use crate::locks::TableLocks;
use crate::models::{
    ActivityAction, ActivityLogEntry, Campaign, ChangeSet, EntityKind, Product, RackEntry,
};
use crate::query::{paginate, Page, ProductFilter};
use crate::reference::{RackSet, ReferenceSet};
use crate::tables::{BRANDS, TYPOLOGIES};
use serde::Serialize;
use std::sync::Arc;
use stockroom_core::{Actor, QueryConfig, Warehouse};
use stockroom_rowstore::RowStore;

/// The operations surface consumed by UI and API routes.
///
/// Holds one injected row store and one lock registry shared by every
/// repository, so all writers to a table serialize through the same mutex.
/// Every mutating operation takes the authenticated [`Actor`] and emits one
/// audit entry after the primary mutation succeeds. Audit appends are
/// best-effort: a failed append is logged and swallowed, never rolled into
/// the outcome of the mutation that triggered it.
pub struct InventoryService {
    store: Arc<dyn RowStore>,
    products: KeyedRepository<Product>,
    campaigns: KeyedRepository<Campaign>,
    brands: ReferenceSet,
    typologies: ReferenceSet,
    racks: RackSet,
    activity: ActivityLog,
    default_page_size: usize,
}

impl InventoryService {
    /// Create a service with default query settings.
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_config(store, &QueryConfig::default())
    }

    /// Create a service with explicit query settings.
    pub fn with_config(store: Arc<dyn RowStore>, query: &QueryConfig) -> Self {
        let locks = TableLocks::new();
        Self {
            products: KeyedRepository::new(store.clone(), locks.clone()),
            campaigns: KeyedRepository::new(store.clone(), locks.clone()),
            brands: ReferenceSet::new(store.clone(), locks.clone(), &BRANDS),
            typologies: ReferenceSet::new(store.clone(), locks.clone(), &TYPOLOGIES),
            racks: RackSet::new(store.clone(), locks),
            activity: ActivityLog::new(store.clone()),
            store,
            default_page_size: query.default_page_size,
        }
    }

    /// Direct access to the product repository.
    pub fn products(&self) -> &KeyedRepository<Product> {
        &self.products
    }

    /// Direct access to the campaign repository.
    pub fn campaigns(&self) -> &KeyedRepository<Campaign> {
        &self.campaigns
    }

    /// Verify backend connectivity.
    pub async fn health_check(&self) -> RecordResult<()> {
        self.store.health_check().await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product and audit it.
    pub async fn create_record(&self, actor: &Actor, product: Product) -> RecordResult<Product> {
        let stored = self.products.create(&product).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Added,
            EntityKind::Product,
            &stored.reference,
            ChangeSet::added(snapshot(&stored)),
            actor,
        ))
        .await;
        Ok(stored)
    }

    /// Find a product by reference.
    pub async fn get_record(&self, reference: &str) -> RecordResult<Option<Product>> {
        self.products.find_by_key(reference).await
    }

    /// Overwrite a product in full and audit the before/after pair.
    ///
    /// The stored row is replaced by `product` as given; callers merge old
    /// and new state before calling.
    pub async fn update_record(
        &self,
        actor: &Actor,
        reference: &str,
        product: Product,
    ) -> RecordResult<Product> {
        let before = self.products.find_by_key(reference).await?;
        let stored = self.products.update(reference, &product).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Edited,
            EntityKind::Product,
            &stored.reference,
            ChangeSet {
                before: before.map(|b| snapshot(&b)),
                after: Some(snapshot(&stored)),
            },
            actor,
        ))
        .await;
        Ok(stored)
    }

    /// Move a product to the trash table and audit it.
    pub async fn soft_delete(&self, actor: &Actor, reference: &str) -> RecordResult<Product> {
        let removed = self.products.soft_delete(reference).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Deleted,
            EntityKind::Product,
            &removed.reference,
            ChangeSet::deleted(snapshot(&removed)),
            actor,
        ))
        .await;
        Ok(removed)
    }

    /// Move a product back from the trash table and audit it.
    pub async fn restore(&self, actor: &Actor, reference: &str) -> RecordResult<Product> {
        let restored = self.products.restore(reference).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Added,
            EntityKind::Product,
            &restored.reference,
            ChangeSet::added(snapshot(&restored)),
            actor,
        ))
        .await;
        Ok(restored)
    }

    /// Permanently remove a product from the trash table and audit it.
    pub async fn purge(&self, actor: &Actor, reference: &str) -> RecordResult<()> {
        let trashed = self.products.find_in_trash(reference).await?;
        self.products.purge(reference).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Deleted,
            EntityKind::Product,
            reference,
            ChangeSet {
                before: trashed.map(|t| snapshot(&t)),
                after: None,
            },
            actor,
        ))
        .await;
        Ok(())
    }

    /// Filtered, paginated product listing.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: usize,
        page_size: Option<usize>,
    ) -> RecordResult<Page<Product>> {
        let products: Vec<Product> = self
            .products
            .list()
            .await?
            .into_iter()
            .filter(|product| filter.matches(product))
            .collect();
        Ok(paginate(
            products,
            page,
            page_size.unwrap_or(self.default_page_size),
        ))
    }

    /// Every trashed product, in storage order.
    pub async fn list_trash(&self) -> RecordResult<Vec<Product>> {
        self.products.list_trash().await
    }

    /// Keys present in both the active and trash product tables.
    pub async fn reconcile_products(&self) -> RecordResult<Vec<String>> {
        self.products.reconcile().await
    }

    // =========================================================================
    // Campaigns
    // =========================================================================

    pub async fn create_campaign(&self, actor: &Actor, campaign: Campaign) -> RecordResult<Campaign> {
        let stored = self.campaigns.create(&campaign).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Added,
            EntityKind::Campaign,
            &stored.id,
            ChangeSet::added(snapshot(&stored)),
            actor,
        ))
        .await;
        Ok(stored)
    }

    pub async fn get_campaign(&self, id: &str) -> RecordResult<Option<Campaign>> {
        self.campaigns.find_by_key(id).await
    }

    pub async fn list_campaigns(&self) -> RecordResult<Vec<Campaign>> {
        self.campaigns.list().await
    }

    pub async fn update_campaign(
        &self,
        actor: &Actor,
        id: &str,
        campaign: Campaign,
    ) -> RecordResult<Campaign> {
        let before = self.campaigns.find_by_key(id).await?;
        let stored = self.campaigns.update(id, &campaign).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Edited,
            EntityKind::Campaign,
            &stored.id,
            ChangeSet {
                before: before.map(|b| snapshot(&b)),
                after: Some(snapshot(&stored)),
            },
            actor,
        ))
        .await;
        Ok(stored)
    }

    /// Campaigns have no trash pair; deletion is permanent.
    pub async fn delete_campaign(&self, actor: &Actor, id: &str) -> RecordResult<()> {
        let removed = self.campaigns.delete(id).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Deleted,
            EntityKind::Campaign,
            &removed.id,
            ChangeSet::deleted(snapshot(&removed)),
            actor,
        ))
        .await;
        Ok(())
    }

    // =========================================================================
    // Reference sets
    // =========================================================================

    pub async fn list_brands(&self) -> RecordResult<Vec<String>> {
        self.brands.list().await
    }

    pub async fn add_brand(&self, actor: &Actor, name: &str) -> RecordResult<()> {
        self.brands.add(name).await?;
        self.audit(reference_entry(
            ActivityAction::Added,
            EntityKind::Brand,
            name,
            actor,
        ))
        .await;
        Ok(())
    }

    pub async fn remove_brand(&self, actor: &Actor, name: &str) -> RecordResult<()> {
        self.brands.remove(name).await?;
        self.audit(reference_entry(
            ActivityAction::Deleted,
            EntityKind::Brand,
            name,
            actor,
        ))
        .await;
        Ok(())
    }

    pub async fn list_typologies(&self) -> RecordResult<Vec<String>> {
        self.typologies.list().await
    }

    pub async fn add_typology(&self, actor: &Actor, name: &str) -> RecordResult<()> {
        self.typologies.add(name).await?;
        self.audit(reference_entry(
            ActivityAction::Added,
            EntityKind::Typology,
            name,
            actor,
        ))
        .await;
        Ok(())
    }

    pub async fn remove_typology(&self, actor: &Actor, name: &str) -> RecordResult<()> {
        self.typologies.remove(name).await?;
        self.audit(reference_entry(
            ActivityAction::Deleted,
            EntityKind::Typology,
            name,
            actor,
        ))
        .await;
        Ok(())
    }

    pub async fn list_racks(&self) -> RecordResult<Vec<RackEntry>> {
        self.racks.list().await
    }

    pub async fn list_racks_for_warehouse(
        &self,
        warehouse: Warehouse,
    ) -> RecordResult<Vec<RackEntry>> {
        self.racks.list_for_warehouse(warehouse).await
    }

    pub async fn add_rack(&self, actor: &Actor, entry: RackEntry) -> RecordResult<()> {
        self.racks.add(&entry).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Added,
            EntityKind::Rack,
            &entry.id,
            ChangeSet::added(snapshot(&entry)),
            actor,
        ))
        .await;
        Ok(())
    }

    pub async fn remove_rack(
        &self,
        actor: &Actor,
        id: &str,
        warehouse: Warehouse,
    ) -> RecordResult<()> {
        self.racks.remove(id, warehouse).await?;
        self.audit(ActivityLog::entry(
            ActivityAction::Deleted,
            EntityKind::Rack,
            id,
            ChangeSet::deleted(serde_json::json!({
                "id": id,
                "warehouse": warehouse.as_tag(),
            })),
            actor,
        ))
        .await;
        Ok(())
    }

    // =========================================================================
    // Audit trail
    // =========================================================================

    /// Append a caller-built log entry.
    pub async fn append_log_entry(&self, entry: &ActivityLogEntry) -> RecordResult<()> {
        self.activity.append(entry).await
    }

    /// Filtered, paginated log listing, newest first.
    pub async fn query_logs(
        &self,
        filter: &LogFilter,
        page: usize,
        page_size: Option<usize>,
    ) -> RecordResult<Page<ActivityLogEntry>> {
        self.activity
            .query(filter, page, page_size.unwrap_or(self.default_page_size))
            .await
    }

    /// Best-effort audit append; failures never affect the primary mutation.
    async fn audit(&self, entry: ActivityLogEntry) {
        if let Err(err) = self.activity.append(&entry).await {
            tracing::warn!(
                entity = %entry.entity_id,
                action = %entry.action.as_str(),
                error = %err,
                "audit append failed; primary mutation kept"
            );
        }
    }
}

fn snapshot<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn reference_entry(
    action: ActivityAction,
    entity_type: EntityKind,
    value: &str,
    actor: &Actor,
) -> ActivityLogEntry {
    let changes = match action {
        ActivityAction::Deleted => ChangeSet::deleted(serde_json::json!(value)),
        _ => ChangeSet::added(serde_json::json!(value)),
    };
    ActivityLog::entry(action, entity_type, value, changes, actor)
}
