//! Shared fixtures for records integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use stockroom_core::{Actor, Warehouse};
use stockroom_records::{InventoryService, Product};
use stockroom_rowstore::{MemoryBackend, RowStore};

/// Fresh in-memory backend, kept as the concrete type so tests can inspect
/// raw table state alongside the repositories.
pub fn memory_store() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new())
}

/// Service over the given backend.
pub fn service(store: &Arc<MemoryBackend>) -> InventoryService {
    InventoryService::new(store.clone() as Arc<dyn RowStore>)
}

/// Service over a throwaway backend.
pub fn fresh_service() -> InventoryService {
    service(&memory_store())
}

pub fn actor() -> Actor {
    Actor::for_testing()
}

/// A fully-populated product under the given reference.
pub fn product(reference: &str, warehouse: Warehouse) -> Product {
    Product {
        reference: reference.to_string(),
        image_url: format!("https://img.example.com/{reference}.jpg"),
        height: "120".to_string(),
        width: "80".to_string(),
        brand: "Acme".to_string(),
        campaign: "Natal 2025".to_string(),
        date: "2025-11-02".to_string(),
        stock: 14,
        location: "A-03".to_string(),
        typology: "Banner".to_string(),
        notes: "fragile".to_string(),
        warehouse,
    }
}
