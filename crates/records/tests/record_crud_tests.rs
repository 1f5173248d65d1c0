//! Integration tests for keyed record CRUD.

mod common;

use common::{actor, fresh_service, product};
use stockroom_core::Warehouse;
use stockroom_records::{Campaign, CampaignStatus, RecordError};

#[tokio::test]
async fn test_create_then_find_round_trip() {
    let service = fresh_service();
    let created = service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    let found = service.get_record("SKU-1").await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found, product("SKU-1", Warehouse::One));
}

#[tokio::test]
async fn test_find_absent_reference_is_none() {
    let service = fresh_service();
    assert!(service.get_record("SKU-404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_rejects_empty_reference() {
    let service = fresh_service();
    let mut bad = product("SKU-1", Warehouse::One);
    bad.reference = "   ".to_string();

    let err = service.create_record(&actor(), bad).await.unwrap_err();
    assert!(matches!(err, RecordError::Validation(_)));
}

#[tokio::test]
async fn test_create_rejects_duplicate_reference() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    let err = service
        .create_record(&actor(), product("SKU-1", Warehouse::Two))
        .await
        .unwrap_err();
    match err {
        RecordError::DuplicateKey(key) => assert_eq!(key, "SKU-1"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_overwrites_the_whole_row() {
    // The store has no partial update: fields the caller does not carry
    // forward are gone after update.
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    let mut partial = product("SKU-1", Warehouse::One);
    partial.stock = 3;
    partial.notes = String::new();
    partial.brand = String::new();

    service
        .update_record(&actor(), "SKU-1", partial.clone())
        .await
        .unwrap();

    let stored = service.get_record("SKU-1").await.unwrap().unwrap();
    assert_eq!(stored, partial);
    assert_eq!(stored.notes, "");
    assert_eq!(stored.brand, "");
}

#[tokio::test]
async fn test_update_missing_reference_is_not_found() {
    let service = fresh_service();
    let err = service
        .update_record(&actor(), "SKU-404", product("SKU-404", Warehouse::One))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
}

#[tokio::test]
async fn test_update_with_merges_against_stored_state() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    service
        .products()
        .update_with("SKU-1", |mut stored| {
            stored.stock = 99;
            stored
        })
        .await
        .unwrap();

    let stored = service.get_record("SKU-1").await.unwrap().unwrap();
    assert_eq!(stored.stock, 99);
    // Everything else survived the merge.
    assert_eq!(stored.notes, "fragile");
    assert_eq!(stored.brand, "Acme");
}

#[tokio::test]
async fn test_update_can_rename_unless_target_exists() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();
    service
        .create_record(&actor(), product("SKU-2", Warehouse::One))
        .await
        .unwrap();

    // Renaming onto an existing key is rejected.
    let err = service
        .update_record(&actor(), "SKU-1", product("SKU-2", Warehouse::One))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::DuplicateKey(_)));

    // Renaming onto a free key works and frees the old one.
    service
        .update_record(&actor(), "SKU-1", product("SKU-3", Warehouse::One))
        .await
        .unwrap();
    assert!(service.get_record("SKU-1").await.unwrap().is_none());
    assert!(service.get_record("SKU-3").await.unwrap().is_some());
}

#[tokio::test]
async fn test_campaign_crud_round_trip() {
    let service = fresh_service();
    let campaign = Campaign {
        id: "CMP-1".to_string(),
        name: "Inverno".to_string(),
        brand_id: "Acme".to_string(),
        start_date: "2025-06-01".to_string(),
        end_date: "2025-08-31".to_string(),
        description: "Campanha de inverno".to_string(),
        status: CampaignStatus::Planejado,
    };

    service
        .create_campaign(&actor(), campaign.clone())
        .await
        .unwrap();
    assert_eq!(
        service.get_campaign("CMP-1").await.unwrap().unwrap(),
        campaign
    );

    let mut updated = campaign.clone();
    updated.status = CampaignStatus::Ativo;
    service
        .update_campaign(&actor(), "CMP-1", updated.clone())
        .await
        .unwrap();
    assert_eq!(
        service.get_campaign("CMP-1").await.unwrap().unwrap().status,
        CampaignStatus::Ativo
    );

    service.delete_campaign(&actor(), "CMP-1").await.unwrap();
    assert!(service.get_campaign("CMP-1").await.unwrap().is_none());

    let err = service.delete_campaign(&actor(), "CMP-1").await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
}

#[tokio::test]
async fn test_undecodable_rows_are_skipped_not_fatal() {
    use stockroom_rowstore::RowStore;

    let store = common::memory_store();
    let service = common::service(&store);
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    // A hand-edited row with a bad warehouse tag must not wedge the table.
    store
        .append_rows(
            "Inventory",
            vec![vec!["SKU-BAD".to_string(), String::new(), String::new()]],
        )
        .await
        .unwrap();

    let listed = service.products().list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reference, "SKU-1");
}
