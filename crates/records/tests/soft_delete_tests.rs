//! Integration tests for the soft-delete/restore/purge lifecycle.

mod common;

use common::{actor, fresh_service, memory_store, product, service};
use stockroom_core::Warehouse;
use stockroom_records::{RecordError, TableRecord};
use stockroom_rowstore::RowStore;

#[tokio::test]
async fn test_soft_delete_moves_record_to_trash() {
    let store = memory_store();
    let service = service(&store);
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    let removed = service.soft_delete(&actor(), "SKU-1").await.unwrap();
    assert_eq!(removed.reference, "SKU-1");

    assert!(service.get_record("SKU-1").await.unwrap().is_none());
    let trash = service.list_trash().await.unwrap();
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0], product("SKU-1", Warehouse::One));

    assert_eq!(store.row_count("Inventory").await, 0);
    assert_eq!(store.row_count("InventoryTrash").await, 1);
}

#[tokio::test]
async fn test_soft_delete_then_restore_round_trip() {
    let service = fresh_service();
    let original = product("SKU-1", Warehouse::Two);
    service
        .create_record(&actor(), original.clone())
        .await
        .unwrap();

    service.soft_delete(&actor(), "SKU-1").await.unwrap();
    let restored = service.restore(&actor(), "SKU-1").await.unwrap();

    assert_eq!(restored, original);
    assert_eq!(
        service.get_record("SKU-1").await.unwrap().unwrap(),
        original
    );
    assert!(service.list_trash().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_soft_delete_missing_reference_is_not_found() {
    let service = fresh_service();
    let err = service.soft_delete(&actor(), "SKU-404").await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
}

#[tokio::test]
async fn test_restore_missing_reference_is_not_found() {
    let service = fresh_service();
    let err = service.restore(&actor(), "SKU-404").await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
}

#[tokio::test]
async fn test_purge_is_terminal() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();
    service.soft_delete(&actor(), "SKU-1").await.unwrap();

    service.purge(&actor(), "SKU-1").await.unwrap();

    assert!(service.get_record("SKU-1").await.unwrap().is_none());
    assert!(service.list_trash().await.unwrap().is_empty());

    let err = service.purge(&actor(), "SKU-1").await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
}

#[tokio::test]
async fn test_purge_only_consults_the_trash_table() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    // Never soft-deleted, so there is nothing to purge.
    let err = service.purge(&actor(), "SKU-1").await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(_)));
    assert!(service.get_record("SKU-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_trashed_copy_may_coexist_with_new_active_record() {
    let service = fresh_service();
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();
    service.soft_delete(&actor(), "SKU-1").await.unwrap();

    // Uniqueness applies to the active table only.
    let mut replacement = product("SKU-1", Warehouse::One);
    replacement.stock = 1;
    service
        .create_record(&actor(), replacement)
        .await
        .unwrap();

    assert!(service.get_record("SKU-1").await.unwrap().is_some());
    assert_eq!(service.list_trash().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconcile_reports_keys_present_in_both_tables() {
    let store = memory_store();
    let service = service(&store);
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();
    service
        .create_record(&actor(), product("SKU-2", Warehouse::One))
        .await
        .unwrap();

    assert!(service.reconcile_products().await.unwrap().is_empty());

    // Simulate a move that stopped after its append step.
    store
        .append_rows(
            "InventoryTrash",
            vec![product("SKU-2", Warehouse::One).to_row()],
        )
        .await
        .unwrap();

    let duplicates = service.reconcile_products().await.unwrap();
    assert_eq!(duplicates, vec!["SKU-2".to_string()]);
}

#[tokio::test]
async fn test_half_completed_move_is_recoverable_through_restore() {
    // A move that crashed between append and delete leaves the key in both
    // tables. Repair path: reconcile finds it, purge-or-restore resolves it.
    let store = memory_store();
    let service = service(&store);
    service
        .create_record(&actor(), product("SKU-1", Warehouse::One))
        .await
        .unwrap();

    // The append step landed, the delete step never ran.
    store
        .append_rows(
            "InventoryTrash",
            vec![product("SKU-1", Warehouse::One).to_row()],
        )
        .await
        .unwrap();

    assert_eq!(
        service.reconcile_products().await.unwrap(),
        vec!["SKU-1".to_string()]
    );

    // Retrying the delete-from-trash side via purge resolves the duplicate.
    service.purge(&actor(), "SKU-1").await.unwrap();
    assert!(service.reconcile_products().await.unwrap().is_empty());
    assert!(service.get_record("SKU-1").await.unwrap().is_some());
}
