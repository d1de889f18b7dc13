//! Graph store integration tests.
//!
//! Exercises the on-disk store end to end: insert → lookup round trips,
//! adjacency traversal, persistence across reopen, and the concurrent
//! insert race on a shared key.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use depstore::models::graph::{GraphItem, ItemKind, PrimaryKey, SecondaryKey};
use depstore::storage::graph::{GraphStore, SqliteGraphStore};
use depstore::Error;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// Helper to create an on-disk store for testing.
fn create_store(temp_dir: &TempDir) -> SqliteGraphStore {
    let db_path = temp_dir.path().join("graph.db");
    SqliteGraphStore::new(&db_path).expect("Failed to create graph store")
}

#[test]
fn test_round_trip_by_primary_and_secondary() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);

    let item = GraphItem::node("modules", b"parser".to_vec(), 4, 1, b"payload".to_vec());
    store.put(&item).unwrap();

    let by_primary = store.find_by_primary(&PrimaryKey::from(&item)).unwrap();
    assert_eq!(by_primary, item);

    let by_secondary = store
        .find_by_secondary(&SecondaryKey::from(&item))
        .unwrap();
    assert_eq!(by_secondary, item);
}

#[test]
fn test_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("graph.db");

    let item = GraphItem::node("modules", b"keep".to_vec(), 1, 0, b"kept".to_vec());
    {
        let store = SqliteGraphStore::new(&db_path).unwrap();
        store.put(&item).unwrap();
    }

    // Table creation is idempotent; reopening must not disturb the data.
    let reopened = SqliteGraphStore::new(&db_path).unwrap();
    let found = reopened.find_by_primary(&PrimaryKey::from(&item)).unwrap();
    assert_eq!(found, item);
}

#[test]
fn test_adjacency_traversal() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);

    store
        .put(&GraphItem::node("g", b"A".to_vec(), 1, 0, b"nodeA".to_vec()))
        .unwrap();
    store
        .put(&GraphItem::node("g", b"B".to_vec(), 1, 0, b"nodeB".to_vec()))
        .unwrap();
    // The edge's version must differ from node A's: both share the
    // (item_type, k1, version) secondary key slot.
    store
        .put(&GraphItem::edge("g", b"A".to_vec(), b"B".to_vec(), 2, 0, b"edge".to_vec()).unwrap())
        .unwrap();

    let upstream = store.find_upstream(b"A").unwrap();
    assert_eq!(upstream.len(), 1);
    assert_eq!(upstream[0].kind(), ItemKind::Node);
    assert_eq!(upstream[0].data(), b"nodeB");

    let downstream = store.find_downstream(b"B").unwrap();
    assert_eq!(downstream.len(), 1);
    assert_eq!(downstream[0].data(), b"nodeA");

    assert!(store.find_upstream(b"B").unwrap().is_empty());
    assert!(store.find_downstream(b"A").unwrap().is_empty());
}

#[test]
fn test_write_once_semantics() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);

    let original = GraphItem::node("g", b"n".to_vec(), 1, 0, b"original".to_vec());
    store.put(&original).unwrap();

    let overwrite = GraphItem::node("g", b"n".to_vec(), 2, 0, b"overwrite".to_vec());
    let err = store.put(&overwrite).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation { .. }));

    // No partial effects: the original record is intact and the collided
    // insert left nothing behind under its secondary key.
    let found = store.find_by_primary(&PrimaryKey::from(&original)).unwrap();
    assert_eq!(found.data(), b"original");

    let err = store
        .find_by_secondary(&SecondaryKey::new("g", b"n".to_vec(), 2))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_concurrent_insert_race() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(create_store(&temp_dir));

    let contenders = 4;
    let mut handles = Vec::with_capacity(contenders);
    for i in 0..contenders {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            let item = GraphItem::node(
                "race",
                b"contested".to_vec(),
                1,
                0,
                format!("writer-{i}").into_bytes(),
            );
            store.put(&item)
        }));
    }

    let mut wins = 0;
    let mut violations = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(()) => wins += 1,
            Err(Error::ConstraintViolation { .. }) => violations += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(violations, contenders - 1);

    // Exactly one record exists afterward.
    let key = PrimaryKey::new("race", b"contested".to_vec(), b"contested".to_vec());
    let winner = store.find_by_primary(&key).unwrap();
    assert!(winner.data().starts_with(b"writer-"));
}

#[test]
fn test_graph_store_is_object_safe() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn GraphStore> = Arc::new(create_store(&temp_dir));

    let item = GraphItem::node("g", b"dyn".to_vec(), 1, 0, Vec::new());
    store.put(&item).unwrap();
    assert!(store.find_by_primary(&PrimaryKey::from(&item)).is_ok());
}
