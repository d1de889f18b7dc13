//! Graph storage backends.
//!
//! # Available Backends
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | [`SqliteGraphStore`] | Default; embedded | Semi-join subqueries for traversal |
//!
//! # Example
//!
//! ```rust,ignore
//! use depstore::storage::graph::{GraphStore, SqliteGraphStore};
//! use depstore::models::graph::GraphItem;
//!
//! let store = SqliteGraphStore::new("graph.db")?;
//! store.put(&GraphItem::node("modules", b"a".to_vec(), 1, 0, Vec::new()))?;
//! ```

mod sqlite;

pub use sqlite::SqliteGraphStore;

// Re-export trait for convenience
pub use crate::storage::traits::GraphStore;
