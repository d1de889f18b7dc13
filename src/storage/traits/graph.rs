//! Graph store trait: the public contract of the dependency graph layer.
//!
//! # Available Implementations
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | `SqliteGraphStore` | Default; embedded | Semi-join subqueries for traversal |
//!
//! # Error Modes and Guarantees
//!
//! All operations return `Result<T>` with errors propagated via
//! [`crate::Error`]. Nothing is retried at this layer; every failure reaches
//! the caller with enough detail to distinguish a key collision, a miss, a
//! store invariant violation, and an engine failure.
//!
//! | Operation | Behavior on failure |
//! |-----------|---------------------|
//! | `put` | Atomic single statement; no partial effects |
//! | `find_by_primary` / `find_by_secondary` | Zero rows is `NotFound`, multiple rows is `Integrity` |
//! | `find_upstream` / `find_downstream` | A row decode failure discards partial results and aborts |
//!
//! # Example
//!
//! ```rust,ignore
//! use depstore::models::graph::{GraphItem, PrimaryKey};
//! use depstore::storage::traits::GraphStore;
//!
//! store.put(&GraphItem::node("modules", b"a".to_vec(), 1, 0, Vec::new()))?;
//! let neighbors = store.find_upstream(b"a")?;
//! ```

use crate::Result;
use crate::models::graph::{GraphItem, PrimaryKey, SecondaryKey};

/// Trait for graph layer backends.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn GraphStore>`
/// - Use interior mutability (e.g., `Mutex<Connection>`) for mutable state
/// - Every operation is a single independent round trip; callers must not
///   assume read-after-write guarantees beyond the backend's default
///   isolation level
/// - Concurrent `put` calls racing on the same key are serialized by the
///   backend's uniqueness constraints: exactly one wins
pub trait GraphStore: Send + Sync {
    /// Inserts exactly one record. Records are write-once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConstraintViolation`] when the item's primary
    /// key `(item_type, k1, k2)` or secondary key `(item_type, k1, version)`
    /// already exists, and [`crate::Error::Backend`] for any engine failure.
    fn put(&self, item: &GraphItem) -> Result<()>;

    /// Looks up the unique record matching `(item_type, k1, k2)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when no record matches and
    /// [`crate::Error::Integrity`] when more than one row matches a key the
    /// schema defines as unique.
    fn find_by_primary(&self, key: &PrimaryKey) -> Result<GraphItem>;

    /// Looks up the unique record matching `(item_type, k1, version)`.
    ///
    /// # Errors
    ///
    /// Same contract as [`GraphStore::find_by_primary`].
    fn find_by_secondary(&self, key: &SecondaryKey) -> Result<GraphItem>;

    /// Returns the node records of every distinct target reachable by one
    /// outgoing edge from `node_id`.
    ///
    /// Self-loop rows (`k1 == k2` at the edge position) are node records,
    /// never edges, and are excluded from traversal. The result order is
    /// unspecified and the result may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Backend`] if the query or a row decode fails.
    fn find_upstream(&self, node_id: &[u8]) -> Result<Vec<GraphItem>>;

    /// Returns the node records of every distinct source with one edge into
    /// `node_id`. The mirror of [`GraphStore::find_upstream`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Backend`] if the query or a row decode fails.
    fn find_downstream(&self, node_id: &[u8]) -> Result<Vec<GraphItem>>;
}
