//! # Depstore
//!
//! A persistent dependency graph store backed by `SQLite`.
//!
//! Depstore keeps graph nodes and directed edges in a single uniformly-keyed
//! table and exposes point lookups plus one-hop adjacency traversal. A record
//! whose source and target identifiers coincide is a **node**; a record whose
//! identifiers differ is a **directed edge** from source to target. The crate
//! makes that distinction explicit through [`models::graph::ItemKind`] rather
//! than leaving it implicit in the key fields.
//!
//! ## Example
//!
//! ```rust,ignore
//! use depstore::models::graph::{GraphItem, PrimaryKey};
//! use depstore::storage::graph::{GraphStore, SqliteGraphStore};
//!
//! let store = SqliteGraphStore::new("graph.db")?;
//! let node = GraphItem::node("modules", b"a".to_vec(), 1, 0, b"node a".to_vec());
//! store.put(&node)?;
//! let found = store.find_by_primary(&PrimaryKey::from(&node))?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod models;
pub mod storage;

// Re-exports for convenience
pub use models::graph::{GraphItem, ItemKind, PrimaryKey, SecondaryKey};
pub use storage::graph::{GraphStore, SqliteGraphStore};

/// Error type for depstore operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Constructing a malformed item (e.g. a self-loop edge) |
/// | `ConstraintViolation` | An insert collides with an existing primary or secondary key |
/// | `NotFound` | A point lookup matches zero rows |
/// | `Integrity` | A point lookup matches more than one row for a unique key |
/// | `Backend` | `SQLite` failures (connectivity, statement, row decode) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when an edge is constructed with identical source and target
    /// identifiers.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An insert collided with an existing primary or secondary key.
    ///
    /// Records are write-once: `put` never overwrites. The caller decides
    /// whether to retry with a new version or treat the collision as terminal.
    #[error("constraint violation: a record already exists for {key}")]
    ConstraintViolation {
        /// Rendered key of the item whose insert collided.
        key: String,
    },

    /// A point lookup matched zero rows.
    #[error("no record found for {key}")]
    NotFound {
        /// Rendered key that matched nothing.
        key: String,
    },

    /// A point lookup matched more than one row for a key defined as unique.
    ///
    /// Unreachable when the backend enforces its uniqueness constraints;
    /// surfaced distinctly from [`Error::NotFound`] so callers can treat it
    /// as store corruption rather than an ordinary miss.
    #[error("integrity violation: {key} matched {rows} rows, expected exactly one")]
    Integrity {
        /// Rendered key that matched multiple rows.
        key: String,
        /// Number of rows the lookup returned.
        rows: usize,
    },

    /// A storage engine operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statement execution or preparation fails
    /// - A result row cannot be decoded into a [`GraphItem`]
    /// - The database cannot be opened or initialized
    #[error("backend operation '{operation}' failed: {cause}")]
    Backend {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for depstore operations.
pub type Result<T> = std::result::Result<T, Error>;
