//! Graph record types for the dependency graph store.
//!
//! A single record type, [`GraphItem`], represents both graph nodes and
//! directed edges. The two are distinguished by an explicit [`ItemKind`] tag
//! enforced at construction time, while the persisted form keeps the shared
//! identifier pair:
//!
//! | Kind | Identifier layout | Meaning |
//! |------|-------------------|---------|
//! | `Node` | `k1 == k2` | A node carrying payload data |
//! | `Edge` | `k1 != k2` | A directed edge from `k1` to `k2` |
//!
//! Records are addressed by one of two unique keys:
//!
//! - [`PrimaryKey`] — `(item_type, k1, k2)`, exact-record lookup
//! - [`SecondaryKey`] — `(item_type, k1, version)`, revision-indexed lookup
//!   when the target identifier is not known to the caller
//!
//! # Example
//!
//! ```rust
//! use depstore::models::graph::{GraphItem, ItemKind};
//!
//! let node = GraphItem::node("modules", b"a".to_vec(), 1, 0, b"node a".to_vec());
//! assert_eq!(node.kind(), ItemKind::Node);
//! assert_eq!(node.k1(), node.k2());
//!
//! let edge = GraphItem::edge("modules", b"a".to_vec(), b"b".to_vec(), 1, 0, Vec::new())
//!     .expect("distinct endpoints");
//! assert_eq!(edge.kind(), ItemKind::Edge);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of record held in the graph table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A node: source and target identifiers coincide.
    Node,
    /// A directed edge from the source identifier to a distinct target.
    Edge,
}

/// A single graph record: either a node or a directed edge.
///
/// Instances are immutable once constructed and write-once once stored; the
/// store never mutates or overwrites them. The `kind` tag is kept consistent
/// with the identifier pair by the [`GraphItem::node`] and [`GraphItem::edge`]
/// constructors, so a `GraphItem` in hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphItem {
    /// Namespace tag scoping keys and queries.
    item_type: String,
    /// Explicit node/edge discriminant.
    kind: ItemKind,
    /// Primary identifier (source for edges).
    k1: Vec<u8>,
    /// Secondary identifier (target for edges, equals `k1` for nodes).
    k2: Vec<u8>,
    /// Caller-assigned revision marker.
    version: u64,
    /// Payload serialization format tag, opaque to the store.
    encoding: u8,
    /// Opaque payload bytes.
    data: Vec<u8>,
}

impl GraphItem {
    /// Creates a node record. The target identifier is pinned to the node id.
    #[must_use]
    pub fn node(
        item_type: impl Into<String>,
        id: Vec<u8>,
        version: u64,
        encoding: u8,
        data: Vec<u8>,
    ) -> Self {
        Self {
            item_type: item_type.into(),
            kind: ItemKind::Node,
            k2: id.clone(),
            k1: id,
            version,
            encoding,
            data,
        }
    }

    /// Creates a directed edge record from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when `from == to`: a self-loop is not
    /// a valid edge and would be indistinguishable from a node record.
    pub fn edge(
        item_type: impl Into<String>,
        from: Vec<u8>,
        to: Vec<u8>,
        version: u64,
        encoding: u8,
        data: Vec<u8>,
    ) -> Result<Self> {
        if from == to {
            return Err(Error::InvalidInput(
                "self-loop edge: source and target identifiers are equal".to_string(),
            ));
        }
        Ok(Self {
            item_type: item_type.into(),
            kind: ItemKind::Edge,
            k1: from,
            k2: to,
            version,
            encoding,
            data,
        })
    }

    /// Reassembles an item from its persisted fields, deriving the kind from
    /// the identifier pair. Used by the row decoder.
    pub(crate) fn from_stored(
        item_type: String,
        k1: Vec<u8>,
        k2: Vec<u8>,
        version: u64,
        encoding: u8,
        data: Vec<u8>,
    ) -> Self {
        let kind = if k1 == k2 {
            ItemKind::Node
        } else {
            ItemKind::Edge
        };
        Self {
            item_type,
            kind,
            k1,
            k2,
            version,
            encoding,
            data,
        }
    }

    /// Returns the namespace tag.
    #[must_use]
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Returns whether this record is a node or an edge.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the primary identifier (the source for edges).
    #[must_use]
    pub fn k1(&self) -> &[u8] {
        &self.k1
    }

    /// Returns the secondary identifier (the target for edges).
    #[must_use]
    pub fn k2(&self) -> &[u8] {
        &self.k2
    }

    /// Returns the revision marker.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the payload format tag.
    #[must_use]
    pub const fn encoding(&self) -> u8 {
        self.encoding
    }

    /// Returns the opaque payload bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Unique record address: `(item_type, k1, k2)`.
///
/// Carries no behavior beyond equality and field access; it exists to make
/// lookup intent explicit instead of passing three positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Namespace tag.
    pub item_type: String,
    /// Primary identifier.
    pub k1: Vec<u8>,
    /// Secondary identifier.
    pub k2: Vec<u8>,
}

impl PrimaryKey {
    /// Creates a primary key from its parts.
    #[must_use]
    pub fn new(item_type: impl Into<String>, k1: Vec<u8>, k2: Vec<u8>) -> Self {
        Self {
            item_type: item_type.into(),
            k1,
            k2,
        }
    }
}

impl From<&GraphItem> for PrimaryKey {
    fn from(item: &GraphItem) -> Self {
        Self {
            item_type: item.item_type.clone(),
            k1: item.k1.clone(),
            k2: item.k2.clone(),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "primary({}, {}, {})",
            self.item_type,
            hex::encode(&self.k1),
            hex::encode(&self.k2)
        )
    }
}

/// Alternate unique record address: `(item_type, k1, version)`.
///
/// Enables point lookup of a record by source identifier and revision when
/// the target identifier is not known to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecondaryKey {
    /// Namespace tag.
    pub item_type: String,
    /// Primary identifier.
    pub k1: Vec<u8>,
    /// Revision marker.
    pub version: u64,
}

impl SecondaryKey {
    /// Creates a secondary key from its parts.
    #[must_use]
    pub fn new(item_type: impl Into<String>, k1: Vec<u8>, version: u64) -> Self {
        Self {
            item_type: item_type.into(),
            k1,
            version,
        }
    }
}

impl From<&GraphItem> for SecondaryKey {
    fn from(item: &GraphItem) -> Self {
        Self {
            item_type: item.item_type.clone(),
            k1: item.k1.clone(),
            version: item.version,
        }
    }
}

impl fmt::Display for SecondaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "secondary({}, {}, v{})",
            self.item_type,
            hex::encode(&self.k1),
            self.version
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_node_pins_target_to_source() {
        let node = GraphItem::node("g", b"abc".to_vec(), 3, 1, b"payload".to_vec());
        assert_eq!(node.kind(), ItemKind::Node);
        assert_eq!(node.k1(), b"abc");
        assert_eq!(node.k2(), b"abc");
        assert_eq!(node.version(), 3);
        assert_eq!(node.encoding(), 1);
    }

    #[test]
    fn test_edge_requires_distinct_endpoints() {
        let edge = GraphItem::edge("g", b"a".to_vec(), b"b".to_vec(), 1, 0, Vec::new()).unwrap();
        assert_eq!(edge.kind(), ItemKind::Edge);
        assert_eq!(edge.k1(), b"a");
        assert_eq!(edge.k2(), b"b");

        let loop_edge = GraphItem::edge("g", b"a".to_vec(), b"a".to_vec(), 1, 0, Vec::new());
        assert!(matches!(loop_edge, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_stored_derives_kind() {
        let node = GraphItem::from_stored("g".into(), b"x".to_vec(), b"x".to_vec(), 1, 0, vec![]);
        assert_eq!(node.kind(), ItemKind::Node);

        let edge = GraphItem::from_stored("g".into(), b"x".to_vec(), b"y".to_vec(), 1, 0, vec![]);
        assert_eq!(edge.kind(), ItemKind::Edge);
    }

    #[test]
    fn test_keys_from_item() {
        let node = GraphItem::node("g", b"n".to_vec(), 7, 0, Vec::new());

        let primary = PrimaryKey::from(&node);
        assert_eq!(primary, PrimaryKey::new("g", b"n".to_vec(), b"n".to_vec()));

        let secondary = SecondaryKey::from(&node);
        assert_eq!(secondary, SecondaryKey::new("g", b"n".to_vec(), 7));
    }

    #[test]
    fn test_key_display_renders_hex() {
        let key = PrimaryKey::new("g", vec![0xab], vec![0xcd]);
        assert_eq!(key.to_string(), "primary(g, ab, cd)");

        let key = SecondaryKey::new("g", vec![0xab], 2);
        assert_eq!(key.to_string(), "secondary(g, ab, v2)");
    }
}
