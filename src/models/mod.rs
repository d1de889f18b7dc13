//! Data models for depstore.
//!
//! This module contains the core data structures shared by the storage layer.

pub mod graph;

pub use graph::{GraphItem, ItemKind, PrimaryKey, SecondaryKey};
