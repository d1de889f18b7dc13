//! Storage layer abstraction.
//!
//! The graph layer is the only storage layer in this crate: a single
//! `SQLite`-backed table holding node and edge records, exposed through the
//! [`traits::GraphStore`] contract. No raw SQL or `rusqlite` types cross the
//! module boundary.

pub mod graph;
pub mod traits;

pub use graph::SqliteGraphStore;
pub use traits::GraphStore;
