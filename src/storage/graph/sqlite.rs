//! `SQLite` graph store backend.
//!
//! One table, `graph_items`, holds both node and edge records. One-hop
//! adjacency traversal is a semi-join over the same table rather than a
//! dedicated adjacency structure: the subquery collects neighbor identifiers
//! from edge rows, the outer query returns the node rows for them.
//!
//! Identifiers are byte sequences in the logical model and lowercase hex
//! `TEXT` in the columns; payloads are stored as `BLOB`. That conversion is
//! confined to [`encode_key`], [`decode_key`], and the row decoder.

use crate::models::graph::{GraphItem, PrimaryKey, SecondaryKey};
use crate::storage::traits::GraphStore;
use crate::{Error, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row, ToSql, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

const CREATE_GRAPH_ITEMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS graph_items (
    item_type TEXT NOT NULL,
    k1 TEXT NOT NULL,
    k2 TEXT NOT NULL,
    version INTEGER NOT NULL,
    encoding INTEGER NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (item_type, k1, k2),
    UNIQUE (item_type, k1, version)
)";

const INSERT_GRAPH_ITEM: &str = "INSERT INTO graph_items
    (item_type, k1, k2, version, encoding, data)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SELECT_BY_PRIMARY_KEY: &str = "SELECT item_type, k1, k2, version, encoding, data
    FROM graph_items
    WHERE item_type = ?1 AND k1 = ?2 AND k2 = ?3";

const SELECT_BY_SECONDARY_KEY: &str = "SELECT item_type, k1, k2, version, encoding, data
    FROM graph_items
    WHERE item_type = ?1 AND k1 = ?2 AND version = ?3";

// Traversal returns node rows (k1 = k2) whose identifier appears on the far
// side of an edge row touching the argument. The `k1 != k2` guard inside the
// subquery keeps node rows from ever being read as self-loop edges.
const SELECT_UPSTREAM_NEIGHBORS: &str = "SELECT item_type, k1, k2, version, encoding, data
    FROM graph_items
    WHERE k1 IN (SELECT k2 FROM graph_items WHERE k1 = ?1 AND k1 != k2)
    AND k1 = k2";

const SELECT_DOWNSTREAM_NEIGHBORS: &str = "SELECT item_type, k1, k2, version, encoding, data
    FROM graph_items
    WHERE k2 IN (SELECT k1 FROM graph_items WHERE k2 = ?1 AND k1 != k2)
    AND k1 = k2";

/// Helper to acquire mutex lock with poison recovery.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Graph SQLite mutex was poisoned, recovering");
            metrics::counter!("graph_sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Encodes a logical byte-sequence identifier into its column form.
fn encode_key(key: &[u8]) -> String {
    hex::encode(key)
}

/// Decodes an identifier column back into the logical byte-sequence domain.
fn decode_key(column: usize, text: &str) -> rusqlite::Result<Vec<u8>> {
    hex::decode(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Decodes one result row into a [`GraphItem`].
///
/// Column order matches the explicit SELECT lists above. The node/edge kind
/// is derived from the decoded identifier pair.
fn decode_item_row(row: &Row<'_>) -> rusqlite::Result<GraphItem> {
    let item_type: String = row.get(0)?;
    let k1_text: String = row.get(1)?;
    let k2_text: String = row.get(2)?;
    let version: u64 = row.get(3)?;
    let encoding: u8 = row.get(4)?;
    let data: Vec<u8> = row.get(5)?;

    Ok(GraphItem::from_stored(
        item_type,
        decode_key(1, &k1_text)?,
        decode_key(2, &k2_text)?,
        version,
        encoding,
        data,
    ))
}

/// Runs a SELECT and drains the cursor into a vector of items.
///
/// The first decode error aborts consumption and discards any partially
/// accumulated results. The statement and its row cursor are released on
/// every exit path by drop.
fn query_items(
    conn: &Connection,
    operation: &str,
    sql: &str,
    query_params: &[&dyn ToSql],
) -> Result<Vec<GraphItem>> {
    let mut stmt = conn.prepare(sql).map_err(|e| Error::Backend {
        operation: format!("{operation}_prepare"),
        cause: e.to_string(),
    })?;

    let rows = stmt
        .query_map(query_params, decode_item_row)
        .map_err(|e| Error::Backend {
            operation: operation.to_string(),
            cause: e.to_string(),
        })?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::Backend {
            operation: format!("{operation}_decode"),
            cause: e.to_string(),
        })
}

/// `SQLite`-based graph store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` for thread-safe access. WAL mode and
/// `busy_timeout` handle concurrent access gracefully. Every operation is a
/// single independent statement; racing `put` calls on the same key are
/// serialized by the table's uniqueness constraints, so exactly one wins and
/// the rest observe [`Error::ConstraintViolation`].
///
/// # Schema
///
/// One table stores the graph:
/// - `graph_items`: node and edge records, primary key `(item_type, k1, k2)`,
///   unique constraint `(item_type, k1, version)`
pub struct SqliteGraphStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteGraphStore {
    /// Creates a new `SQLite` graph store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(|e| Error::Backend {
            operation: "open_graph_sqlite".to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory `SQLite` graph store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Backend {
            operation: "open_graph_sqlite_memory".to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Initializes the database schema. Idempotent.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        // Enable WAL mode for better concurrent read performance
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        let _ = conn.pragma_update(None, "busy_timeout", "5000");

        conn.execute(CREATE_GRAPH_ITEMS_TABLE, [])
            .map_err(|e| Error::Backend {
                operation: "create_graph_items_table".to_string(),
                cause: e.to_string(),
            })?;

        // Downstream traversal filters on k2, which the primary key does not cover.
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_items_k2 ON graph_items(k2)",
            [],
        );

        Ok(())
    }
}

impl GraphStore for SqliteGraphStore {
    #[instrument(skip(self, item), fields(item_type = %item.item_type(), kind = ?item.kind()))]
    fn put(&self, item: &GraphItem) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        conn.execute(
            INSERT_GRAPH_ITEM,
            params![
                item.item_type(),
                encode_key(item.k1()),
                encode_key(item.k2()),
                item.version(),
                item.encoding(),
                item.data(),
            ],
        )
        .map_err(|e| {
            if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
                Error::ConstraintViolation {
                    key: PrimaryKey::from(item).to_string(),
                }
            } else {
                Error::Backend {
                    operation: "put".to_string(),
                    cause: e.to_string(),
                }
            }
        })?;

        metrics::counter!("graph_items_put_total").increment(1);
        Ok(())
    }

    #[instrument(skip(self, key), fields(key = %key))]
    fn find_by_primary(&self, key: &PrimaryKey) -> Result<GraphItem> {
        let conn = acquire_lock(&self.conn);

        let mut items = query_items(
            &conn,
            "find_by_primary",
            SELECT_BY_PRIMARY_KEY,
            &[&key.item_type, &encode_key(&key.k1), &encode_key(&key.k2)],
        )?;

        match items.len() {
            0 => Err(Error::NotFound {
                key: key.to_string(),
            }),
            1 => Ok(items.swap_remove(0)),
            rows => Err(Error::Integrity {
                key: key.to_string(),
                rows,
            }),
        }
    }

    #[instrument(skip(self, key), fields(key = %key))]
    fn find_by_secondary(&self, key: &SecondaryKey) -> Result<GraphItem> {
        let conn = acquire_lock(&self.conn);

        let mut items = query_items(
            &conn,
            "find_by_secondary",
            SELECT_BY_SECONDARY_KEY,
            &[&key.item_type, &encode_key(&key.k1), &key.version],
        )?;

        match items.len() {
            0 => Err(Error::NotFound {
                key: key.to_string(),
            }),
            1 => Ok(items.swap_remove(0)),
            rows => Err(Error::Integrity {
                key: key.to_string(),
                rows,
            }),
        }
    }

    #[instrument(skip(self, node_id), fields(node = %hex::encode(node_id)))]
    fn find_upstream(&self, node_id: &[u8]) -> Result<Vec<GraphItem>> {
        let conn = acquire_lock(&self.conn);

        let items = query_items(
            &conn,
            "find_upstream",
            SELECT_UPSTREAM_NEIGHBORS,
            &[&encode_key(node_id)],
        )?;

        metrics::counter!("graph_traversals_total", "direction" => "upstream").increment(1);
        Ok(items)
    }

    #[instrument(skip(self, node_id), fields(node = %hex::encode(node_id)))]
    fn find_downstream(&self, node_id: &[u8]) -> Result<Vec<GraphItem>> {
        let conn = acquire_lock(&self.conn);

        let items = query_items(
            &conn,
            "find_downstream",
            SELECT_DOWNSTREAM_NEIGHBORS,
            &[&encode_key(node_id)],
        )?;

        metrics::counter!("graph_traversals_total", "direction" => "downstream").increment(1);
        Ok(items)
    }
}
