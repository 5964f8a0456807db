//! SQLite-backed blob store for the water ledger.
//!
//! The store is a plain key-value table. The ledger is persisted under three
//! keys, each holding a JSON document:
//!
//! - `sources` - array of source records
//! - `logs` - array of log records (stable `sourceId`, positional `sourceIdx`,
//!   precomputed `balance`)
//! - `settings` - settings object
//!
//! Missing keys load as empty collections and default settings. Saving
//! happens synchronously after every mutation; there is no batching.
//!
//! # Usage
//!
//! ```rust
//! use wrm_db::Database;
//! use wrm_core::NewSource;
//!
//! let db = Database::new().unwrap();
//! let mut ledger = db.load_ledger().unwrap();
//! ledger.add_source(NewSource::new("Main Reservoir", 1000.0, 400.0)).unwrap();
//! db.save_ledger(&ledger).unwrap();
//!
//! let reloaded = db.load_ledger().unwrap();
//! assert_eq!(reloaded.sources().len(), 1);
//! ```

pub mod schema;
mod store;

pub use store::{LOGS_KEY, SETTINGS_KEY, SOURCES_KEY};

use anyhow::Context;
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Key-value store over a SQLite connection.
///
/// Cheaply cloneable (via `Rc`); clones share the same connection. Single
/// threaded by construction.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a database file with the schema applied.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;
        log::info!("[WRM] store: opened {}", path.display());
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
