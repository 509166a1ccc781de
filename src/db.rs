//! SQLite-backed persistence handle.
//!
//! Every mutating operation in this crate runs inside [`Database::transaction`],
//! which opens a `BEGIN IMMEDIATE` transaction: the write lock is taken up
//! front, so validation reads and the writes they guard see the same state.
//! On `Err` the transaction is dropped and rolled back; nothing partial is
//! ever committed. Read-only queries go through [`Database::conn`] directly.

use crate::error::Result;
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS warehouses (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    closed_at   TEXT
);
CREATE INDEX IF NOT EXISTS idx_warehouses_lifetime ON warehouses (created_at, closed_at);

CREATE TABLE IF NOT EXISTS pickets (
    id           INTEGER PRIMARY KEY,
    warehouse_id INTEGER NOT NULL REFERENCES warehouses (id),
    name         TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    closed_at    TEXT
);
CREATE INDEX IF NOT EXISTS idx_pickets_warehouse_name ON pickets (warehouse_id, name);

CREATE TABLE IF NOT EXISTS platforms (
    id           INTEGER PRIMARY KEY,
    warehouse_id INTEGER NOT NULL REFERENCES warehouses (id),
    name         TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    closed_at    TEXT
);
CREATE INDEX IF NOT EXISTS idx_platforms_warehouse_name ON platforms (warehouse_id, name);
CREATE INDEX IF NOT EXISTS idx_platforms_lifetime ON platforms (created_at, closed_at);

CREATE TABLE IF NOT EXISTS assignments (
    id            INTEGER PRIMARY KEY,
    platform_id   INTEGER NOT NULL REFERENCES platforms (id),
    picket_id     INTEGER NOT NULL REFERENCES pickets (id),
    assigned_at   TEXT NOT NULL,
    unassigned_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_assignments_platform ON assignments (platform_id, assigned_at);
CREATE INDEX IF NOT EXISTS idx_assignments_picket ON assignments (picket_id, assigned_at);

CREATE TABLE IF NOT EXISTS cargo_types (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS cargo_records (
    id            INTEGER PRIMARY KEY,
    platform_id   INTEGER NOT NULL REFERENCES platforms (id),
    cargo_type_id INTEGER NOT NULL REFERENCES cargo_types (id),
    coming        TEXT NOT NULL,
    consumption   TEXT NOT NULL,
    remainder     TEXT NOT NULL,
    recorded_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cargo_platform_time ON cargo_records (platform_id, recorded_at);
";

/// Owning handle over the SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
        conn.execute("PRAGMA foreign_keys=ON;", [])?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self { conn })
    }

    /// Borrow the raw connection for read-only queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction. Commits on `Ok`;
    /// dropping the transaction on `Err` rolls every write back.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
