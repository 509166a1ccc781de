//! Warehouse rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Warehouse, WarehouseId};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Warehouse> {
    Ok(Warehouse {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        closed_at: row.get(3)?,
    })
}

pub fn insert(conn: &Connection, name: &str, created_at: DateTime<Utc>) -> Result<Warehouse> {
    conn.execute(
        "INSERT INTO warehouses (name, created_at) VALUES (?1, ?2)",
        params![name, created_at],
    )?;
    Ok(Warehouse {
        id: WarehouseId(conn.last_insert_rowid()),
        name: name.to_string(),
        created_at,
        closed_at: None,
    })
}

pub fn get(conn: &Connection, id: WarehouseId) -> Result<Option<Warehouse>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at, closed_at FROM warehouses WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Exact-name lookup among warehouses that are still open.
pub fn by_name_open(conn: &Connection, name: &str) -> Result<Option<Warehouse>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at, closed_at FROM warehouses
             WHERE name = ?1 AND closed_at IS NULL",
            params![name],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Case-insensitive name collision among open warehouses, ignoring `exclude`.
pub fn name_taken_nocase(conn: &Connection, name: &str, exclude: WarehouseId) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM warehouses
             WHERE name = ?1 COLLATE NOCASE AND closed_at IS NULL AND id <> ?2
             LIMIT 1",
            params![name, exclude],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Warehouses live at `t`, ordered by name.
pub fn active_at(conn: &Connection, t: DateTime<Utc>) -> Result<Vec<Warehouse>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, closed_at FROM warehouses
         WHERE created_at <= ?1 AND (closed_at IS NULL OR closed_at > ?1)
         ORDER BY name",
    )?;
    let rows = stmt.query_map(params![t], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list(conn: &Connection, include_closed: bool) -> Result<Vec<Warehouse>> {
    let sql = if include_closed {
        "SELECT id, name, created_at, closed_at FROM warehouses ORDER BY name"
    } else {
        "SELECT id, name, created_at, closed_at FROM warehouses
         WHERE closed_at IS NULL ORDER BY name"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn rename(conn: &Connection, id: WarehouseId, name: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE warehouses SET name = ?2 WHERE id = ?1",
        params![id, name],
    )?;
    Ok(n)
}

/// Stamp `closed_at` on a still-open warehouse. Returns rows affected.
pub fn close(conn: &Connection, id: WarehouseId, at: DateTime<Utc>) -> Result<usize> {
    let n = conn.execute(
        "UPDATE warehouses SET closed_at = ?2 WHERE id = ?1 AND closed_at IS NULL",
        params![id, at],
    )?;
    Ok(n)
}
