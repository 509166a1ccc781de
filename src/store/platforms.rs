//! Platform rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Platform, PlatformId, WarehouseId};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Platform> {
    Ok(Platform {
        id: row.get(0)?,
        warehouse_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        closed_at: row.get(4)?,
    })
}

pub fn insert(
    conn: &Connection,
    warehouse_id: WarehouseId,
    name: &str,
    created_at: DateTime<Utc>,
) -> Result<Platform> {
    conn.execute(
        "INSERT INTO platforms (warehouse_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![warehouse_id, name, created_at],
    )?;
    Ok(Platform {
        id: PlatformId(conn.last_insert_rowid()),
        warehouse_id,
        name: name.to_string(),
        created_at,
        closed_at: None,
    })
}

pub fn get(conn: &Connection, id: PlatformId) -> Result<Option<Platform>> {
    let row = conn
        .query_row(
            "SELECT id, warehouse_id, name, created_at, closed_at FROM platforms WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Exact-name lookup among open platforms of one warehouse.
pub fn by_name_open(
    conn: &Connection,
    warehouse_id: WarehouseId,
    name: &str,
) -> Result<Option<Platform>> {
    let row = conn
        .query_row(
            "SELECT id, warehouse_id, name, created_at, closed_at FROM platforms
             WHERE warehouse_id = ?1 AND name = ?2 AND closed_at IS NULL",
            params![warehouse_id, name],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Case-insensitive name collision among open platforms, ignoring `exclude`.
pub fn name_taken_nocase(
    conn: &Connection,
    warehouse_id: WarehouseId,
    name: &str,
    exclude: PlatformId,
) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM platforms
             WHERE warehouse_id = ?1 AND name = ?2 COLLATE NOCASE
               AND closed_at IS NULL AND id <> ?3
             LIMIT 1",
            params![warehouse_id, name, exclude],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Platforms of the warehouse live at `t`, ordered by name.
pub fn active_at(
    conn: &Connection,
    warehouse_id: WarehouseId,
    t: DateTime<Utc>,
) -> Result<Vec<Platform>> {
    let mut stmt = conn.prepare(
        "SELECT id, warehouse_id, name, created_at, closed_at FROM platforms
         WHERE warehouse_id = ?1 AND created_at <= ?2
           AND (closed_at IS NULL OR closed_at > ?2)
         ORDER BY name",
    )?;
    let rows = stmt.query_map(params![warehouse_id, t], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list(
    conn: &Connection,
    warehouse_id: WarehouseId,
    include_closed: bool,
) -> Result<Vec<Platform>> {
    let sql = if include_closed {
        "SELECT id, warehouse_id, name, created_at, closed_at FROM platforms
         WHERE warehouse_id = ?1 ORDER BY name"
    } else {
        "SELECT id, warehouse_id, name, created_at, closed_at FROM platforms
         WHERE warehouse_id = ?1 AND closed_at IS NULL ORDER BY name"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![warehouse_id], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn rename(conn: &Connection, id: PlatformId, name: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE platforms SET name = ?2 WHERE id = ?1",
        params![id, name],
    )?;
    Ok(n)
}

pub fn close(conn: &Connection, id: PlatformId, at: DateTime<Utc>) -> Result<usize> {
    let n = conn.execute(
        "UPDATE platforms SET closed_at = ?2 WHERE id = ?1 AND closed_at IS NULL",
        params![id, at],
    )?;
    Ok(n)
}

/// True when some open platform of the warehouse was created after `t`.
/// A close backdated past such a row would invert its window.
pub fn any_open_created_after(
    conn: &Connection,
    warehouse_id: WarehouseId,
    t: DateTime<Utc>,
) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM platforms
             WHERE warehouse_id = ?1 AND closed_at IS NULL AND created_at > ?2
             LIMIT 1",
            params![warehouse_id, t],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Close every open platform of a warehouse in one statement. Returns rows
/// affected.
pub fn close_all_in_warehouse(
    conn: &Connection,
    warehouse_id: WarehouseId,
    at: DateTime<Utc>,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE platforms SET closed_at = ?2 WHERE warehouse_id = ?1 AND closed_at IS NULL",
        params![warehouse_id, at],
    )?;
    Ok(n)
}
