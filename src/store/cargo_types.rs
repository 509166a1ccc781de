//! Cargo type rows. Names are globally unique; the catalogue has no lifetime
//! columns, a type once registered stays usable.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{CargoType, CargoTypeId};

fn from_row(row: &Row<'_>) -> rusqlite::Result<CargoType> {
    Ok(CargoType {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn insert(conn: &Connection, name: &str) -> Result<CargoType> {
    conn.execute("INSERT INTO cargo_types (name) VALUES (?1)", params![name])?;
    Ok(CargoType {
        id: CargoTypeId(conn.last_insert_rowid()),
        name: name.to_string(),
    })
}

pub fn get(conn: &Connection, id: CargoTypeId) -> Result<Option<CargoType>> {
    let row = conn
        .query_row(
            "SELECT id, name FROM cargo_types WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn by_name(conn: &Connection, name: &str) -> Result<Option<CargoType>> {
    let row = conn
        .query_row(
            "SELECT id, name FROM cargo_types WHERE name = ?1 COLLATE NOCASE",
            params![name],
            from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn list(conn: &Connection) -> Result<Vec<CargoType>> {
    let mut stmt = conn.prepare("SELECT id, name FROM cargo_types ORDER BY name")?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
