//! Cargo ledger rows.
//!
//! Quantities travel as decimal strings so no floating point ever touches a
//! stock figure. Timestamps are RFC 3339 text in UTC, which keeps `ORDER BY`
//! and range predicates chronological.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{CargoRecord, CargoRecordId, CargoTypeId, PlatformId};

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<CargoRecord> {
    Ok(CargoRecord {
        id: row.get(0)?,
        platform_id: row.get(1)?,
        cargo_type_id: row.get(2)?,
        coming: decimal_column(row, 3)?,
        consumption: decimal_column(row, 4)?,
        remainder: decimal_column(row, 5)?,
        recorded_at: row.get(6)?,
    })
}

pub fn insert(
    conn: &Connection,
    platform_id: PlatformId,
    cargo_type_id: CargoTypeId,
    coming: Decimal,
    consumption: Decimal,
    remainder: Decimal,
    recorded_at: DateTime<Utc>,
) -> Result<CargoRecord> {
    conn.execute(
        "INSERT INTO cargo_records (platform_id, cargo_type_id, coming, consumption, remainder, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            platform_id,
            cargo_type_id,
            coming.to_string(),
            consumption.to_string(),
            remainder.to_string(),
            recorded_at
        ],
    )?;
    Ok(CargoRecord {
        id: CargoRecordId(conn.last_insert_rowid()),
        platform_id,
        cargo_type_id,
        coming,
        consumption,
        remainder,
        recorded_at,
    })
}

/// The newest record at or before `t`, the anchor every running-remainder
/// calculation starts from.
pub fn latest_at_or_before(
    conn: &Connection,
    platform_id: PlatformId,
    t: DateTime<Utc>,
) -> Result<Option<CargoRecord>> {
    let row = conn
        .query_row(
            "SELECT id, platform_id, cargo_type_id, coming, consumption, remainder, recorded_at
             FROM cargo_records
             WHERE platform_id = ?1 AND recorded_at <= ?2
             ORDER BY recorded_at DESC, id DESC
             LIMIT 1",
            params![platform_id, t],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Record stamped at exactly `t`, if one exists. Same-instant bookings merge
/// into this row instead of inserting a twin.
pub fn at_exact(
    conn: &Connection,
    platform_id: PlatformId,
    t: DateTime<Utc>,
) -> Result<Option<CargoRecord>> {
    let row = conn
        .query_row(
            "SELECT id, platform_id, cargo_type_id, coming, consumption, remainder, recorded_at
             FROM cargo_records
             WHERE platform_id = ?1 AND recorded_at = ?2",
            params![platform_id, t],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Overwrite the amounts of an existing row (same-instant merge).
pub fn update_amounts(
    conn: &Connection,
    id: CargoRecordId,
    coming: Decimal,
    consumption: Decimal,
    remainder: Decimal,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE cargo_records SET coming = ?2, consumption = ?3, remainder = ?4 WHERE id = ?1",
        params![
            id,
            coming.to_string(),
            consumption.to_string(),
            remainder.to_string()
        ],
    )?;
    Ok(n)
}

/// Chronological slice of the platform's ledger. Either bound may be absent.
pub fn history(
    conn: &Connection,
    platform_id: PlatformId,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<CargoRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, platform_id, cargo_type_id, coming, consumption, remainder, recorded_at
         FROM cargo_records
         WHERE platform_id = ?1
           AND recorded_at >= COALESCE(?2, recorded_at)
           AND recorded_at <= COALESCE(?3, recorded_at)
         ORDER BY recorded_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![platform_id, from, to], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
