//! Assignment intervals tying pickets to platforms.
//!
//! Membership is the half-open window `[assigned_at, unassigned_at)`; a null
//! `unassigned_at` means the interval is still open. Closing statements carry
//! an `assigned_at <= at` guard so a backdated close can never produce an
//! interval that ends before it starts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Assignment, Picket, PicketId, PlatformId, WarehouseId};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        platform_id: row.get(1)?,
        picket_id: row.get(2)?,
        assigned_at: row.get(3)?,
        unassigned_at: row.get(4)?,
    })
}

fn picket_from_row(row: &Row<'_>) -> rusqlite::Result<Picket> {
    Ok(Picket {
        id: row.get(0)?,
        warehouse_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        closed_at: row.get(4)?,
    })
}

/// Start a new membership interval.
pub fn open(
    conn: &Connection,
    platform_id: PlatformId,
    picket_id: PicketId,
    assigned_at: DateTime<Utc>,
) -> Result<Assignment> {
    conn.execute(
        "INSERT INTO assignments (platform_id, picket_id, assigned_at) VALUES (?1, ?2, ?3)",
        params![platform_id, picket_id, assigned_at],
    )?;
    Ok(Assignment {
        id: conn.last_insert_rowid(),
        platform_id,
        picket_id,
        assigned_at,
        unassigned_at: None,
    })
}

/// The picket's currently open interval, if any.
pub fn open_for_picket(conn: &Connection, picket_id: PicketId) -> Result<Option<Assignment>> {
    let row = conn
        .query_row(
            "SELECT id, platform_id, picket_id, assigned_at, unassigned_at FROM assignments
             WHERE picket_id = ?1 AND unassigned_at IS NULL",
            params![picket_id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Which platform held the picket at `t`, if any.
pub fn platform_of_picket_at(
    conn: &Connection,
    picket_id: PicketId,
    t: DateTime<Utc>,
) -> Result<Option<PlatformId>> {
    let row = conn
        .query_row(
            "SELECT platform_id FROM assignments
             WHERE picket_id = ?1 AND assigned_at <= ?2
               AND (unassigned_at IS NULL OR unassigned_at > ?2)",
            params![picket_id, t],
            |row| row.get(0),
        )
        .optional()?;
    Ok(row)
}

/// Pickets held by the platform at `t`, ordered by name.
pub fn pickets_at(
    conn: &Connection,
    platform_id: PlatformId,
    t: DateTime<Utc>,
) -> Result<Vec<Picket>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.warehouse_id, p.name, p.created_at, p.closed_at
         FROM assignments a
         JOIN pickets p ON p.id = a.picket_id
         WHERE a.platform_id = ?1 AND a.assigned_at <= ?2
           AND (a.unassigned_at IS NULL OR a.unassigned_at > ?2)
         ORDER BY p.name",
    )?;
    let rows = stmt.query_map(params![platform_id, t], picket_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Ids only, for callers that feed the topology checks.
pub fn picket_ids_at(
    conn: &Connection,
    platform_id: PlatformId,
    t: DateTime<Utc>,
) -> Result<Vec<PicketId>> {
    let mut stmt = conn.prepare(
        "SELECT picket_id FROM assignments
         WHERE platform_id = ?1 AND assigned_at <= ?2
           AND (unassigned_at IS NULL OR unassigned_at > ?2)",
    )?;
    let rows = stmt.query_map(params![platform_id, t], |row| row.get(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Close every open interval of the platform that began at or before `at`.
/// Returns rows affected; intervals opened after `at` are left untouched for
/// the caller to judge.
pub fn close_for_platform(
    conn: &Connection,
    platform_id: PlatformId,
    at: DateTime<Utc>,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE assignments SET unassigned_at = ?2
         WHERE platform_id = ?1 AND unassigned_at IS NULL AND assigned_at <= ?2",
        params![platform_id, at],
    )?;
    Ok(n)
}

/// Close the open intervals of specific pickets within one platform. Returns
/// total rows affected.
pub fn close_for_picket_ids(
    conn: &Connection,
    platform_id: PlatformId,
    picket_ids: &[PicketId],
    at: DateTime<Utc>,
) -> Result<usize> {
    let mut stmt = conn.prepare(
        "UPDATE assignments SET unassigned_at = ?3
         WHERE platform_id = ?1 AND picket_id = ?2
           AND unassigned_at IS NULL AND assigned_at <= ?3",
    )?;
    let mut total = 0;
    for picket_id in picket_ids {
        total += stmt.execute(params![platform_id, picket_id, at])?;
    }
    Ok(total)
}

/// Close the picket's open intervals and report which platforms they pointed
/// at (a picket close needs to revisit those platforms).
pub fn close_for_picket(
    conn: &Connection,
    picket_id: PicketId,
    at: DateTime<Utc>,
) -> Result<Vec<PlatformId>> {
    let mut stmt = conn.prepare(
        "SELECT platform_id FROM assignments
         WHERE picket_id = ?1 AND unassigned_at IS NULL AND assigned_at <= ?2",
    )?;
    let rows = stmt.query_map(params![picket_id, at], |row| row.get(0))?;
    let mut platforms: Vec<PlatformId> = Vec::new();
    for row in rows {
        platforms.push(row?);
    }
    conn.execute(
        "UPDATE assignments SET unassigned_at = ?2
         WHERE picket_id = ?1 AND unassigned_at IS NULL AND assigned_at <= ?2",
        params![picket_id, at],
    )?;
    Ok(platforms)
}

/// Close every open interval under the warehouse's platforms (warehouse close
/// cascade). Returns rows affected.
pub fn close_all_in_warehouse(
    conn: &Connection,
    warehouse_id: WarehouseId,
    at: DateTime<Utc>,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE assignments SET unassigned_at = ?2
         WHERE unassigned_at IS NULL AND assigned_at <= ?2
           AND platform_id IN (SELECT id FROM platforms WHERE warehouse_id = ?1)",
        params![warehouse_id, at],
    )?;
    Ok(n)
}

/// Open intervals still attached to the platform.
pub fn open_count(conn: &Connection, platform_id: PlatformId) -> Result<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE platform_id = ?1 AND unassigned_at IS NULL",
        params![platform_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

/// Open intervals the picket currently sits in (the invariant says at most
/// one).
pub fn open_count_for_picket(conn: &Connection, picket_id: PicketId) -> Result<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE picket_id = ?1 AND unassigned_at IS NULL",
        params![picket_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

/// True when the platform's recorded membership extends past `t`, either
/// through an interval still open that began after `t` or one that closed
/// after `t`. A close backdated to `t` would contradict that history.
pub fn any_active_for_platform_after(
    conn: &Connection,
    platform_id: PlatformId,
    t: DateTime<Utc>,
) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM assignments
             WHERE platform_id = ?1
               AND ((unassigned_at IS NULL AND assigned_at > ?2) OR unassigned_at > ?2)
             LIMIT 1",
            params![platform_id, t],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Same question asked from the picket's side.
pub fn any_active_for_picket_after(
    conn: &Connection,
    picket_id: PicketId,
    t: DateTime<Utc>,
) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM assignments
             WHERE picket_id = ?1
               AND ((unassigned_at IS NULL AND assigned_at > ?2) OR unassigned_at > ?2)
             LIMIT 1",
            params![picket_id, t],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

/// Same question for the whole warehouse.
pub fn any_active_in_warehouse_after(
    conn: &Connection,
    warehouse_id: WarehouseId,
    t: DateTime<Utc>,
) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM assignments a
             JOIN platforms p ON p.id = a.platform_id
             WHERE p.warehouse_id = ?1
               AND ((a.unassigned_at IS NULL AND a.assigned_at > ?2) OR a.unassigned_at > ?2)
             LIMIT 1",
            params![warehouse_id, t],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{pickets, platforms, warehouses};
    use chrono::TimeZone;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        c.execute_batch(crate::db::SCHEMA).unwrap();
        c
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn membership_window_is_half_open() {
        let c = conn();
        let w = warehouses::insert(&c, "wh", at(8)).unwrap();
        let p = pickets::insert(&c, w.id, "101", at(8)).unwrap();
        let plat = platforms::insert(&c, w.id, "101", at(10)).unwrap();
        open(&c, plat.id, p.id, at(10)).unwrap();
        c.execute(
            "UPDATE assignments SET unassigned_at = ?1",
            params![at(12)],
        )
        .unwrap();

        assert_eq!(platform_of_picket_at(&c, p.id, at(9)).unwrap(), None);
        assert_eq!(platform_of_picket_at(&c, p.id, at(10)).unwrap(), Some(plat.id));
        assert_eq!(platform_of_picket_at(&c, p.id, at(11)).unwrap(), Some(plat.id));
        assert_eq!(platform_of_picket_at(&c, p.id, at(12)).unwrap(), None);
    }

    #[test]
    fn close_leaves_intervals_opened_after_the_cutoff() {
        let c = conn();
        let w = warehouses::insert(&c, "wh", at(8)).unwrap();
        let early = pickets::insert(&c, w.id, "101", at(8)).unwrap();
        let late = pickets::insert(&c, w.id, "102", at(8)).unwrap();
        let plat = platforms::insert(&c, w.id, "101 - 102", at(9)).unwrap();
        open(&c, plat.id, early.id, at(9)).unwrap();
        open(&c, plat.id, late.id, at(14)).unwrap();

        let affected = close_for_platform(&c, plat.id, at(12)).unwrap();
        assert_eq!(affected, 1);
        assert_eq!(open_count(&c, plat.id).unwrap(), 1);
        assert!(open_for_picket(&c, early.id).unwrap().is_none());
        assert!(open_for_picket(&c, late.id).unwrap().is_some());
    }

    #[test]
    fn picket_close_reports_the_platform_it_left() {
        let c = conn();
        let w = warehouses::insert(&c, "wh", at(8)).unwrap();
        let p = pickets::insert(&c, w.id, "101", at(8)).unwrap();
        let plat = platforms::insert(&c, w.id, "101", at(9)).unwrap();
        open(&c, plat.id, p.id, at(9)).unwrap();

        let touched = close_for_picket(&c, p.id, at(11)).unwrap();
        assert_eq!(touched, vec![plat.id]);
        assert!(open_for_picket(&c, p.id).unwrap().is_none());
    }
}
