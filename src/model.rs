//! Domain entities for the storage hierarchy.
//!
//! All lifetimes are half-open: an entity created at `c` and closed at `x` is
//! active for every instant `t` with `c <= t < x`; a missing close time means
//! "still active". Assignment intervals follow the same rule.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Identifiers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WarehouseId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PicketId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CargoTypeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CargoRecordId(pub i64);

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CargoTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CargoRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for WarehouseId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl ToSql for PicketId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl ToSql for PlatformId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl ToSql for CargoTypeId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl ToSql for CargoRecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for WarehouseId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(WarehouseId)
    }
}

impl FromSql for PicketId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(PicketId)
    }
}

impl FromSql for PlatformId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(PlatformId)
    }
}

impl FromSql for CargoTypeId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(CargoTypeId)
    }
}

impl FromSql for CargoRecordId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(CargoRecordId)
    }
}

// ─── Entities ─────────────────────────────────────────────────────────────────

/// Top-level storage site. Owns pickets and platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Atomic, named storage unit within a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Picket {
    pub id: PicketId,
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Temporary grouping of contiguous pickets; carries the cargo ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Half-open interval during which a picket belongs to a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub platform_id: PlatformId,
    pub picket_id: PicketId,
    pub assigned_at: DateTime<Utc>,
    pub unassigned_at: Option<DateTime<Utc>>,
}

/// Commodity classification referenced by cargo records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoType {
    pub id: CargoTypeId,
    pub name: String,
}

/// One entry in a platform's cargo ledger. `remainder` is the running balance
/// as of `recorded_at`: predecessor remainder + coming − consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoRecord {
    pub id: CargoRecordId,
    pub platform_id: PlatformId,
    pub cargo_type_id: CargoTypeId,
    pub coming: Decimal,
    pub consumption: Decimal,
    pub remainder: Decimal,
    pub recorded_at: DateTime<Utc>,
}

// ─── Activity windows ─────────────────────────────────────────────────────────

fn within(created: DateTime<Utc>, closed: Option<DateTime<Utc>>, t: DateTime<Utc>) -> bool {
    created <= t && closed.map_or(true, |c| t < c)
}

impl Warehouse {
    pub fn active_at(&self, t: DateTime<Utc>) -> bool {
        within(self.created_at, self.closed_at, t)
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

impl Picket {
    pub fn active_at(&self, t: DateTime<Utc>) -> bool {
        within(self.created_at, self.closed_at, t)
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

impl Platform {
    pub fn active_at(&self, t: DateTime<Utc>) -> bool {
        within(self.created_at, self.closed_at, t)
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

impl Assignment {
    pub fn active_at(&self, t: DateTime<Utc>) -> bool {
        within(self.assigned_at, self.unassigned_at, t)
    }

    pub fn is_open(&self) -> bool {
        self.unassigned_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn activity_window_is_half_open() {
        let p = Platform {
            id: PlatformId(1),
            warehouse_id: WarehouseId(1),
            name: "101 - 104".into(),
            created_at: t("2025-05-30T22:04:00Z"),
            closed_at: Some(t("2025-07-02T11:24:00Z")),
        };

        assert!(!p.active_at(t("2025-05-30T22:03:59Z")));
        assert!(p.active_at(t("2025-05-30T22:04:00Z")));
        assert!(p.active_at(t("2025-07-02T11:23:59Z")));
        assert!(!p.active_at(t("2025-07-02T11:24:00Z")));
    }

    #[test]
    fn open_ended_window_covers_the_future() {
        let a = Assignment {
            id: 1,
            platform_id: PlatformId(1),
            picket_id: PicketId(1),
            assigned_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            unassigned_at: None,
        };

        assert!(a.is_open());
        assert!(a.active_at(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
        assert!(!a.active_at(Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap()));
    }
}
