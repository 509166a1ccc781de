//! Append-only cargo ledger, one commodity per platform at a time.
//!
//! A booking's remainder is derived from its predecessor, the newest record
//! at or before the booking instant. Two bookings stamped with the same
//! instant merge into one row. Rows already written are never recomputed:
//! corrections happen by writing new entries, not by editing history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::lifecycle::{clean_name, effective_at};
use crate::model::{CargoRecord, CargoType, CargoTypeId, PlatformId};
use crate::store;

/// Register a commodity name.
pub fn create_type(db: &mut Database, name: &str) -> Result<CargoType> {
    let name = clean_name(name)?;
    db.transaction(|conn| {
        if store::cargo_types::by_name(conn, &name)?.is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }
        store::cargo_types::insert(conn, &name)
    })
}

pub fn types(db: &Database) -> Result<Vec<CargoType>> {
    store::cargo_types::list(db.conn())
}

pub fn type_by_name(db: &Database, name: &str) -> Result<CargoType> {
    store::cargo_types::by_name(db.conn(), name)?
        .ok_or_else(|| Error::CargoTypeNotFound(name.to_string()))
}

/// Book a movement of `coming` in and `consumption` out at the effective
/// instant.
pub fn record(
    db: &mut Database,
    platform_id: PlatformId,
    cargo_type_id: CargoTypeId,
    coming: Decimal,
    consumption: Decimal,
    at: Option<DateTime<Utc>>,
) -> Result<CargoRecord> {
    if coming < Decimal::ZERO || consumption < Decimal::ZERO {
        return Err(Error::InvalidOperation(
            "coming and consumption must not be negative".into(),
        ));
    }
    let at = effective_at(at);
    let record = db.transaction(|conn| {
        let platform = store::platforms::get(conn, platform_id)?
            .ok_or_else(|| Error::PlatformNotFound(platform_id.to_string()))?;
        // a closed platform still accepts bookings dated inside its lifetime
        if !platform.active_at(at) {
            return Err(Error::OutsideWindow {
                entity: format!("platform {}", platform.name),
                at,
            });
        }
        store::cargo_types::get(conn, cargo_type_id)?
            .ok_or_else(|| Error::CargoTypeNotFound(cargo_type_id.to_string()))?;

        if let Some(existing) = store::cargo::at_exact(conn, platform_id, at)? {
            // same instant: fold into the existing row
            if existing.cargo_type_id != cargo_type_id {
                return Err(Error::MixedCargoTypes(format!(
                    "platform {} already books a different type at {at}",
                    platform.name
                )));
            }
            let remainder = existing.remainder + coming - consumption;
            if remainder < Decimal::ZERO {
                return Err(Error::InsufficientStock(remainder));
            }
            store::cargo::update_amounts(
                conn,
                existing.id,
                existing.coming + coming,
                existing.consumption + consumption,
                remainder,
            )?;
            return Ok(CargoRecord {
                coming: existing.coming + coming,
                consumption: existing.consumption + consumption,
                remainder,
                ..existing
            });
        }

        let predecessor = store::cargo::latest_at_or_before(conn, platform_id, at)?;
        let base = match &predecessor {
            Some(prev) if prev.cargo_type_id != cargo_type_id => {
                if !prev.remainder.is_zero() {
                    return Err(Error::MixedCargoTypes(format!(
                        "platform {} still holds {} of another type",
                        platform.name, prev.remainder
                    )));
                }
                // run out, a new commodity era starts at zero
                Decimal::ZERO
            }
            Some(prev) => prev.remainder,
            None => Decimal::ZERO,
        };
        let remainder = base + coming - consumption;
        if remainder < Decimal::ZERO {
            return Err(Error::InsufficientStock(remainder));
        }
        store::cargo::insert(
            conn,
            platform_id,
            cargo_type_id,
            coming,
            consumption,
            remainder,
            at,
        )
    })?;
    info!(
        "cargo booked on platform {platform_id}: +{coming} -{consumption} => {}",
        record.remainder
    );
    Ok(record)
}

/// The booking in force at `as_of` (defaulting to now). Asking about an
/// instant the ledger never reached is a not-found, not an empty answer.
pub fn current(
    db: &Database,
    platform_id: PlatformId,
    as_of: Option<DateTime<Utc>>,
) -> Result<CargoRecord> {
    let as_of = effective_at(as_of);
    store::platforms::get(db.conn(), platform_id)?
        .ok_or_else(|| Error::PlatformNotFound(platform_id.to_string()))?;
    store::cargo::latest_at_or_before(db.conn(), platform_id, as_of)?
        .ok_or(Error::NoCargoRecorded { platform_id, as_of })
}

/// Chronological ledger slice between the optional bounds.
pub fn history(
    db: &Database,
    platform_id: PlatformId,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<CargoRecord>> {
    store::platforms::get(db.conn(), platform_id)?
        .ok_or_else(|| Error::PlatformNotFound(platform_id.to_string()))?;
    store::cargo::history(db.conn(), platform_id, from, to)
}
