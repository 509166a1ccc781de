//! Platform lifecycle.
//!
//! Creation is the interesting path: the requested pickets must form an
//! unbroken run of the warehouse sequence at the effective instant, and any
//! overlap with existing platforms is settled by absorption. A platform whose
//! whole claim is taken closes and its stock follows the pickets; a platform
//! that only loses an edge keeps running with the rest. Every read feeding
//! those decisions happens inside the same transaction as the writes, and a
//! backdated instant is rejected wherever it would contradict membership
//! already on record after that instant.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{clean_name, effective_at, load_claims};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::{CargoTypeId, Picket, PicketId, Platform, PlatformId, WarehouseId};
use crate::store;
use crate::topology::{analyze, SequenceIndex};

/// Create a platform over `picket_ids`, absorbing whatever stands on them.
pub fn create(
    db: &mut Database,
    warehouse_id: WarehouseId,
    name: &str,
    picket_ids: &[PicketId],
    at: Option<DateTime<Utc>>,
) -> Result<Platform> {
    let name = clean_name(name)?;
    if picket_ids.is_empty() {
        return Err(Error::InvalidOperation(
            "a platform needs at least one picket".into(),
        ));
    }
    let at = effective_at(at);
    let platform = db.transaction(|conn| {
        let warehouse = store::warehouses::get(conn, warehouse_id)?
            .ok_or_else(|| Error::WarehouseNotFound(warehouse_id.to_string()))?;
        if !warehouse.active_at(at) {
            return Err(Error::OutsideWindow {
                entity: format!("warehouse {}", warehouse.name),
                at,
            });
        }
        if store::platforms::by_name_open(conn, warehouse_id, &name)?.is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }

        // the sequence as it stood at the effective instant
        let pickets = store::pickets::active_at(conn, warehouse_id, at)?;
        let closed_since: BTreeSet<PicketId> = pickets
            .iter()
            .filter(|p| p.is_closed())
            .map(|p| p.id)
            .collect();
        let index = SequenceIndex::new(pickets.into_iter().map(|p| (p.id, p.name)));

        let mut candidate: BTreeSet<PicketId> = BTreeSet::new();
        for &picket_id in picket_ids {
            if index.contains(picket_id) {
                if closed_since.contains(&picket_id) {
                    return Err(Error::InvalidOperation(format!(
                        "picket {picket_id} has closed since {at}"
                    )));
                }
                candidate.insert(picket_id);
                continue;
            }
            // not in the sequence at `at`: say precisely why
            let picket = store::pickets::get(conn, picket_id)?
                .ok_or_else(|| Error::PicketNotFound(picket_id.to_string()))?;
            if picket.warehouse_id != warehouse_id {
                return Err(Error::InvalidOperation(format!(
                    "picket {} belongs to another warehouse",
                    picket.name
                )));
            }
            return Err(Error::OutsideWindow {
                entity: format!("picket {}", picket.name),
                at,
            });
        }

        match index.is_contiguous(candidate.iter().copied()) {
            Ok(true) => {}
            Ok(false) => {
                let names = index.sorted_names(candidate.iter().copied()).join(", ");
                return Err(Error::NotContiguous(names));
            }
            Err(unknown) => return Err(Error::PicketNotFound(unknown.to_string())),
        }

        let claims = load_claims(conn, warehouse_id, at)?;
        let plan = analyze(&index, &claims, &candidate)?;
        debug!(
            "absorption plan for {name}: fully absorbed {:?}, trimmed {:?}",
            plan.fully_absorbed,
            plan.partial.iter().map(|p| p.platform_id).collect::<Vec<_>>()
        );
        let claim_names: HashMap<PlatformId, String> =
            claims.iter().map(|c| (c.id, c.name.clone())).collect();
        let changed_after = |id: &PlatformId| {
            Error::InvalidOperation(format!(
                "platform {} changed after {at}",
                claim_names.get(id).cloned().unwrap_or_else(|| id.to_string())
            ))
        };

        let platform = store::platforms::insert(conn, warehouse_id, &name, at)?;
        for picket_id in &candidate {
            store::assignments::open(conn, platform.id, *picket_id, at)?;
        }

        // stock follows a platform that disappears whole
        let mut carried_total = Decimal::ZERO;
        let mut carried_types: BTreeSet<CargoTypeId> = BTreeSet::new();
        for absorbed_id in &plan.fully_absorbed {
            if let Some(record) = store::cargo::latest_at_or_before(conn, *absorbed_id, at)? {
                if !record.remainder.is_zero() {
                    carried_total += record.remainder;
                    carried_types.insert(record.cargo_type_id);
                }
            }
        }
        if carried_types.len() > 1 {
            let mut type_names = Vec::new();
            for id in &carried_types {
                if let Some(t) = store::cargo_types::get(conn, *id)? {
                    type_names.push(t.name);
                }
            }
            return Err(Error::MixedCargoTypes(format!(
                "absorbed platforms hold {}",
                type_names.join(" and ")
            )));
        }

        for absorbed_id in &plan.fully_absorbed {
            if store::assignments::any_active_for_platform_after(conn, *absorbed_id, at)? {
                return Err(changed_after(absorbed_id));
            }
            store::assignments::close_for_platform(conn, *absorbed_id, at)?;
            if store::platforms::close(conn, *absorbed_id, at)? != 1 {
                return Err(changed_after(absorbed_id));
            }
        }
        for partial in &plan.partial {
            let affected = store::assignments::close_for_picket_ids(
                conn,
                partial.platform_id,
                &partial.released,
                at,
            )?;
            if affected != partial.released.len() {
                return Err(changed_after(&partial.platform_id));
            }
        }
        // single-ownership must hold once the dust settles
        for picket_id in &candidate {
            if store::assignments::open_count_for_picket(conn, *picket_id)? != 1 {
                return Err(Error::InvalidOperation(format!(
                    "picket {picket_id} was reassigned after {at}"
                )));
            }
        }

        if let Some(cargo_type_id) = carried_types.into_iter().next() {
            if carried_total > Decimal::ZERO {
                store::cargo::insert(
                    conn,
                    platform.id,
                    cargo_type_id,
                    carried_total,
                    Decimal::ZERO,
                    carried_total,
                    at,
                )?;
            }
        }

        if !plan.is_empty() {
            info!(
                "platform {} absorbed {} platform(s) whole, trimmed {}",
                platform.name,
                plan.fully_absorbed.len(),
                plan.partial.len()
            );
        }
        Ok(platform)
    })?;
    info!("platform created: {} (id={})", platform.name, platform.id);
    Ok(platform)
}

pub fn get(db: &Database, id: PlatformId) -> Result<Platform> {
    store::platforms::get(db.conn(), id)?.ok_or_else(|| Error::PlatformNotFound(id.to_string()))
}

pub fn list(
    db: &Database,
    warehouse_id: WarehouseId,
    include_closed: bool,
) -> Result<Vec<Platform>> {
    store::warehouses::get(db.conn(), warehouse_id)?
        .ok_or_else(|| Error::WarehouseNotFound(warehouse_id.to_string()))?;
    store::platforms::list(db.conn(), warehouse_id, include_closed)
}

/// The pickets standing on the platform at the given instant.
pub fn pickets_at(db: &Database, id: PlatformId, at: Option<DateTime<Utc>>) -> Result<Vec<Picket>> {
    let t = effective_at(at);
    store::platforms::get(db.conn(), id)?.ok_or_else(|| Error::PlatformNotFound(id.to_string()))?;
    store::assignments::pickets_at(db.conn(), id, t)
}

pub fn rename(db: &mut Database, id: PlatformId, new_name: &str) -> Result<Platform> {
    let name = clean_name(new_name)?;
    db.transaction(|conn| {
        let mut platform = store::platforms::get(conn, id)?
            .ok_or_else(|| Error::PlatformNotFound(id.to_string()))?;
        if platform.is_closed() {
            return Err(Error::AlreadyClosed(format!("platform {}", platform.name)));
        }
        if platform.name == name {
            return Ok(platform);
        }
        if store::platforms::name_taken_nocase(conn, platform.warehouse_id, &name, id)? {
            return Err(Error::DuplicateName(name.clone()));
        }
        store::platforms::rename(conn, id, &name)?;
        platform.name = name;
        Ok(platform)
    })
}

/// Close the platform at `at`, releasing its pickets back to the free pool.
pub fn close(db: &mut Database, id: PlatformId, at: Option<DateTime<Utc>>) -> Result<Platform> {
    let at = effective_at(at);
    let platform = db.transaction(|conn| {
        let mut platform = store::platforms::get(conn, id)?
            .ok_or_else(|| Error::PlatformNotFound(id.to_string()))?;
        if platform.is_closed() {
            return Err(Error::AlreadyClosed(format!("platform {}", platform.name)));
        }
        if at < platform.created_at {
            return Err(Error::OutsideWindow {
                entity: format!("platform {}", platform.name),
                at,
            });
        }
        if store::assignments::any_active_for_platform_after(conn, id, at)? {
            return Err(Error::InvalidOperation(format!(
                "platform {} held pickets after {at}",
                platform.name
            )));
        }
        store::assignments::close_for_platform(conn, id, at)?;
        store::platforms::close(conn, id, at)?;
        platform.closed_at = Some(at);
        Ok(platform)
    })?;
    info!("platform closed: {} at {at}", platform.name);
    Ok(platform)
}
