//! Picket lifecycle.
//!
//! A picket name is a rank in the warehouse's ordered sequence, so creating
//! or renaming one can silently punch a hole through an existing platform's
//! run. Both paths therefore rebuild the would-be sequence first and sweep
//! every live claim against it before touching a row. Closing needs no such
//! sweep: the name leaves the full sequence and the owning claim together,
//! which keeps every remaining run unbroken.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{broken_claim, clean_name, effective_at, load_claims};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::{Picket, PicketId, PlatformId, WarehouseId};
use crate::store;
use crate::topology::SequenceIndex;

/// Rank placeholder for a name that is not backed by a row yet.
const INCOMING: PicketId = PicketId(-1);

/// Create a free-standing picket.
pub fn create(
    db: &mut Database,
    warehouse_id: WarehouseId,
    name: &str,
    at: Option<DateTime<Utc>>,
) -> Result<Picket> {
    let name = clean_name(name)?;
    let at = effective_at(at);
    let picket = db.transaction(|conn| {
        let warehouse = store::warehouses::get(conn, warehouse_id)?
            .ok_or_else(|| Error::WarehouseNotFound(warehouse_id.to_string()))?;
        if !warehouse.active_at(at) {
            return Err(Error::OutsideWindow {
                entity: format!("warehouse {}", warehouse.name),
                at,
            });
        }
        if store::pickets::by_name_open(conn, warehouse_id, &name)?.is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }
        check_insertion(conn, warehouse_id, &name, None, at)?;
        store::pickets::insert(conn, warehouse_id, &name, at)
    })?;
    info!("picket created: {} (id={})", picket.name, picket.id);
    Ok(picket)
}

/// Create a picket directly onto a platform. The platform's run must still be
/// unbroken with the new name inside it.
pub fn create_on_platform(
    db: &mut Database,
    platform_id: PlatformId,
    name: &str,
    at: Option<DateTime<Utc>>,
) -> Result<Picket> {
    let name = clean_name(name)?;
    let at = effective_at(at);
    let picket = db.transaction(|conn| {
        let platform = store::platforms::get(conn, platform_id)?
            .ok_or_else(|| Error::PlatformNotFound(platform_id.to_string()))?;
        if !platform.active_at(at) {
            return Err(Error::OutsideWindow {
                entity: format!("platform {}", platform.name),
                at,
            });
        }
        if store::pickets::by_name_open(conn, platform.warehouse_id, &name)?.is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }
        check_insertion(conn, platform.warehouse_id, &name, Some(platform_id), at)?;
        let picket = store::pickets::insert(conn, platform.warehouse_id, &name, at)?;
        store::assignments::open(conn, platform_id, picket.id, at)?;
        Ok(picket)
    })?;
    info!(
        "picket created: {} (id={}) on platform {platform_id}",
        picket.name, picket.id
    );
    Ok(picket)
}

pub fn get(db: &Database, id: PicketId) -> Result<Picket> {
    store::pickets::get(db.conn(), id)?.ok_or_else(|| Error::PicketNotFound(id.to_string()))
}

pub fn list(db: &Database, warehouse_id: WarehouseId, include_closed: bool) -> Result<Vec<Picket>> {
    store::warehouses::get(db.conn(), warehouse_id)?
        .ok_or_else(|| Error::WarehouseNotFound(warehouse_id.to_string()))?;
    store::pickets::list(db.conn(), warehouse_id, include_closed)
}

pub fn rename(db: &mut Database, id: PicketId, new_name: &str) -> Result<Picket> {
    let name = clean_name(new_name)?;
    db.transaction(|conn| {
        let mut picket =
            store::pickets::get(conn, id)?.ok_or_else(|| Error::PicketNotFound(id.to_string()))?;
        if picket.is_closed() {
            return Err(Error::AlreadyClosed(format!("picket {}", picket.name)));
        }
        if picket.name == name {
            return Ok(picket);
        }
        if store::pickets::name_taken_nocase(conn, picket.warehouse_id, &name, id)? {
            return Err(Error::DuplicateName(name.clone()));
        }
        // the rename reshuffles ranks for the present-day sequence
        let now = Utc::now();
        let entries: Vec<(PicketId, String)> = store::pickets::active_at(conn, picket.warehouse_id, now)?
            .into_iter()
            .map(|p| {
                let name = if p.id == id { name.clone() } else { p.name };
                (p.id, name)
            })
            .collect();
        let index = SequenceIndex::new(entries);
        let claims = load_claims(conn, picket.warehouse_id, now)?;
        if let Some(platform) = broken_claim(&index, &claims) {
            return Err(Error::NotContiguous(format!(
                "renaming picket {} to {} would break platform {}",
                picket.name, name, platform
            )));
        }
        store::pickets::rename(conn, id, &name)?;
        picket.name = name;
        Ok(picket)
    })
}

/// Close the picket at `at`. Its membership interval ends at the same
/// instant, and a platform left holding nothing closes with it.
pub fn close(db: &mut Database, id: PicketId, at: Option<DateTime<Utc>>) -> Result<Picket> {
    let at = effective_at(at);
    let picket = db.transaction(|conn| {
        let mut picket =
            store::pickets::get(conn, id)?.ok_or_else(|| Error::PicketNotFound(id.to_string()))?;
        if picket.is_closed() {
            return Err(Error::AlreadyClosed(format!("picket {}", picket.name)));
        }
        if at < picket.created_at {
            return Err(Error::OutsideWindow {
                entity: format!("picket {}", picket.name),
                at,
            });
        }
        if store::assignments::any_active_for_picket_after(conn, id, at)? {
            return Err(Error::InvalidOperation(format!(
                "picket {} was on a platform after {at}",
                picket.name
            )));
        }
        let touched = store::assignments::close_for_picket(conn, id, at)?;
        for platform_id in touched {
            if store::assignments::open_count(conn, platform_id)? == 0 {
                store::platforms::close(conn, platform_id, at)?;
                warn!("platform {platform_id} emptied and closed at {at}");
            }
        }
        store::pickets::close(conn, id, at)?;
        picket.closed_at = Some(at);
        Ok(picket)
    })?;
    info!("picket closed: {} at {at}", picket.name);
    Ok(picket)
}

/// Rebuild the warehouse sequence as it would look with `name` inserted and
/// make sure no live claim ends up with a hole. When `join` names a platform
/// the incoming picket is counted as part of that platform's run.
fn check_insertion(
    conn: &rusqlite::Connection,
    warehouse_id: WarehouseId,
    name: &str,
    join: Option<PlatformId>,
    at: DateTime<Utc>,
) -> Result<()> {
    let mut entries: Vec<(PicketId, String)> = store::pickets::active_at(conn, warehouse_id, at)?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    // a backdated create must not collide with a name that was live at `at`
    // even if that picket has since closed
    if entries.iter().any(|(_, existing)| existing == name) {
        return Err(Error::DuplicateName(name.to_string()));
    }
    entries.push((INCOMING, name.to_string()));
    let index = SequenceIndex::new(entries);

    let mut claims = load_claims(conn, warehouse_id, at)?;
    if let Some(platform_id) = join {
        for claim in &mut claims {
            if claim.id == platform_id {
                claim.pickets.insert(INCOMING);
            }
        }
    }
    if let Some(platform) = broken_claim(&index, &claims) {
        return Err(Error::NotContiguous(format!(
            "picket {name} would break the run of platform {platform}"
        )));
    }
    Ok(())
}
