//! Warehouse lifecycle. Closing a warehouse cascades: every open platform,
//! picket and assignment underneath it is stamped with the same instant.

use chrono::{DateTime, Utc};
use tracing::info;

use super::{clean_name, effective_at};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::{Warehouse, WarehouseId};
use crate::store;

pub fn create(db: &mut Database, name: &str, at: Option<DateTime<Utc>>) -> Result<Warehouse> {
    let name = clean_name(name)?;
    let at = effective_at(at);
    let warehouse = db.transaction(|conn| {
        if store::warehouses::by_name_open(conn, &name)?.is_some() {
            return Err(Error::DuplicateName(name.clone()));
        }
        store::warehouses::insert(conn, &name, at)
    })?;
    info!("warehouse created: {} (id={})", warehouse.name, warehouse.id);
    Ok(warehouse)
}

pub fn get(db: &Database, id: WarehouseId) -> Result<Warehouse> {
    store::warehouses::get(db.conn(), id)?.ok_or_else(|| Error::WarehouseNotFound(id.to_string()))
}

pub fn list(db: &Database, include_closed: bool) -> Result<Vec<Warehouse>> {
    store::warehouses::list(db.conn(), include_closed)
}

pub fn rename(db: &mut Database, id: WarehouseId, new_name: &str) -> Result<Warehouse> {
    let name = clean_name(new_name)?;
    db.transaction(|conn| {
        let mut warehouse = store::warehouses::get(conn, id)?
            .ok_or_else(|| Error::WarehouseNotFound(id.to_string()))?;
        if warehouse.is_closed() {
            return Err(Error::AlreadyClosed(format!("warehouse {}", warehouse.name)));
        }
        if warehouse.name == name {
            return Ok(warehouse);
        }
        if store::warehouses::name_taken_nocase(conn, &name, id)? {
            return Err(Error::DuplicateName(name.clone()));
        }
        store::warehouses::rename(conn, id, &name)?;
        warehouse.name = name;
        Ok(warehouse)
    })
}

/// Close the warehouse and everything in it at `at`.
pub fn close(db: &mut Database, id: WarehouseId, at: Option<DateTime<Utc>>) -> Result<Warehouse> {
    let at = effective_at(at);
    let warehouse = db.transaction(|conn| {
        let mut warehouse = store::warehouses::get(conn, id)?
            .ok_or_else(|| Error::WarehouseNotFound(id.to_string()))?;
        if warehouse.is_closed() {
            return Err(Error::AlreadyClosed(format!("warehouse {}", warehouse.name)));
        }
        if at < warehouse.created_at {
            return Err(Error::OutsideWindow {
                entity: format!("warehouse {}", warehouse.name),
                at,
            });
        }
        // a backdated close must not swallow rows born after the instant or
        // contradict membership recorded after it
        if store::platforms::any_open_created_after(conn, id, at)?
            || store::pickets::any_open_created_after(conn, id, at)?
            || store::assignments::any_active_in_warehouse_after(conn, id, at)?
        {
            return Err(Error::InvalidOperation(format!(
                "warehouse {} saw activity after {at}",
                warehouse.name
            )));
        }
        store::assignments::close_all_in_warehouse(conn, id, at)?;
        store::platforms::close_all_in_warehouse(conn, id, at)?;
        store::pickets::close_all_in_warehouse(conn, id, at)?;
        store::warehouses::close(conn, id, at)?;
        warehouse.closed_at = Some(at);
        Ok(warehouse)
    })?;
    info!("warehouse closed: {} at {at}", warehouse.name);
    Ok(warehouse)
}
