//! `stockyard picket …` subcommands.

use std::path::Path;

use anyhow::Result;

use crate::cli::{output, parse_at};
use crate::db::Database;
use crate::lifecycle::pickets;
use crate::model::{PicketId, PlatformId, WarehouseId};

pub fn run_create(
    db_path: &Path,
    warehouse: i64,
    name: &str,
    platform: Option<i64>,
    at: Option<&str>,
) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let picket = match platform {
        Some(platform_id) => {
            pickets::create_on_platform(&mut db, PlatformId(platform_id), name, at)?
        }
        None => pickets::create(&mut db, WarehouseId(warehouse), name, at)?,
    };
    if output::is_json() {
        output::print_json(&serde_json::to_value(&picket)?);
    } else {
        println!("created picket {} (id {})", picket.name, picket.id);
    }
    Ok(())
}

pub fn run_list(db_path: &Path, warehouse: i64, all: bool) -> Result<()> {
    let db = Database::open(db_path)?;
    let list = pickets::list(&db, WarehouseId(warehouse), all)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no pickets");
        return Ok(());
    }
    for p in list {
        let status = match p.closed_at {
            Some(at) => format!("closed {at}"),
            None => "open".to_string(),
        };
        println!("{:>4}  {:<16} {status}", p.id.0, p.name);
    }
    Ok(())
}

pub fn run_rename(db_path: &Path, id: i64, new_name: &str) -> Result<()> {
    let mut db = Database::open(db_path)?;
    let picket = pickets::rename(&mut db, PicketId(id), new_name)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&picket)?);
    } else {
        println!("renamed picket {} to {}", picket.id, picket.name);
    }
    Ok(())
}

pub fn run_close(db_path: &Path, id: i64, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let picket = pickets::close(&mut db, PicketId(id), at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&picket)?);
    } else if let Some(closed) = picket.closed_at {
        println!("closed picket {} at {closed}", picket.name);
    }
    Ok(())
}
