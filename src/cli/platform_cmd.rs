//! `stockyard platform …` subcommands.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::cli::{output, parse_at};
use crate::db::Database;
use crate::error::Error;
use crate::lifecycle::platforms;
use crate::model::{PicketId, PlatformId, WarehouseId};
use crate::store;

pub fn run_create(
    db_path: &Path,
    warehouse: i64,
    name: &str,
    picket_names: &[String],
    at: Option<&str>,
) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;

    // picket names are resolved against the sequence at the effective
    // instant; the create re-validates the ids inside its transaction
    let t = at.unwrap_or_else(Utc::now);
    let active = store::pickets::active_at(db.conn(), WarehouseId(warehouse), t)?;
    let by_name: HashMap<&str, PicketId> =
        active.iter().map(|p| (p.name.as_str(), p.id)).collect();
    let mut ids = Vec::with_capacity(picket_names.len());
    for raw in picket_names {
        let trimmed = raw.trim();
        let id = *by_name
            .get(trimmed)
            .ok_or_else(|| Error::PicketNotFound(trimmed.to_string()))?;
        ids.push(id);
    }

    let platform = platforms::create(&mut db, WarehouseId(warehouse), name, &ids, at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&platform)?);
    } else {
        println!(
            "created platform {} (id {}) over {} picket(s)",
            platform.name,
            platform.id,
            ids.len()
        );
    }
    Ok(())
}

pub fn run_list(db_path: &Path, warehouse: i64, all: bool) -> Result<()> {
    let db = Database::open(db_path)?;
    let list = platforms::list(&db, WarehouseId(warehouse), all)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no platforms");
        return Ok(());
    }
    for p in list {
        let status = match p.closed_at {
            Some(at) => format!("closed {at}"),
            None => "open".to_string(),
        };
        println!("{:>4}  {:<24} {status}", p.id.0, p.name);
    }
    Ok(())
}

pub fn run_pickets(db_path: &Path, id: i64, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let db = Database::open(db_path)?;
    let list = platforms::pickets_at(&db, PlatformId(id), at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no pickets on platform {id} at that instant");
        return Ok(());
    }
    for p in list {
        println!("{:>4}  {}", p.id.0, p.name);
    }
    Ok(())
}

pub fn run_rename(db_path: &Path, id: i64, new_name: &str) -> Result<()> {
    let mut db = Database::open(db_path)?;
    let platform = platforms::rename(&mut db, PlatformId(id), new_name)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&platform)?);
    } else {
        println!("renamed platform {} to {}", platform.id, platform.name);
    }
    Ok(())
}

pub fn run_close(db_path: &Path, id: i64, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let platform = platforms::close(&mut db, PlatformId(id), at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&platform)?);
    } else if let Some(closed) = platform.closed_at {
        println!("closed platform {} at {closed}", platform.name);
    }
    Ok(())
}
