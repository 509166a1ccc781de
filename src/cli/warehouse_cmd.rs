//! `stockyard warehouse …` subcommands.

use std::path::Path;

use anyhow::Result;

use crate::cli::{output, parse_at};
use crate::db::Database;
use crate::lifecycle::warehouses;
use crate::model::WarehouseId;

pub fn run_create(db_path: &Path, name: &str, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let warehouse = warehouses::create(&mut db, name, at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&warehouse)?);
    } else {
        println!("created warehouse {} (id {})", warehouse.name, warehouse.id);
    }
    Ok(())
}

pub fn run_list(db_path: &Path, all: bool) -> Result<()> {
    let db = Database::open(db_path)?;
    let list = warehouses::list(&db, all)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no warehouses");
        return Ok(());
    }
    for w in list {
        let status = match w.closed_at {
            Some(at) => format!("closed {at}"),
            None => "open".to_string(),
        };
        println!("{:>4}  {:<24} {status}", w.id.0, w.name);
    }
    Ok(())
}

pub fn run_rename(db_path: &Path, id: i64, new_name: &str) -> Result<()> {
    let mut db = Database::open(db_path)?;
    let warehouse = warehouses::rename(&mut db, WarehouseId(id), new_name)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&warehouse)?);
    } else {
        println!("renamed warehouse {} to {}", warehouse.id, warehouse.name);
    }
    Ok(())
}

pub fn run_close(db_path: &Path, id: i64, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let warehouse = warehouses::close(&mut db, WarehouseId(id), at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&warehouse)?);
    } else if let Some(closed) = warehouse.closed_at {
        println!("closed warehouse {} at {closed}", warehouse.name);
    }
    Ok(())
}
