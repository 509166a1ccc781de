//! `stockyard cargo-type …` subcommands.

use std::path::Path;

use anyhow::Result;

use crate::cli::output;
use crate::db::Database;
use crate::ledger;

pub fn run_create(db_path: &Path, name: &str) -> Result<()> {
    let mut db = Database::open(db_path)?;
    let cargo_type = ledger::create_type(&mut db, name)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&cargo_type)?);
    } else {
        println!("created cargo type {} (id {})", cargo_type.name, cargo_type.id);
    }
    Ok(())
}

pub fn run_list(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)?;
    let list = ledger::types(&db)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("no cargo types");
        return Ok(());
    }
    for t in list {
        println!("{:>4}  {}", t.id.0, t.name);
    }
    Ok(())
}
