//! `stockyard cargo …` subcommands.

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::cli::{output, parse_at};
use crate::db::Database;
use crate::error::Error;
use crate::ledger;
use crate::model::PlatformId;

fn parse_quantity(raw: &str) -> std::result::Result<Decimal, Error> {
    Decimal::from_str(raw.trim())
        .map_err(|_| Error::InvalidOperation(format!("'{raw}' is not a decimal quantity")))
}

pub fn run_record(
    db_path: &Path,
    platform: i64,
    cargo_type: &str,
    coming: &str,
    consumption: &str,
    at: Option<&str>,
) -> Result<()> {
    let coming = parse_quantity(coming)?;
    let consumption = parse_quantity(consumption)?;
    let at = parse_at(at)?;
    let mut db = Database::open(db_path)?;
    let type_id = ledger::type_by_name(&db, cargo_type)?.id;
    let record = ledger::record(&mut db, PlatformId(platform), type_id, coming, consumption, at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&record)?);
    } else {
        println!(
            "booked +{} -{} of {cargo_type} on platform {platform}: remainder {}",
            record.coming, record.consumption, record.remainder
        );
    }
    Ok(())
}

pub fn run_current(db_path: &Path, platform: i64, at: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let db = Database::open(db_path)?;
    let record = ledger::current(&db, PlatformId(platform), at)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&record)?);
    } else {
        let type_name = ledger::types(&db)?
            .into_iter()
            .find(|t| t.id == record.cargo_type_id)
            .map(|t| t.name)
            .unwrap_or_else(|| record.cargo_type_id.to_string());
        println!(
            "platform {platform}: {} {type_name} as of {}",
            record.remainder, record.recorded_at
        );
    }
    Ok(())
}

pub fn run_history(
    db_path: &Path,
    platform: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let from = parse_at(from)?;
    let to = parse_at(to)?;
    let db = Database::open(db_path)?;
    let rows = ledger::history(&db, PlatformId(platform), from, to)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no cargo records");
        return Ok(());
    }
    println!(
        "{:<25} {:>12} {:>12} {:>12}",
        "recorded", "coming", "consumption", "remainder"
    );
    for r in rows {
        println!(
            "{:<25} {:>12} {:>12} {:>12}",
            r.recorded_at.to_rfc3339(),
            r.coming.to_string(),
            r.consumption.to_string(),
            r.remainder.to_string()
        );
    }
    Ok(())
}
