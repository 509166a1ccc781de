//! `stockyard init` — create the schema, optionally with a demo yard.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::cli::output;
use crate::db::Database;
use crate::error::Result as StockyardResult;
use crate::ledger;
use crate::lifecycle::{pickets, platforms, warehouses};

pub fn run(db_path: &Path, demo: bool) -> Result<()> {
    let mut db = Database::open(db_path)?;
    if demo {
        seed_demo(&mut db)?;
        if !output::is_quiet() && !output::is_json() {
            println!("seeded demo yard in {}", db_path.display());
        }
    } else if !output::is_quiet() && !output::is_json() {
        println!("database ready at {}", db_path.display());
    }
    Ok(())
}

fn jul(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
}

/// Two yards, ten pickets, an opening day of platforms and cargo, and a
/// re-platforming on day two that exercises both partial and full
/// absorption.
fn seed_demo(db: &mut Database) -> StockyardResult<()> {
    let north = warehouses::create(db, "North Yard", Some(jul(1, 8, 0)))?;
    let south = warehouses::create(db, "South Yard", Some(jul(1, 8, 0)))?;

    let mut north_pickets = Vec::new();
    for name in ["101", "102", "103", "104", "105"] {
        north_pickets.push(pickets::create(db, north.id, name, Some(jul(1, 8, 10)))?.id);
    }
    let mut south_pickets = Vec::new();
    for name in ["201", "202", "203", "204", "205"] {
        south_pickets.push(pickets::create(db, south.id, name, Some(jul(1, 8, 10)))?.id);
    }

    let coal = ledger::create_type(db, "Coal")?;
    let grain = ledger::create_type(db, "Grain")?;

    let opening = Some(jul(1, 9, 0));
    let long = platforms::create(db, north.id, "101 - 104", &north_pickets[0..4], opening)?;
    platforms::create(db, north.id, "105", &north_pickets[4..5], opening)?;
    let pair = platforms::create(db, south.id, "201 - 202", &south_pickets[0..2], opening)?;
    platforms::create(db, south.id, "203 - 205", &south_pickets[2..5], opening)?;

    // opening-day traffic, consumed back down to zero by noon
    let coal_in = Decimal::new(1205, 1);
    ledger::record(db, long.id, coal.id, coal_in, Decimal::ZERO, Some(jul(1, 10, 0)))?;
    ledger::record(db, long.id, coal.id, Decimal::ZERO, coal_in, Some(jul(1, 12, 0)))?;
    let grain_in = Decimal::from(80);
    ledger::record(db, pair.id, grain.id, grain_in, Decimal::ZERO, Some(jul(1, 10, 0)))?;
    ledger::record(db, pair.id, grain.id, Decimal::ZERO, grain_in, Some(jul(1, 12, 0)))?;

    // day two: trim the long platform to 101-103, then sweep up 104 and 105
    let replat = Some(jul(2, 11, 24));
    let trimmed = platforms::create(db, north.id, "101 - 103", &north_pickets[0..3], replat)?;
    platforms::create(db, north.id, "104 - 105", &north_pickets[3..5], replat)?;

    ledger::record(
        db,
        trimmed.id,
        coal.id,
        Decimal::from(200),
        Decimal::ZERO,
        Some(jul(3, 9, 30)),
    )?;
    Ok(())
}
