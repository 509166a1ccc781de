//! Point-in-time tree snapshots across warehouses, with and without a cargo
//! filter, plus warehouse lifecycle checks and the close cascade the tree
//! makes visible.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use stockyard::ledger;
use stockyard::lifecycle::{pickets, platforms, warehouses};
use stockyard::model::CargoTypeId;
use stockyard::tree::{self, TreeNode};
use stockyard::{Database, Error};

// ── helpers ──

fn jul(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
}

fn open_db(dir: &tempfile::TempDir) -> Database {
    Database::open(&dir.path().join("stockyard.db")).unwrap()
}

fn warehouse_names(roots: &[TreeNode]) -> Vec<String> {
    roots
        .iter()
        .map(|node| match node {
            TreeNode::Warehouse { name, .. } => name.clone(),
            other => panic!("expected warehouse at the root, got {other:?}"),
        })
        .collect()
}

fn platform_names(root: &TreeNode) -> Vec<String> {
    match root {
        TreeNode::Warehouse { platforms, .. } => platforms
            .iter()
            .map(|node| match node {
                TreeNode::Platform { name, .. } => name.clone(),
                other => panic!("expected platform under a warehouse, got {other:?}"),
            })
            .collect(),
        other => panic!("expected warehouse, got {other:?}"),
    }
}

// ── snapshots through time ──

#[test]
fn tree_reflects_the_instant_it_is_asked_about() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let w = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    let mut ids = Vec::new();
    for name in ["101", "102", "103"] {
        ids.push(pickets::create(&mut db, w.id, name, Some(jul(1, 8, 10))).unwrap().id);
    }
    platforms::create(&mut db, w.id, "101 - 102", &ids[0..2], Some(jul(1, 9, 0))).unwrap();

    // before the warehouse existed: nothing
    assert!(tree::build(&db, Some(jul(1, 7, 0)), None).unwrap().is_empty());

    // after creation but before any platform: the warehouse stands alone
    let roots = tree::build(&db, Some(jul(1, 8, 30)), None).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["North Yard"]);
    assert!(platform_names(&roots[0]).is_empty());

    // from the platform's instant onward it appears with its pickets
    let roots = tree::build(&db, Some(jul(1, 9, 0)), None).unwrap();
    assert_eq!(platform_names(&roots[0]), vec!["101 - 102"]);
    let json = serde_json::to_value(&roots).unwrap();
    let platform = &json[0]["platforms"][0];
    assert_eq!(platform["kind"], "platform");
    assert_eq!(platform["pickets"][0]["name"], "101");
    assert_eq!(platform["pickets"][1]["name"], "102");
}

#[test]
fn replatforming_is_visible_only_from_its_instant() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let w = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    let mut ids = Vec::new();
    for name in ["101", "102", "103", "104", "105"] {
        ids.push(pickets::create(&mut db, w.id, name, Some(jul(1, 8, 10))).unwrap().id);
    }
    let long = platforms::create(&mut db, w.id, "101 - 104", &ids[0..4], Some(jul(1, 9, 0))).unwrap();
    platforms::create(&mut db, w.id, "105", &ids[4..5], Some(jul(1, 9, 0))).unwrap();

    let shuffle = jul(2, 11, 24);
    platforms::create(&mut db, w.id, "101 - 103", &ids[0..3], Some(shuffle)).unwrap();
    platforms::create(&mut db, w.id, "104 - 105", &ids[3..5], Some(shuffle)).unwrap();

    // the day before: the original layout
    let roots = tree::build(&db, Some(jul(2, 10, 0)), None).unwrap();
    assert_eq!(platform_names(&roots[0]), vec!["101 - 104", "105"]);

    // from the shuffle onward: the new layout
    let roots = tree::build(&db, Some(shuffle), None).unwrap();
    assert_eq!(platform_names(&roots[0]), vec!["101 - 103", "104 - 105"]);

    // the closed platform still answers historical membership queries
    let held = platforms::pickets_at(&db, long.id, Some(jul(1, 12, 0))).unwrap();
    assert_eq!(held.len(), 4);
}

// ── cargo summaries and filtering ──

#[test]
fn filter_keeps_only_platforms_holding_the_type() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let north = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    let south = warehouses::create(&mut db, "South Yard", Some(jul(1, 8, 0))).unwrap();
    let n1 = pickets::create(&mut db, north.id, "101", Some(jul(1, 8, 10))).unwrap();
    let s1 = pickets::create(&mut db, south.id, "201", Some(jul(1, 8, 10))).unwrap();
    let s2 = pickets::create(&mut db, south.id, "202", Some(jul(1, 8, 10))).unwrap();
    let coal_dock =
        platforms::create(&mut db, north.id, "101", &[n1.id], Some(jul(1, 9, 0))).unwrap();
    let grain_dock =
        platforms::create(&mut db, south.id, "201", &[s1.id], Some(jul(1, 9, 0))).unwrap();
    platforms::create(&mut db, south.id, "202", &[s2.id], Some(jul(1, 9, 0))).unwrap();

    let coal = ledger::create_type(&mut db, "Coal").unwrap();
    let grain = ledger::create_type(&mut db, "Grain").unwrap();
    ledger::record(&mut db, coal_dock.id, coal.id, dec!(120.5), dec!(0), Some(jul(1, 10, 0)))
        .unwrap();
    ledger::record(&mut db, grain_dock.id, grain.id, dec!(80), dec!(0), Some(jul(1, 10, 0)))
        .unwrap();

    // unfiltered: both warehouses, empty platform shown with the no-cargo marker
    let roots = tree::build(&db, Some(jul(1, 11, 0)), None).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["North Yard", "South Yard"]);
    let json = serde_json::to_value(&roots).unwrap();
    assert_eq!(json[0]["platforms"][0]["cargo"]["cargo_type"], "Coal");
    assert_eq!(json[0]["platforms"][0]["cargo"]["remainder"], "120.5");
    assert!(json[1]["platforms"][1]["cargo"].is_null());

    // Coal filter: South has none and disappears entirely
    let roots = tree::build(&db, Some(jul(1, 11, 0)), Some(coal.id)).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["North Yard"]);
    assert_eq!(platform_names(&roots[0]), vec!["101"]);

    // Grain filter: only the grain dock survives, the empty 202 is dropped
    let roots = tree::build(&db, Some(jul(1, 11, 0)), Some(grain.id)).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["South Yard"]);
    assert_eq!(platform_names(&roots[0]), vec!["201"]);

    // once the grain is consumed the filter finds nothing at later instants
    ledger::record(&mut db, grain_dock.id, grain.id, dec!(0), dec!(80), Some(jul(1, 12, 0)))
        .unwrap();
    let roots = tree::build(&db, Some(jul(1, 13, 0)), Some(grain.id)).unwrap();
    assert!(roots.is_empty());
    // but the filter still matches at instants when the grain was there
    let roots = tree::build(&db, Some(jul(1, 11, 30)), Some(grain.id)).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["South Yard"]);
}

#[test]
fn filter_requires_a_known_cargo_type() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let err = tree::build(&db, None, Some(CargoTypeId(99))).unwrap_err();
    assert!(matches!(err, Error::CargoTypeNotFound(_)));
}

// ── warehouse lifecycle ──

#[test]
fn closing_a_warehouse_closes_everything_under_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let w = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    let p = pickets::create(&mut db, w.id, "101", Some(jul(1, 8, 10))).unwrap();
    let plat = platforms::create(&mut db, w.id, "101", &[p.id], Some(jul(1, 9, 0))).unwrap();

    warehouses::close(&mut db, w.id, Some(jul(1, 18, 0))).unwrap();

    assert_eq!(
        pickets::get(&db, p.id).unwrap().closed_at,
        Some(jul(1, 18, 0))
    );
    assert_eq!(
        platforms::get(&db, plat.id).unwrap().closed_at,
        Some(jul(1, 18, 0))
    );
    assert!(warehouses::list(&db, false).unwrap().is_empty());
    assert_eq!(warehouses::list(&db, true).unwrap().len(), 1);

    // the tree shows the yard right up to the closing instant
    assert!(!tree::build(&db, Some(jul(1, 17, 59)), None).unwrap().is_empty());
    assert!(tree::build(&db, Some(jul(1, 18, 0)), None).unwrap().is_empty());
}

#[test]
fn warehouse_rename_checks_collisions_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let north = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    warehouses::create(&mut db, "South Yard", Some(jul(1, 8, 0))).unwrap();

    // a name held by another open warehouse is taken, whatever the case
    let err = warehouses::rename(&mut db, north.id, "south yard").unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));

    let renamed = warehouses::rename(&mut db, north.id, "Harbour Yard").unwrap();
    assert_eq!(renamed.name, "Harbour Yard");

    warehouses::close(&mut db, north.id, Some(jul(1, 9, 0))).unwrap();
    let err = warehouses::rename(&mut db, north.id, "West Yard").unwrap_err();
    assert!(matches!(err, Error::AlreadyClosed(_)));
}

#[test]
fn warehouse_close_cannot_be_backdated_under_later_activity() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let w = warehouses::create(&mut db, "North Yard", Some(jul(1, 8, 0))).unwrap();
    let p = pickets::create(&mut db, w.id, "101", Some(jul(1, 8, 10))).unwrap();
    platforms::create(&mut db, w.id, "101", &[p.id], Some(jul(1, 9, 0))).unwrap();

    // 08:30 predates the platform that is on record from 09:00
    let err = warehouses::close(&mut db, w.id, Some(jul(1, 8, 30))).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
    assert!(warehouses::get(&db, w.id).unwrap().closed_at.is_none());
}

// ── the seeded demo yard ──

#[test]
fn demo_seed_builds_a_consistent_yard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stockyard.db");
    stockyard::cli::init_cmd::run(&path, true).unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(warehouses::list(&db, false).unwrap().len(), 2);

    // after the day-two replatforming and the day-three coal delivery
    let roots = tree::build(&db, Some(jul(3, 10, 0)), None).unwrap();
    assert_eq!(warehouse_names(&roots), vec!["North Yard", "South Yard"]);
    assert_eq!(platform_names(&roots[0]), vec!["101 - 103", "104 - 105"]);
    assert_eq!(platform_names(&roots[1]), vec!["201 - 202", "203 - 205"]);

    let json = serde_json::to_value(&roots).unwrap();
    assert_eq!(json[0]["platforms"][0]["cargo"]["cargo_type"], "Coal");
    assert_eq!(json[0]["platforms"][0]["cargo"]["remainder"], "200");
    assert!(json[0]["platforms"][1]["cargo"].is_null());

    // day one looked different: the original long platform, coal aboard
    let roots = tree::build(&db, Some(jul(1, 10, 30)), None).unwrap();
    assert_eq!(platform_names(&roots[0]), vec!["101 - 104", "105"]);
    let json = serde_json::to_value(&roots).unwrap();
    assert_eq!(json[0]["platforms"][0]["cargo"]["remainder"], "120.5");
}
