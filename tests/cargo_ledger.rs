//! Cargo ledger behaviour: running remainders, same-instant merging, the
//! single-commodity rule, and the stock floor.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use stockyard::ledger;
use stockyard::lifecycle::{pickets, platforms, warehouses};
use stockyard::model::{CargoTypeId, PlatformId};
use stockyard::{Database, Error, ErrorKind};

// ── helpers ──

fn jul(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
}

/// A platform ready for bookings plus the Coal and Grain type ids.
fn rig(db: &mut Database) -> (PlatformId, CargoTypeId, CargoTypeId) {
    let w = warehouses::create(db, "Yard", Some(jul(1, 8, 0))).unwrap();
    let mut ids = Vec::new();
    for name in ["101", "102", "103"] {
        ids.push(pickets::create(db, w.id, name, Some(jul(1, 8, 10))).unwrap().id);
    }
    let platform = platforms::create(db, w.id, "101 - 103", &ids, Some(jul(1, 9, 0))).unwrap();
    let coal = ledger::create_type(db, "Coal").unwrap();
    let grain = ledger::create_type(db, "Grain").unwrap();
    (platform.id, coal.id, grain.id)
}

fn open_db(dir: &tempfile::TempDir) -> Database {
    Database::open(&dir.path().join("stockyard.db")).unwrap()
}

// ── running remainder ──

#[test]
fn remainder_runs_forward_from_each_predecessor() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);

    let r1 = ledger::record(&mut db, platform, coal, dec!(120.5), dec!(0), Some(jul(1, 10, 0)))
        .unwrap();
    assert_eq!(r1.remainder, dec!(120.5));
    let r2 = ledger::record(&mut db, platform, coal, dec!(0), dec!(20.5), Some(jul(1, 11, 0)))
        .unwrap();
    assert_eq!(r2.remainder, dec!(100));
    let r3 = ledger::record(&mut db, platform, coal, dec!(30), dec!(130), Some(jul(1, 12, 0)))
        .unwrap();
    assert_eq!(r3.remainder, dec!(0));

    let history = ledger::history(&db, platform, None, None).unwrap();
    let remainders: Vec<_> = history.iter().map(|r| r.remainder).collect();
    assert_eq!(remainders, vec![dec!(120.5), dec!(100), dec!(0)]);
}

#[test]
fn same_instant_bookings_merge_into_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    let t = jul(1, 10, 0);

    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(t)).unwrap();
    let merged = ledger::record(&mut db, platform, coal, dec!(5), dec!(2), Some(t)).unwrap();

    assert_eq!(merged.coming, dec!(15));
    assert_eq!(merged.consumption, dec!(2));
    assert_eq!(merged.remainder, dec!(13));
    assert_eq!(merged.recorded_at, t);

    let history = ledger::history(&db, platform, None, None).unwrap();
    assert_eq!(history.len(), 1, "merge must not add a second row");
    assert_eq!(history[0].remainder, dec!(13));
}

#[test]
fn consumption_below_zero_is_rejected_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(jul(1, 10, 0))).unwrap();

    let err = ledger::record(&mut db, platform, coal, dec!(0), dec!(25), Some(jul(1, 11, 0)))
        .unwrap_err();
    match err {
        Error::InsufficientStock(short) => assert_eq!(short, dec!(-15)),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(ledger::history(&db, platform, None, None).unwrap().len(), 1);
    assert_eq!(
        ledger::current(&db, platform, None).unwrap().remainder,
        dec!(10)
    );
}

#[test]
fn merge_that_would_overdraw_leaves_the_row_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    let t = jul(1, 10, 0);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(t)).unwrap();

    let err = ledger::record(&mut db, platform, coal, dec!(0), dec!(11), Some(t)).unwrap_err();
    assert!(matches!(err, Error::InsufficientStock(_)));

    let row = ledger::current(&db, platform, None).unwrap();
    assert_eq!(row.coming, dec!(10));
    assert_eq!(row.consumption, dec!(0));
}

// ── asking about the past ──

#[test]
fn current_before_the_first_booking_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);

    // an empty ledger has no answer at all
    let err = ledger::current(&db, platform, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(jul(1, 10, 0))).unwrap();

    // asking about an instant before the first row is still not-found
    let err = ledger::current(&db, platform, Some(jul(1, 9, 30))).unwrap_err();
    assert!(matches!(err, Error::NoCargoRecorded { .. }));
    // at and after the first row the answer exists
    assert_eq!(
        ledger::current(&db, platform, Some(jul(1, 10, 0))).unwrap().remainder,
        dec!(10)
    );
}

#[test]
fn current_picks_the_newest_row_at_or_before_the_instant() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(jul(1, 10, 0))).unwrap();
    ledger::record(&mut db, platform, coal, dec!(5), dec!(0), Some(jul(1, 12, 0))).unwrap();

    assert_eq!(
        ledger::current(&db, platform, Some(jul(1, 11, 0))).unwrap().remainder,
        dec!(10)
    );
    assert_eq!(
        ledger::current(&db, platform, Some(jul(1, 12, 0))).unwrap().remainder,
        dec!(15)
    );
}

#[test]
fn backdated_booking_does_not_rewrite_later_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(jul(1, 10, 0))).unwrap();
    ledger::record(&mut db, platform, coal, dec!(5), dec!(0), Some(jul(1, 12, 0))).unwrap();

    // inserted between the two: derives from the 10:00 row
    let mid = ledger::record(&mut db, platform, coal, dec!(1), dec!(0), Some(jul(1, 11, 0)))
        .unwrap();
    assert_eq!(mid.remainder, dec!(11));

    // rows already written keep their figures
    let remainders: Vec<_> = ledger::history(&db, platform, None, None)
        .unwrap()
        .into_iter()
        .map(|r| r.remainder)
        .collect();
    assert_eq!(remainders, vec![dec!(10), dec!(11), dec!(15)]);
}

// ── the single-commodity rule ──

#[test]
fn commodity_switches_only_at_zero_remainder() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, grain) = rig(&mut db);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(jul(1, 10, 0))).unwrap();

    // still holding coal: grain is refused
    let err = ledger::record(&mut db, platform, grain, dec!(5), dec!(0), Some(jul(1, 11, 0)))
        .unwrap_err();
    assert!(matches!(err, Error::MixedCargoTypes(_)));

    // empty the platform, then the switch is fine
    ledger::record(&mut db, platform, coal, dec!(0), dec!(10), Some(jul(1, 12, 0))).unwrap();
    let switched =
        ledger::record(&mut db, platform, grain, dec!(5), dec!(0), Some(jul(1, 13, 0))).unwrap();
    assert_eq!(switched.cargo_type_id, grain);
    assert_eq!(switched.remainder, dec!(5));
}

#[test]
fn merging_a_different_commodity_into_an_instant_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, grain) = rig(&mut db);
    let t = jul(1, 10, 0);
    ledger::record(&mut db, platform, coal, dec!(10), dec!(0), Some(t)).unwrap();

    let err = ledger::record(&mut db, platform, grain, dec!(5), dec!(0), Some(t)).unwrap_err();
    assert!(matches!(err, Error::MixedCargoTypes(_)));
}

// ── booking windows and lookups ──

#[test]
fn closed_platform_accepts_bookings_dated_inside_its_lifetime() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    platforms::close(&mut db, platform, Some(jul(1, 14, 0))).unwrap();

    // inside the lifetime window: accepted even though the platform is closed
    let rec = ledger::record(&mut db, platform, coal, dec!(7), dec!(0), Some(jul(1, 10, 0)))
        .unwrap();
    assert_eq!(rec.remainder, dec!(7));

    // at or past the close instant: rejected
    let err = ledger::record(&mut db, platform, coal, dec!(1), dec!(0), Some(jul(1, 14, 0)))
        .unwrap_err();
    assert!(matches!(err, Error::OutsideWindow { .. }));
    // before the platform existed: rejected
    let err = ledger::record(&mut db, platform, coal, dec!(1), dec!(0), Some(jul(1, 8, 30)))
        .unwrap_err();
    assert!(matches!(err, Error::OutsideWindow { .. }));
}

#[test]
fn negative_quantities_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);

    let err = ledger::record(&mut db, platform, coal, dec!(-1), dec!(0), None).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
    let err = ledger::record(&mut db, platform, coal, dec!(0), dec!(-1), None).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
}

#[test]
fn unknown_ids_map_to_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);

    let err = ledger::record(&mut db, PlatformId(999), coal, dec!(1), dec!(0), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = ledger::record(&mut db, platform, CargoTypeId(999), dec!(1), dec!(0), None)
        .unwrap_err();
    assert!(matches!(err, Error::CargoTypeNotFound(_)));
    let err = ledger::type_by_name(&db, "Restium").unwrap_err();
    assert!(matches!(err, Error::CargoTypeNotFound(_)));
}

#[test]
fn type_names_are_unique_ignoring_case() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    ledger::create_type(&mut db, "Coal").unwrap();

    let err = ledger::create_type(&mut db, "coal").unwrap_err();
    assert!(matches!(err, Error::DuplicateName(_)));
    // lookup is equally forgiving, and the refused duplicate left no row
    assert_eq!(ledger::type_by_name(&db, "COAL").unwrap().name, "Coal");
    assert_eq!(ledger::types(&db).unwrap().len(), 1);
}

#[test]
fn history_slices_by_optional_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open_db(&dir);
    let (platform, coal, _) = rig(&mut db);
    for hour in [10, 11, 12] {
        ledger::record(&mut db, platform, coal, dec!(1), dec!(0), Some(jul(1, hour, 0)))
            .unwrap();
    }

    assert_eq!(ledger::history(&db, platform, None, None).unwrap().len(), 3);
    let slice = ledger::history(&db, platform, Some(jul(1, 11, 0)), None).unwrap();
    assert_eq!(slice.len(), 2);
    let slice = ledger::history(&db, platform, Some(jul(1, 11, 0)), Some(jul(1, 11, 0))).unwrap();
    assert_eq!(slice.len(), 1);
    assert_eq!(slice[0].recorded_at, jul(1, 11, 0));
}
