use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use miqat_core::{CalendarConfig, CalendarSession, DayLookup, HabitRecord, UmmAlQuraOracle};
use miqat_store::HabitStore;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn records_load_write_and_feed_the_calendar() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();

    write_file(
        &root.join("2024").join("2024-07-07.json"),
        r#"{ "fajr": true, "dhuhr": true, "asr": false, "quran": true }"#,
    );
    write_file(&root.join("2024-07-08.json"), "{}");
    write_file(&root.join("notes.json"), r#"{ "ignored": true }"#);
    write_file(&root.join("2024-07-09.json"), "not json");

    let store = HabitStore::builder()
        .add_root(root)
        .build()
        .expect("build habit store");

    assert_eq!(store.dates(), vec![date(2024, 7, 7), date(2024, 7, 8)]);
    let first = store.record(date(2024, 7, 7)).expect("record present");
    assert!(first.is_done("fajr"));
    assert!(!first.is_done("asr"));
    assert!(store.record_for(date(2024, 7, 8)).expect("empty record").is_empty());
    assert!(store.record(date(2024, 7, 10)).is_none());

    let updated = store
        .set_habit(date(2024, 7, 10), "isha", true)
        .expect("toggle habit");
    assert!(updated.is_done("isha"));
    let written = root.join("2024").join("2024-07-10.json");
    let on_disk: HabitRecord =
        serde_json::from_str(&fs::read_to_string(&written).expect("read record")).unwrap();
    assert_eq!(on_disk, updated);

    store
        .set_habit(date(2024, 7, 8), "fajr", true)
        .expect("toggle existing");
    let rewritten = fs::read_to_string(root.join("2024-07-08.json")).unwrap();
    assert!(rewritten.contains("fajr"));

    let store = Arc::new(store);
    let lookup_store = Arc::clone(&store);
    let session = CalendarSession::new(
        UmmAlQuraOracle::new(),
        move |day: NaiveDate| lookup_store.record(day),
        &CalendarConfig::default(),
        date(2024, 7, 20),
    )
    .expect("calendar session");

    let grid = session.grid();
    assert_eq!(grid.first_date(), Some(date(2024, 7, 7)));
    let new_year = grid.day(date(2024, 7, 7)).unwrap();
    // fajr + dhuhr of five prayers; quran of five optional acts.
    assert_eq!(new_year.required_progress, Some(40));
    assert_eq!(new_year.optional_progress, Some(20));
    let next_day = grid.day(date(2024, 7, 8)).unwrap();
    assert_eq!(next_day.required_progress, Some(20));
    assert_eq!(next_day.optional_progress, Some(0));
    assert_eq!(grid.day(date(2024, 7, 9)).unwrap().required_progress, None);
}

#[test]
fn reload_picks_up_external_edits() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    let store = HabitStore::builder()
        .add_root(root)
        .build()
        .expect("build habit store");
    assert!(store.dates().is_empty());

    let day = date(2025, 3, 1);
    let path = root.join("2025").join("2025-03-01.json");
    write_file(&path, r#"{ "fajr": true }"#);
    store.reload_date(day).expect("reload one day");
    assert!(store.record(day).expect("loaded").is_done("fajr"));

    fs::remove_file(&path).unwrap();
    store.reload_date(day).expect("reload removed day");
    assert!(store.record(day).is_none());

    write_file(&path, r#"{ "isha": true }"#);
    store.reload_all().expect("reload all");
    assert_eq!(store.dates(), vec![day]);
}

#[test]
fn reload_finds_records_outside_year_folders() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    let store = HabitStore::builder()
        .add_root(root)
        .build()
        .expect("build habit store");

    let day = date(2025, 3, 1);
    let flat = root.join("2025-03-01.json");
    write_file(&flat, r#"{ "fajr": true }"#);
    store.reload_date(day).expect("reload flat record");
    assert!(store.record(day).expect("flat record loaded").is_done("fajr"));

    let nested = root.join("archive").join("2025-03-02.json");
    write_file(&nested, r#"{ "isha": true }"#);
    assert_eq!(store.reload_path(&nested).expect("reload by path"), date(2025, 3, 2));
    assert!(store.record(date(2025, 3, 2)).expect("nested record").is_done("isha"));

    fs::remove_file(&nested).unwrap();
    store.reload_path(&nested).expect("reload removed path");
    assert!(store.record(date(2025, 3, 2)).is_none());
    assert!(store.reload_path(&root.join("notes.json")).is_err());
}

#[test]
fn watcher_reports_records_created_after_startup() {
    let temp = tempdir().expect("tempdir");
    let staging = tempdir().expect("staging dir");
    let root = temp.path();
    let mut store = HabitStore::builder()
        .add_root(root)
        .build()
        .expect("build habit store");
    let changes = store.watch().expect("watch roots");

    // Renamed into place so the record is complete when the event fires.
    let draft = staging.path().join("draft.json");
    write_file(&draft, r#"{ "fajr": true, "asr": true }"#);
    let target = root.join("2025-03-01.json");
    fs::rename(&draft, &target).expect("move record into root");

    let deadline = Instant::now() + Duration::from_secs(10);
    let reported = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let path = changes.recv_timeout(remaining).expect("record change reported");
        if path.file_name() == target.file_name() {
            break path;
        }
    };
    let day = store.reload_path(&reported).expect("reload reported path");
    assert_eq!(day, date(2025, 3, 1));
    let record = store.record(day).expect("record loaded");
    assert!(record.is_done("fajr"));
    assert!(record.is_done("asr"));
}

#[test]
fn writes_need_a_root() {
    let store = HabitStore::builder().build().expect("empty store");
    assert!(store.set_habit(date(2025, 1, 1), "fajr", true).is_err());
}
