use std::fs;

use tempfile::tempdir;
use vacancy_core::cli::Invocation;
use vacancy_core::commands::dispatch;
use vacancy_core::config::Config;
use vacancy_core::datastore::DataStore;
use vacancy_core::messages::Catalog;
use vacancy_core::month::MonthKey;
use vacancy_core::render::Renderer;
use vacancy_shared::{AvailabilityCalendarDto, DayToggleKind, MonthAvailabilityDto};

fn toggle(store: &mut DataStore, days: &[&str]) -> anyhow::Result<()> {
    let cfg = Config::default();
    let mut renderer = Renderer::new(&cfg, Catalog::english()).expect("renderer");
    let inv = Invocation {
        command: "toggle".to_string(),
        command_args: days.iter().map(|d| d.to_string()).collect(),
    };
    dispatch(store, &cfg, &mut renderer, inv)
}

fn seed_reserved(store: &DataStore, month: &str, days: &[&str]) {
    let mut snapshot = AvailabilityCalendarDto::new();
    snapshot.insert(
        month.to_string(),
        MonthAvailabilityDto {
            reserved_days: days.iter().map(|d| d.to_string()).collect(),
            blocked_days: vec![],
        },
    );
    store.save_calendar(&snapshot).expect("seed calendar");
}

fn month(raw: &str) -> MonthKey {
    raw.parse().expect("valid month key")
}

#[test]
fn toggle_moves_month_and_journals_only_effective_edits() {
    let temp = tempdir().expect("tempdir");
    let mut store = DataStore::open(temp.path()).expect("open datastore");
    seed_reserved(&store, "2099-03", &["2099-03-20"]);

    toggle(&mut store, &["2000-01-05", "2099-03-20", "2099-03-10", "11"]).expect("toggle");

    assert_eq!(store.get_current_month().expect("month"), Some(month("2099-03")));

    let edits = store.load_edits().expect("edits");
    let days: Vec<_> = edits.iter().map(|e| e.toggle.day.as_str()).collect();
    assert_eq!(days, ["2099-03-10", "2099-03-11"]);
    assert!(edits.iter().all(|e| e.month == "2099-03"));
    assert!(edits.iter().all(|e| e.toggle.kind == DayToggleKind::Blocked));

    let snapshot = store.load_calendar().expect("calendar");
    let march = &snapshot["2099-03"];
    assert_eq!(march.reserved_days, ["2099-03-20"]);
    assert_eq!(march.blocked_days, ["2099-03-10", "2099-03-11"]);
    assert!(!snapshot.contains_key("2000-01"));
}

#[test]
fn toggling_a_blocked_day_again_journals_an_allow() {
    let temp = tempdir().expect("tempdir");
    let mut store = DataStore::open(temp.path()).expect("open datastore");

    toggle(&mut store, &["2099-03-10"]).expect("block");
    toggle(&mut store, &["10"]).expect("allow");

    let kinds: Vec<_> = store
        .load_edits()
        .expect("edits")
        .into_iter()
        .map(|e| e.toggle.kind)
        .collect();
    assert_eq!(kinds, [DayToggleKind::Blocked, DayToggleKind::Allowed]);

    let snapshot = store.load_calendar().expect("calendar");
    assert!(!snapshot.contains_key("2099-03"));
}

#[test]
fn unchanged_days_leave_calendar_untouched() {
    let temp = tempdir().expect("tempdir");
    let mut store = DataStore::open(temp.path()).expect("open datastore");
    seed_reserved(&store, "2099-03", &["2099-03-20"]);
    let before = fs::read(&store.calendar_path).expect("read calendar");

    toggle(&mut store, &["2099-03-20", "2000-01-05"]).expect("toggle");

    assert_eq!(fs::read(&store.calendar_path).expect("read calendar"), before);
    assert!(store.load_edits().expect("edits").is_empty());
    assert_eq!(store.get_current_month().expect("month"), Some(month("2000-01")));
}

#[test]
fn past_only_toggle_on_fresh_store_writes_no_calendar() {
    let temp = tempdir().expect("tempdir");
    let mut store = DataStore::open(temp.path()).expect("open datastore");

    toggle(&mut store, &["2000-01-05"]).expect("toggle");

    assert!(!store.calendar_path.exists());
    assert!(store.load_edits().expect("edits").is_empty());
}

#[test]
fn out_of_range_day_fails_before_writing_anything() {
    let temp = tempdir().expect("tempdir");
    let mut store = DataStore::open(temp.path()).expect("open datastore");

    for expr in ["+3000000d", "+99999999999d", "+2000000000000000000w"] {
        assert!(toggle(&mut store, &["2099-03-10", expr]).is_err(), "{expr}");
    }

    assert_eq!(store.get_current_month().expect("month"), None);
    assert!(store.load_edits().expect("edits").is_empty());
    assert!(!store.calendar_path.exists());
}
