use chrono::NaiveDate;
use tempfile::tempdir;
use vacancy_core::calendar::{DayStatus, classify};
use vacancy_core::changes::AvailabilityCalendarChanges;
use vacancy_core::datastore::DataStore;
use vacancy_core::editor::DayToggle;
use vacancy_core::month::MonthKey;
use vacancy_core::panel::AvailabilityPanel;
use vacancy_core::plan::AvailabilityPlan;
use vacancy_shared::{
    AvailabilityCalendarDto, DayToggleKind, ListingDto, ListingState, MonthAvailabilityDto,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn june() -> MonthKey {
    MonthKey::new(2024, 6).expect("valid month")
}

#[test]
fn toggling_a_future_day_twice_restores_it() {
    let today = ymd(2024, 6, 15);
    let panel = AvailabilityPanel::new(ListingDto::default()).expect("panel");
    let mut editor = panel.editor(june(), AvailabilityCalendarChanges::new());

    assert_eq!(
        editor.toggle_day(&ymd(2024, 6, 20), today),
        Some(DayToggle::Blocked(ymd(2024, 6, 20)))
    );
    assert_eq!(
        classify(&ymd(2024, 6, 20), today, editor.current_changes()),
        DayStatus::Blocked
    );

    assert_eq!(
        editor.toggle_day(&ymd(2024, 6, 20), today),
        Some(DayToggle::Allowed(ymd(2024, 6, 20)))
    );
    assert_eq!(
        classify(&ymd(2024, 6, 20), today, editor.current_changes()),
        DayStatus::Open
    );
    assert!(editor.changes().to_snapshot().is_empty());
}

#[test]
fn reserved_day_cannot_be_toggled() {
    let today = ymd(2024, 6, 1);
    let mut snapshot = AvailabilityCalendarDto::new();
    snapshot.insert(
        "2024-06".to_string(),
        MonthAvailabilityDto {
            reserved_days: vec!["2024-06-10".to_string()],
            blocked_days: vec![],
        },
    );
    let changes = AvailabilityCalendarChanges::from_snapshot(&snapshot).expect("snapshot");
    let panel = AvailabilityPanel::new(ListingDto::default()).expect("panel");
    let mut editor = panel.editor(june(), changes);

    assert_eq!(editor.toggle_day(&ymd(2024, 6, 10), today), None);
    assert!(editor.is_pristine());
    assert_eq!(
        classify(&ymd(2024, 6, 10), today, editor.current_changes()),
        DayStatus::Reserved
    );
    assert_eq!(editor.changes().to_snapshot(), snapshot);
}

#[test]
fn new_listing_submits_default_plan() {
    let panel = AvailabilityPanel::new(ListingDto::default()).expect("panel");
    let mut editor = panel.editor(june(), AvailabilityCalendarChanges::new());
    editor.toggle_day(&ymd(2024, 6, 20), ymd(2024, 6, 15));

    let update = panel.submit(&mut editor);
    assert_eq!(update.availability_plan, AvailabilityPlan::default().to_dto());
    assert_eq!(update.availability_plan.entries.len(), 7);
    assert!(update.availability_plan.entries.iter().all(|e| e.seats == 1));
    assert!(editor.is_pristine());
}

#[test]
fn datastore_roundtrip_with_edits_and_month() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");

    assert_eq!(store.load_listing().expect("load listing"), ListingDto::default());
    assert!(store.load_calendar().expect("load calendar").is_empty());
    assert_eq!(store.get_current_month().expect("month"), None);

    let today = ymd(2024, 6, 15);
    let panel = AvailabilityPanel::new(store.load_listing().expect("listing")).expect("panel");
    let mut editor = panel.editor(june(), AvailabilityCalendarChanges::new());
    let toggle = editor
        .toggle_day(&ymd(2024, 6, 21), today)
        .expect("open day toggles");

    store
        .append_edit(&toggle.to_edit(editor.current_month()))
        .expect("append edit");
    store
        .save_calendar(&editor.changes().to_snapshot())
        .expect("save calendar");
    store.set_current_month(editor.current_month()).expect("save month");

    let mut listing = panel.listing().clone();
    listing.title = "Harbour loft".to_string();
    listing.state = ListingState::Published;
    listing.availability_plan = Some(panel.submit(&mut editor).availability_plan);
    store.save_listing(&listing).expect("save listing");

    let reopened = DataStore::open(temp.path()).expect("reopen datastore");
    assert_eq!(reopened.get_current_month().expect("month"), Some(june()));
    assert_eq!(reopened.load_listing().expect("listing"), listing);

    let edits = reopened.load_edits().expect("edits");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].month, "2024-06");
    assert_eq!(edits[0].toggle.day, "2024-06-21");
    assert_eq!(edits[0].toggle.kind, DayToggleKind::Blocked);

    let changes =
        AvailabilityCalendarChanges::from_snapshot(&reopened.load_calendar().expect("calendar"))
            .expect("snapshot");
    assert!(changes.month(june()).is_blocked(&ymd(2024, 6, 21)));
    assert!(!changes.month(june().succ().expect("july")).is_blocked(&ymd(2024, 7, 21)));
}
