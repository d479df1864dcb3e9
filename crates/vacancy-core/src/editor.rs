use chrono::NaiveDate;
use tracing::{
  debug,
  info
};
use vacancy_shared::{
  DayEditDto,
  DayToggleDto,
  DayToggleKind
};

use crate::changes::{
  AvailabilityCalendarChanges,
  MonthChangeSet
};
use crate::datetime::{
  CalendarDay,
  format_day,
  is_past
};
use crate::messages::MessageId;
use crate::month::MonthKey;
use crate::plan::AvailabilityPlan;

pub const UPDATE_FAILED_MESSAGE: &str =
  "EditListingAvailabilityForm.updateFailed";

/// Live-edit event produced by an
/// effective toggle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DayToggle {
  Blocked(NaiveDate),
  Allowed(NaiveDate)
}

impl DayToggle {
  #[must_use]
  pub fn day(self) -> NaiveDate {
    match self {
      | Self::Blocked(day)
      | Self::Allowed(day) => day
    }
  }

  #[must_use]
  pub fn to_dto(self) -> DayToggleDto {
    let kind = match self {
      | Self::Blocked(_) => {
        DayToggleKind::Blocked
      }
      | Self::Allowed(_) => {
        DayToggleKind::Allowed
      }
    };
    DayToggleDto {
      day: format_day(self.day()),
      kind
    }
  }

  /// Journal entry for a toggle made
  /// while `month` was shown.
  #[must_use]
  pub fn to_edit(
    self,
    month: MonthKey
  ) -> DayEditDto {
    DayEditDto {
      month:  month.to_string(),
      toggle: self.to_dto()
    }
  }
}

/// Save state reported by the host.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct FormStatus {
  pub updated:            bool,
  pub update_error:       bool,
  pub update_in_progress: bool,
  pub disabled:           bool,
  pub invalid:            bool
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct SubmitButtonState {
  pub ready:       bool,
  pub in_progress: bool,
  pub disabled:    bool
}

/// In-session availability edits for
/// one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityEditor {
  current_month: MonthKey,
  changes:       AvailabilityCalendarChanges,
  plan:          AvailabilityPlan,
  pristine:      bool
}

impl AvailabilityEditor {
  #[must_use]
  pub fn new(
    current_month: MonthKey,
    changes: AvailabilityCalendarChanges,
    plan: AvailabilityPlan
  ) -> Self {
    Self {
      current_month,
      changes,
      plan,
      pristine: true
    }
  }

  /// Empty calendar and the default
  /// weekly plan.
  #[must_use]
  pub fn for_new_listing(
    current_month: MonthKey
  ) -> Self {
    Self::new(
      current_month,
      AvailabilityCalendarChanges::new(),
      AvailabilityPlan::default()
    )
  }

  #[must_use]
  pub fn current_month(&self) -> MonthKey {
    self.current_month
  }

  #[must_use]
  pub fn changes(
    &self
  ) -> &AvailabilityCalendarChanges {
    &self.changes
  }

  #[must_use]
  pub fn current_changes(
    &self
  ) -> &MonthChangeSet {
    self.changes.month(self.current_month)
  }

  #[must_use]
  pub fn plan(&self) -> &AvailabilityPlan {
    &self.plan
  }

  #[must_use]
  pub fn is_pristine(&self) -> bool {
    self.pristine
  }

  /// Returns the key the host should
  /// backfill data for.
  #[tracing::instrument(skip(self), fields(from = %self.current_month, to = %month))]
  pub fn set_current_month(
    &mut self,
    month: MonthKey
  ) -> MonthKey {
    self.current_month = month;
    debug!("current month changed");
    month
  }

  pub fn show_previous_month(
    &mut self
  ) -> anyhow::Result<MonthKey> {
    let month = self.current_month.pred()?;
    Ok(self.set_current_month(month))
  }

  pub fn show_next_month(
    &mut self
  ) -> anyhow::Result<MonthKey> {
    let month = self.current_month.succ()?;
    Ok(self.set_current_month(month))
  }

  /// Blocks an open day or allows a
  /// blocked one in the current month.
  /// Reserved and past days are left
  /// untouched and yield `None`.
  #[tracing::instrument(skip(self, day, today), fields(month = %self.current_month, day = %day.calendar_day()))]
  pub fn toggle_day<D>(
    &mut self,
    day: &D,
    today: NaiveDate
  ) -> Option<DayToggle>
  where
    D: CalendarDay + ?Sized
  {
    let day = day.calendar_day();
    if self
      .current_changes()
      .is_reserved(&day)
      || is_past(&day, today)
    {
      debug!(
        "ignoring toggle on reserved or past day"
      );
      return None;
    }

    let month = self
      .changes
      .month_mut(self.current_month);
    let toggle = if month.is_blocked(&day) {
      month.allow(day);
      DayToggle::Allowed(day)
    } else {
      month.block(day);
      DayToggle::Blocked(day)
    };

    self.pristine = false;
    info!(?toggle, "day toggled");
    Some(toggle)
  }

  /// Swaps in a fresh host snapshot,
  /// discarding local edits.
  pub fn replace_snapshot(
    &mut self,
    changes: AvailabilityCalendarChanges
  ) {
    self.changes = changes;
    self.pristine = true;
  }

  /// The weekly template. Day-level
  /// edits travel through `DayToggle`
  /// events instead.
  #[tracing::instrument(skip(self))]
  pub fn submit(
    &mut self
  ) -> AvailabilityPlan {
    self.pristine = true;
    info!(
      plan_type = self.plan.plan_type(),
      entries = self.plan.entries().len(),
      "submitting availability plan"
    );
    self.plan.clone()
  }

  #[must_use]
  pub fn submit_button(
    &self,
    status: &FormStatus
  ) -> SubmitButtonState {
    let in_progress =
      status.update_in_progress;
    SubmitButtonState {
      ready: status.updated
        && self.pristine,
      in_progress,
      disabled: status.invalid
        || status.disabled
        || in_progress
    }
  }

  #[must_use]
  pub fn error_message(
    status: &FormStatus
  ) -> Option<MessageId> {
    status.update_error.then(|| {
      MessageId::new(UPDATE_FAILED_MESSAGE)
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    FixedOffset,
    TimeZone
  };
  use vacancy_shared::MonthAvailabilityDto;

  use super::*;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn key(raw: &str) -> MonthKey {
    raw.parse().expect("valid month key")
  }

  fn today() -> NaiveDate {
    ymd(2024, 6, 15)
  }

  fn editor_with(
    reserved: &[&str],
    blocked: &[&str]
  ) -> AvailabilityEditor {
    let mut dto =
      vacancy_shared::AvailabilityCalendarDto::new();
    dto.insert(
      "2024-06".to_string(),
      MonthAvailabilityDto {
        reserved_days: reserved
          .iter()
          .map(|d| d.to_string())
          .collect(),
        blocked_days:  blocked
          .iter()
          .map(|d| d.to_string())
          .collect()
      }
    );
    AvailabilityEditor::new(
      key("2024-06"),
      AvailabilityCalendarChanges::from_snapshot(
        &dto
      )
      .expect("valid snapshot"),
      AvailabilityPlan::default()
    )
  }

  #[test]
  fn toggling_twice_blocks_then_opens() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );
    let day = ymd(2024, 6, 20);

    assert_eq!(
      editor.toggle_day(&day, today()),
      Some(DayToggle::Blocked(day))
    );
    assert!(
      editor
        .current_changes()
        .is_blocked(&day)
    );

    assert_eq!(
      editor.toggle_day(&day, today()),
      Some(DayToggle::Allowed(day))
    );
    assert!(
      !editor
        .current_changes()
        .is_blocked(&day)
    );
  }

  #[test]
  fn reserved_day_cannot_toggle() {
    let mut editor =
      editor_with(&["2024-06-20"], &[]);
    let before = editor.clone();

    assert_eq!(
      editor.toggle_day(
        &ymd(2024, 6, 20),
        today()
      ),
      None
    );
    assert_eq!(editor, before);
  }

  #[test]
  fn reserved_today_cannot_toggle() {
    let mut editor =
      editor_with(&["2024-06-15"], &[]);
    let before = editor.clone();

    assert_eq!(
      editor.toggle_day(&today(), today()),
      None
    );
    assert_eq!(editor, before);
    assert!(editor.is_pristine());
  }

  #[test]
  fn past_day_cannot_toggle_but_today_can() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );

    assert_eq!(
      editor.toggle_day(
        &ymd(2024, 6, 14),
        today()
      ),
      None
    );
    assert!(editor.is_pristine());
    assert_eq!(
      editor.toggle_day(&today(), today()),
      Some(DayToggle::Blocked(today()))
    );
  }

  #[test]
  fn persisted_block_can_be_allowed_and_reblocked()
  {
    let mut editor =
      editor_with(&[], &["2024-06-22"]);
    let day = ymd(2024, 6, 22);

    assert_eq!(
      editor.toggle_day(&day, today()),
      Some(DayToggle::Allowed(day))
    );
    assert!(
      !editor
        .current_changes()
        .is_blocked(&day)
    );
    assert_eq!(
      editor.toggle_day(&day, today()),
      Some(DayToggle::Blocked(day))
    );
    assert_eq!(
      editor
        .current_changes()
        .blocked_days_current(),
      &[day]
    );
  }

  #[test]
  fn toggle_matches_by_calendar_day() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );
    let offset =
      FixedOffset::west_opt(5 * 3600)
        .expect("valid offset");
    let morning = offset
      .with_ymd_and_hms(
        2024, 6, 20, 8, 0, 0
      )
      .single()
      .expect("valid datetime");
    let night = offset
      .with_ymd_and_hms(
        2024, 6, 20, 22, 30, 0
      )
      .single()
      .expect("valid datetime");

    editor.toggle_day(&morning, today());
    assert_eq!(
      editor.toggle_day(&night, today()),
      Some(DayToggle::Allowed(ymd(
        2024, 6, 20
      )))
    );
  }

  #[test]
  fn toggles_stay_in_their_month() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );
    editor.toggle_day(
      &ymd(2024, 6, 20),
      today()
    );

    editor
      .show_next_month()
      .expect("in range");
    editor.toggle_day(
      &ymd(2024, 7, 3),
      today()
    );

    let june =
      editor.changes().month(key("2024-06"));
    let july =
      editor.changes().month(key("2024-07"));
    assert_eq!(
      june.blocked_days_current(),
      &[ymd(2024, 6, 20)]
    );
    assert_eq!(
      july.blocked_days_current(),
      &[ymd(2024, 7, 3)]
    );
  }

  #[test]
  fn month_navigation_reports_adjacent_keys()
  {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-12")
      );
    assert_eq!(
      editor.show_next_month().expect("in range"),
      key("2025-01")
    );
    assert_eq!(
      editor
        .show_previous_month()
        .expect("in range"),
      key("2024-12")
    );
    assert_eq!(
      editor
        .show_previous_month()
        .expect("in range"),
      key("2024-11")
    );
  }

  #[test]
  fn month_navigation_stops_at_last_key() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("9999-12")
      );
    assert!(editor.show_next_month().is_err());
    assert_eq!(
      editor.current_month(),
      key("9999-12")
    );
  }

  #[test]
  fn submit_on_new_listing_emits_default_plan()
  {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );
    editor.toggle_day(
      &ymd(2024, 6, 20),
      today()
    );
    assert!(!editor.is_pristine());

    assert_eq!(
      editor.submit(),
      AvailabilityPlan::default()
    );
    assert!(editor.is_pristine());
  }

  #[test]
  fn submit_button_follows_form_status() {
    let mut editor =
      AvailabilityEditor::for_new_listing(
        key("2024-06")
      );
    let saved = FormStatus {
      updated: true,
      ..FormStatus::default()
    };
    assert!(editor.submit_button(&saved).ready);

    editor.toggle_day(
      &ymd(2024, 6, 20),
      today()
    );
    assert!(!editor.submit_button(&saved).ready);

    let saving = FormStatus {
      update_in_progress: true,
      ..FormStatus::default()
    };
    let button = editor.submit_button(&saving);
    assert!(button.in_progress);
    assert!(button.disabled);
  }

  #[test]
  fn update_error_surfaces_message() {
    let failed = FormStatus {
      update_error: true,
      ..FormStatus::default()
    };
    assert_eq!(
      AvailabilityEditor::error_message(
        &failed
      )
      .map(|id| id.as_str().to_string()),
      Some(UPDATE_FAILED_MESSAGE.to_string())
    );
    assert!(
      AvailabilityEditor::error_message(
        &FormStatus::default()
      )
      .is_none()
    );
  }
}
