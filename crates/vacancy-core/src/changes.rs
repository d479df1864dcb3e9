use std::collections::BTreeMap;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::warn;
use vacancy_shared::{
  AvailabilityCalendarDto,
  MonthAvailabilityDto
};

use crate::datetime::{
  CalendarDay,
  format_day,
  is_same_day,
  parse_day
};
use crate::month::MonthKey;

static EMPTY_MONTH: MonthChangeSet =
  MonthChangeSet::empty();

/// Blocked and reserved days tracked
/// for one month during a session.
///
/// A day is never both reserved and
/// blocked: seeding drops such blocks
/// and the editor refuses to toggle
/// reserved days.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MonthChangeSet {
  blocked_days_current: Vec<NaiveDate>,
  blocked_days_added:   Vec<NaiveDate>,
  reserved_days:        Vec<NaiveDate>
}

impl MonthChangeSet {
  #[must_use]
  pub const fn empty() -> Self {
    Self {
      blocked_days_current: Vec::new(),
      blocked_days_added:   Vec::new(),
      reserved_days:        Vec::new()
    }
  }

  pub fn from_snapshot(
    snapshot: &MonthAvailabilityDto
  ) -> anyhow::Result<Self> {
    let mut month = Self::empty();

    for raw in &snapshot.reserved_days {
      let day = parse_day(raw)
        .context("bad reserved day")?;
      if !contains_day(
        &month.reserved_days,
        &day
      ) {
        month.reserved_days.push(day);
      }
    }

    for raw in &snapshot.blocked_days {
      let day = parse_day(raw)
        .context("bad blocked day")?;
      if month.is_reserved(&day) {
        warn!(
          day = %day,
          "day is both reserved and blocked; keeping reservation"
        );
        continue;
      }
      if !contains_day(
        &month.blocked_days_added,
        &day
      ) {
        month.blocked_days_added.push(day);
      }
    }

    Ok(month)
  }

  #[must_use]
  pub fn is_reserved<D>(
    &self,
    day: &D
  ) -> bool
  where
    D: CalendarDay + ?Sized
  {
    contains_day(&self.reserved_days, day)
  }

  /// Blocked in either bucket.
  #[must_use]
  pub fn is_blocked<D>(
    &self,
    day: &D
  ) -> bool
  where
    D: CalendarDay + ?Sized
  {
    contains_day(
      &self.blocked_days_current,
      day
    ) || contains_day(
      &self.blocked_days_added,
      day
    )
  }

  #[must_use]
  pub fn reserved_days(
    &self
  ) -> &[NaiveDate] {
    &self.reserved_days
  }

  #[must_use]
  pub fn blocked_days_current(
    &self
  ) -> &[NaiveDate] {
    &self.blocked_days_current
  }

  #[must_use]
  pub fn blocked_days_added(
    &self
  ) -> &[NaiveDate] {
    &self.blocked_days_added
  }

  pub fn blocked_days(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    self
      .blocked_days_current
      .iter()
      .chain(&self.blocked_days_added)
      .copied()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.blocked_days_current.is_empty()
      && self.blocked_days_added.is_empty()
      && self.reserved_days.is_empty()
  }

  pub(crate) fn block(
    &mut self,
    day: NaiveDate
  ) {
    if !self.is_blocked(&day) {
      self.blocked_days_current.push(day);
    }
  }

  pub(crate) fn allow(
    &mut self,
    day: NaiveDate
  ) {
    self
      .blocked_days_current
      .retain(|d| !is_same_day(d, &day));
    self
      .blocked_days_added
      .retain(|d| !is_same_day(d, &day));
  }

  #[must_use]
  pub fn to_snapshot(
    &self
  ) -> MonthAvailabilityDto {
    let mut reserved =
      self.reserved_days.clone();
    reserved.sort();
    let mut blocked =
      self.blocked_days().collect::<Vec<_>>();
    blocked.sort();
    blocked.dedup();

    MonthAvailabilityDto {
      reserved_days: reserved
        .into_iter()
        .map(format_day)
        .collect(),
      blocked_days:  blocked
        .into_iter()
        .map(format_day)
        .collect()
    }
  }
}

fn contains_day<D>(
  days: &[NaiveDate],
  day: &D
) -> bool
where
  D: CalendarDay + ?Sized
{
  days.iter().any(|d| is_same_day(d, day))
}

/// Month → change-set map owned by one
/// editor. Months without an entry read
/// as empty.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct AvailabilityCalendarChanges {
  months: BTreeMap<MonthKey, MonthChangeSet>
}

impl AvailabilityCalendarChanges {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[tracing::instrument(skip(snapshot), fields(months = snapshot.len()))]
  pub fn from_snapshot(
    snapshot: &AvailabilityCalendarDto
  ) -> anyhow::Result<Self> {
    let mut months = BTreeMap::new();
    for (raw_key, month) in snapshot {
      let key: MonthKey =
        raw_key.parse()?;
      let changes =
        MonthChangeSet::from_snapshot(month)
          .with_context(|| {
            format!(
              "invalid availability for \
               {key}"
            )
          })?;
      months.insert(key, changes);
    }
    Ok(Self { months })
  }

  #[must_use]
  pub fn month(
    &self,
    key: MonthKey
  ) -> &MonthChangeSet {
    self
      .months
      .get(&key)
      .unwrap_or(&EMPTY_MONTH)
  }

  pub(crate) fn month_mut(
    &mut self,
    key: MonthKey
  ) -> &mut MonthChangeSet {
    self.months.entry(key).or_default()
  }

  pub fn months(
    &self
  ) -> impl Iterator<Item = (&MonthKey, &MonthChangeSet)>
  {
    self.months.iter()
  }

  #[must_use]
  pub fn to_snapshot(
    &self
  ) -> AvailabilityCalendarDto {
    self
      .months
      .iter()
      .filter(|(_, month)| !month.is_empty())
      .map(|(key, month)| {
        (key.to_string(), month.to_snapshot())
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn snapshot(
    reserved: &[&str],
    blocked: &[&str]
  ) -> MonthAvailabilityDto {
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
  }

  #[test]
  fn seeding_puts_persisted_blocks_in_added()
  {
    let month = MonthChangeSet::from_snapshot(
      &snapshot(
        &["2024-06-10"],
        &["2024-06-12", "2024-06-12"]
      )
    )
    .expect("valid snapshot");

    assert!(
      month
        .blocked_days_current()
        .is_empty()
    );
    assert_eq!(
      month.blocked_days_added(),
      &[ymd(2024, 6, 12)]
    );
    assert!(month.is_reserved(&ymd(
      2024, 6, 10
    )));
  }

  #[test]
  fn seeding_drops_blocks_on_reserved_days()
  {
    let month = MonthChangeSet::from_snapshot(
      &snapshot(
        &["2024-06-10"],
        &["2024-06-10"]
      )
    )
    .expect("valid snapshot");

    assert!(month.is_reserved(&ymd(
      2024, 6, 10
    )));
    assert!(!month.is_blocked(&ymd(
      2024, 6, 10
    )));
  }

  #[test]
  fn seeding_rejects_bad_days() {
    assert!(
      MonthChangeSet::from_snapshot(
        &snapshot(&["June 10"], &[])
      )
      .is_err()
    );
  }

  #[test]
  fn allow_clears_both_buckets() {
    let mut month =
      MonthChangeSet::from_snapshot(
        &snapshot(&[], &["2024-06-12"])
      )
      .expect("valid snapshot");
    month.block(ymd(2024, 6, 13));
    assert!(month.is_blocked(&ymd(
      2024, 6, 13
    )));

    month.allow(ymd(2024, 6, 12));
    month.allow(ymd(2024, 6, 13));
    assert_eq!(month.blocked_days().count(), 0);
  }

  #[test]
  fn unknown_month_reads_empty() {
    let changes =
      AvailabilityCalendarChanges::new();
    let key = "2030-01"
      .parse()
      .expect("valid month");
    assert!(changes.month(key).is_empty());
  }

  #[test]
  fn snapshot_round_trip_skips_empty_months()
  {
    let mut dto = AvailabilityCalendarDto::new();
    dto.insert(
      "2024-06".to_string(),
      snapshot(&["2024-06-10"], &["2024-06-02"])
    );
    dto.insert(
      "2024-07".to_string(),
      snapshot(&[], &[])
    );

    let changes =
      AvailabilityCalendarChanges::from_snapshot(
        &dto
      )
      .expect("valid snapshot");
    let back = changes.to_snapshot();

    assert_eq!(back.len(), 1);
    assert_eq!(
      back.get("2024-06"),
      dto.get("2024-06")
    );
  }

  #[test]
  fn bad_month_key_is_rejected() {
    let mut dto = AvailabilityCalendarDto::new();
    dto.insert(
      "2024-6".to_string(),
      snapshot(&[], &[])
    );
    assert!(
      AvailabilityCalendarChanges::from_snapshot(
        &dto
      )
      .is_err()
    );
  }
}
