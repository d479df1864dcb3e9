use std::fmt;
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  NaiveDate
};

use crate::datetime::CalendarDay;

/// Calendar month identified as
/// `YYYY-MM`. Orders by calendar time.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct MonthKey {
  year:  i32,
  month: u32
}

impl MonthKey {
  pub fn new(
    year: i32,
    month: u32
  ) -> anyhow::Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(anyhow!(
        "month out of range: {month}"
      ));
    }
    if !(0..=9999).contains(&year) {
      return Err(anyhow!(
        "year out of range: {year}"
      ));
    }
    Ok(Self { year, month })
  }

  /// Month holding `day`. Fails for days
  /// outside years `0000` to `9999`, which
  /// a `YYYY-MM` key cannot name.
  pub fn from_day<D>(
    day: &D
  ) -> anyhow::Result<Self>
  where
    D: CalendarDay + ?Sized
  {
    let day = day.calendar_day();
    Self::new(day.year(), day.month())
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.year
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.month
  }

  /// Following month, rolling the year
  /// over after December.
  pub fn succ(self) -> anyhow::Result<Self> {
    self.shift(1)
  }

  pub fn pred(self) -> anyhow::Result<Self> {
    self.shift(-1)
  }

  pub fn shift(
    self,
    months: i32
  ) -> anyhow::Result<Self> {
    let index = (self.year * 12
      + self.month as i32
      - 1)
      .checked_add(months)
      .ok_or_else(|| {
        anyhow!(
          "month shift out of range: \
           {self} by {months}"
        )
      })?;
    Self::new(
      index.div_euclid(12),
      index.rem_euclid(12) as u32 + 1
    )
    .with_context(|| {
      format!("shifting {self} by {months}")
    })
  }

  #[must_use]
  pub fn first_day(self) -> NaiveDate {
    NaiveDate::from_ymd_opt(
      self.year, self.month, 1
    )
    .unwrap_or(NaiveDate::MIN)
  }

  #[must_use]
  pub fn last_day(self) -> NaiveDate {
    self
      .day(self.days_in_month())
      .unwrap_or_else(|| self.first_day())
  }

  #[must_use]
  pub fn days_in_month(self) -> u32 {
    (28..=31)
      .rev()
      .find(|&n| self.day(n).is_some())
      .unwrap_or(28)
  }

  #[must_use]
  pub fn day(
    self,
    day_of_month: u32
  ) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
      self.year,
      self.month,
      day_of_month
    )
  }

  #[must_use]
  pub fn contains<D>(
    self,
    day: &D
  ) -> bool
  where
    D: CalendarDay + ?Sized
  {
    let day = day.calendar_day();
    day.year() == self.year
      && day.month() == self.month
  }

  pub fn days(
    self
  ) -> impl Iterator<Item = NaiveDate>
  {
    self.first_day().iter_days().take(
      self.days_in_month() as usize
    )
  }

  /// `MMMM YYYY`, e.g. `June 2024`.
  #[must_use]
  pub fn title(self) -> String {
    self
      .first_day()
      .format("%B %Y")
      .to_string()
  }
}

impl fmt::Display for MonthKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}",
      self.year, self.month
    )
  }
}

impl FromStr for MonthKey {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let raw = s.trim();
    let (year, month) = raw
      .split_once('-')
      .filter(|(y, m)| {
        y.len() == 4
          && m.len() == 2
          && y
            .chars()
            .chain(m.chars())
            .all(|c| c.is_ascii_digit())
      })
      .ok_or_else(|| {
        anyhow!(
          "invalid month key {raw:?}; \
           expected YYYY-MM"
        )
      })?;

    let year: i32 = year
      .parse()
      .context("invalid year")?;
    let month: u32 = month
      .parse()
      .context("invalid month")?;
    Self::new(year, month)
  }
}
