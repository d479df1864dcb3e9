use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};

use crate::changes::MonthChangeSet;
use crate::datetime::{
  CalendarDay,
  add_days,
  is_inclusively_after_day,
  is_past,
  is_same_day
};
use crate::month::MonthKey;

const WIDE_MIN_WIDTH: u32 = 744;
const MEDIUM_MIN_WIDTH: u32 = 344;
const WIDE_DAY_SIZE: u32 = 100;
const NARROW_DAY_SIZE: u32 = 42;
const NAV_GUTTER: u32 = 44;
const KEYBOARD_PANEL_MIN_WIDTH: u32 =
  400;

/// Exactly one per visible day.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
)]
pub enum DayStatus {
  Past,
  Today,
  Reserved,
  Blocked,
  Open
}

impl DayStatus {
  #[must_use]
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Past => "past",
      | Self::Today => "today",
      | Self::Reserved => "reserved",
      | Self::Blocked => "blocked",
      | Self::Open => "open"
    }
  }
}

/// First match wins: past, today,
/// reserved, blocked, open.
#[must_use]
pub fn classify<D>(
  day: &D,
  today: NaiveDate,
  month: &MonthChangeSet
) -> DayStatus
where
  D: CalendarDay + ?Sized
{
  if is_past(day, today) {
    DayStatus::Past
  } else if is_same_day(day, &today) {
    DayStatus::Today
  } else if month.is_reserved(day) {
    DayStatus::Reserved
  } else if month.is_blocked(day) {
    DayStatus::Blocked
  } else {
    DayStatus::Open
  }
}

/// Days before `today` are never
/// clickable, whatever their status.
#[must_use]
pub fn is_outside_range<D>(
  day: &D,
  today: NaiveDate
) -> bool
where
  D: CalendarDay + ?Sized
{
  !is_inclusively_after_day(day, today)
}

/// Every style marker that applies to a
/// day, independent of the priority
/// order used by [`classify`].
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct DayMarkers {
  pub past:     bool,
  pub today:    bool,
  pub blocked:  bool,
  pub reserved: bool
}

impl DayMarkers {
  #[must_use]
  pub fn for_day<D>(
    day: &D,
    today: NaiveDate,
    month: &MonthChangeSet
  ) -> Self
  where
    D: CalendarDay + ?Sized
  {
    Self {
      past:     is_past(day, today),
      today:    is_same_day(day, &today),
      blocked:  month.is_blocked(day),
      reserved: month.is_reserved(day)
    }
  }

  #[must_use]
  pub fn classes(
    self
  ) -> Vec<&'static str> {
    let mut classes = vec!["default"];
    for (on, class) in [
      (self.past, "past"),
      (self.today, "today"),
      (self.blocked, "blocked"),
      (self.reserved, "reserved"),
    ] {
      if on {
        classes.push(class);
      }
    }
    classes
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
  pub date:          NaiveDate,
  pub status:        DayStatus,
  pub markers:       DayMarkers,
  pub outside_month: bool,
  pub selectable:    bool
}

impl DayCell {
  #[must_use]
  pub fn new(
    date: NaiveDate,
    month: MonthKey,
    today: NaiveDate,
    changes: &MonthChangeSet
  ) -> Self {
    let status =
      classify(&date, today, changes);
    let markers =
      DayMarkers::for_day(&date, today, changes);
    Self {
      date,
      status,
      markers,
      outside_month: !month.contains(&date),
      selectable: !markers.past
        && !markers.reserved
        && !is_outside_range(&date, today)
    }
  }

  /// Two-digit day number (`DD`).
  #[must_use]
  pub fn label(&self) -> String {
    format!("{:02}", self.date.day())
  }
}

/// Whole weeks covering one month,
/// outside days included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub month:      MonthKey,
  pub week_start: Weekday,
  pub weeks:      Vec<Vec<DayCell>>
}

impl MonthGrid {
  #[tracing::instrument(skip(changes))]
  pub fn build(
    month: MonthKey,
    week_start: Weekday,
    today: NaiveDate,
    changes: &MonthChangeSet
  ) -> Self {
    let last = month.last_day();
    let mut cursor = start_of_week(
      month.first_day(),
      week_start
    );
    let mut weeks = Vec::new();

    while cursor <= last {
      let week = (0..7)
        .map(|offset| {
          DayCell::new(
            add_days(cursor, offset),
            month,
            today,
            changes
          )
        })
        .collect();
      weeks.push(week);
      cursor = add_days(cursor, 7);
    }

    tracing::trace!(
      weeks = weeks.len(),
      "built month grid"
    );
    Self {
      month,
      week_start,
      weeks
    }
  }

  pub fn cells(
    &self
  ) -> impl Iterator<Item = &DayCell> {
    self.weeks.iter().flatten()
  }

  #[must_use]
  pub fn cell(
    &self,
    date: NaiveDate
  ) -> Option<&DayCell> {
    self
      .cells()
      .find(|cell| cell.date == date)
  }

  #[must_use]
  pub fn weekday_labels(
    &self
  ) -> Vec<&'static str> {
    weekday_labels(self.week_start)
  }
}

#[must_use]
pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  let mut day = week_start;
  (0..7)
    .map(|_| {
      let label = weekday_label(day);
      day = day.succ();
      label
    })
    .collect()
}

fn weekday_label(
  day: Weekday
) -> &'static str {
  match day {
    | Weekday::Mon => "Mo",
    | Weekday::Tue => "Tu",
    | Weekday::Wed => "We",
    | Weekday::Thu => "Th",
    | Weekday::Fri => "Fr",
    | Weekday::Sat => "Sa",
    | Weekday::Sun => "Su"
  }
}

fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

/// `monday` starts weeks on Monday;
/// anything else on Sunday.
#[must_use]
pub fn parse_week_start(
  raw: &str
) -> Weekday {
  if raw
    .trim()
    .eq_ignore_ascii_case("monday")
  {
    Weekday::Mon
  } else {
    Weekday::Sun
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Breakpoint {
  Wide,
  Medium,
  Narrow
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct CalendarLayout {
  pub width:                   u32,
  pub breakpoint:              Breakpoint,
  pub day_size:                u32,
  pub hide_keyboard_shortcuts: bool
}

impl CalendarLayout {
  /// `None` until the container has
  /// been measured.
  #[must_use]
  pub fn for_width(
    width: u32
  ) -> Option<Self> {
    if width == 0 {
      return None;
    }

    let breakpoint = if width
      > WIDE_MIN_WIDTH
    {
      Breakpoint::Wide
    } else if width > MEDIUM_MIN_WIDTH {
      Breakpoint::Medium
    } else {
      Breakpoint::Narrow
    };

    let day_size = match breakpoint {
      | Breakpoint::Wide => WIDE_DAY_SIZE,
      | Breakpoint::Medium => {
        (width - NAV_GUTTER) / 7
      }
      | Breakpoint::Narrow => {
        NARROW_DAY_SIZE
      }
    };

    Some(Self {
      width,
      breakpoint,
      day_size,
      hide_keyboard_shortcuts: width
        < KEYBOARD_PANEL_MIN_WIDTH
    })
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct MonthNavigation {
  /// `None` at the first nameable month.
  pub previous: Option<MonthKey>,
  /// `None` at the last nameable month.
  pub next:     Option<MonthKey>
}

impl MonthNavigation {
  #[must_use]
  pub fn around(
    month: MonthKey
  ) -> Self {
    Self {
      previous: month.pred().ok(),
      next:     month.succ().ok()
    }
  }

  /// Month an arrow key moves to. Keys
  /// are ignored while the layout hides
  /// the shortcut hint.
  #[must_use]
  pub fn for_key(
    self,
    key: &str,
    layout: &CalendarLayout
  ) -> Option<MonthKey> {
    if layout.hide_keyboard_shortcuts {
      return None;
    }
    match key {
      | "ArrowLeft" => self.previous,
      | "ArrowRight" => self.next,
      | _ => None
    }
  }
}
