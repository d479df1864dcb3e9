use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use crate::month::MonthKey;

const TIMEZONE_CONFIG_FILE: &str =
  "vacancy-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "VACANCY_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "VACANCY_TIME_CONFIG";
const DEFAULT_PROJECT_TIMEZONE: &str =
  "UTC";

pub const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

/// Anything that names a wall-clock
/// calendar day.
pub trait CalendarDay {
  fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
  fn calendar_day(&self) -> NaiveDate {
    *self
  }
}

impl CalendarDay for NaiveDateTime {
  fn calendar_day(&self) -> NaiveDate {
    self.date()
  }
}

impl<T: TimeZone> CalendarDay
  for DateTime<T>
{
  fn calendar_day(&self) -> NaiveDate {
    self.date_naive()
  }
}

/// Compares year, month and
/// day-of-month only.
#[must_use]
pub fn is_same_day<A, B>(
  a: &A,
  b: &B
) -> bool
where
  A: CalendarDay + ?Sized,
  B: CalendarDay + ?Sized
{
  let a = a.calendar_day();
  let b = b.calendar_day();
  a.day() == b.day()
    && a.month() == b.month()
    && a.year() == b.year()
}

/// Strictly before `today`.
#[must_use]
pub fn is_past<D>(
  day: &D,
  today: NaiveDate
) -> bool
where
  D: CalendarDay + ?Sized
{
  !is_same_day(day, &today)
    && day.calendar_day() < today
}

#[must_use]
pub fn is_inclusively_after_day<D>(
  day: &D,
  reference: NaiveDate
) -> bool
where
  D: CalendarDay + ?Sized
{
  day.calendar_day() >= reference
}

pub fn project_timezone() -> &'static Tz
{
  static PROJECT_TZ: OnceLock<Tz> =
    OnceLock::new();
  PROJECT_TZ.get_or_init(
    resolve_project_timezone
  )
}

#[must_use]
pub fn to_project_date(
  dt: DateTime<Utc>
) -> NaiveDate {
  dt.with_timezone(project_timezone())
    .date_naive()
}

#[must_use]
pub fn project_today() -> NaiveDate {
  to_project_date(Utc::now())
}

#[must_use]
pub fn format_day(
  day: NaiveDate
) -> String {
  day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  NaiveDate::parse_from_str(
    raw.trim(),
    DAY_FORMAT
  )
  .with_context(|| {
    format!(
      "invalid day {raw:?}; expected \
       YYYY-MM-DD"
    )
  })
}

/// `None` when the offset leaves the
/// range chrono can represent.
#[must_use]
pub fn checked_add_days(
  day: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  Duration::try_days(days)
    .and_then(|delta| {
      day.checked_add_signed(delta)
    })
}

/// Small in-grid offsets only; an
/// unrepresentable result keeps `day`.
#[must_use]
pub fn add_days(
  day: NaiveDate,
  days: i64
) -> NaiveDate {
  checked_add_days(day, days)
    .unwrap_or(day)
}

fn resolve_project_timezone() -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_PROJECT_TIMEZONE,
    "DEFAULT_PROJECT_TIMEZONE"
  )
  .unwrap_or(chrono_tz::UTC)
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured project timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Resolves a day argument. Bare
/// day-of-month numbers land in `month`.
#[tracing::instrument(skip(today, month), fields(input = input))]
pub fn parse_day_expr(
  input: &str,
  today: NaiveDate,
  month: MonthKey
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return Ok(add_days(today, 1));
    }
    | "yesterday" => {
      return Ok(add_days(today, -1));
    }
    | _ => {}
  }

  if let Some(target_weekday) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today,
      target_weekday
    ));
  }

  let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dw])$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let days = match caps
      .name("unit")
      .map(|m| m.as_str())
    {
      | Some("w") => num.checked_mul(7),
      | _ => Some(num)
    }
    .and_then(|days| {
      if sign == "-" {
        days.checked_neg()
      } else {
        Some(days)
      }
    });

    return days
      .and_then(|days| {
        checked_add_days(today, days)
      })
      .ok_or_else(|| {
        anyhow!(
          "day offset out of range: \
           {token}"
        )
      });
  }

  if token.len() <= 2
    && !token.is_empty()
    && token
      .chars()
      .all(|c| c.is_ascii_digit())
  {
    let day_of_month: u32 =
      token.parse().context(
        "invalid day of month"
      )?;
    return month
      .day(day_of_month)
      .ok_or_else(|| {
        anyhow!(
          "{month} has no day \
           {day_of_month}"
        )
      });
  }

  if let Ok(day) =
    NaiveDate::parse_from_str(
      token, DAY_FORMAT
    )
  {
    return Ok(day);
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(dt.calendar_day());
  }

  Err(anyhow!(
    "unrecognized day expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     weekday names (e.g. friday), \
     +Nd/-Nd/+Nw, day of month (e.g. \
     20), YYYY-MM-DD, RFC3339"
  })
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> NaiveDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  add_days(from, delta)
}
