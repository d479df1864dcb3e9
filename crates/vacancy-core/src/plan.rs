use anyhow::anyhow;
use chrono::Weekday;
use vacancy_shared::{
  AvailabilityPlanDto,
  AvailabilityPlanEntryDto
};

pub const NIGHTLY_PLAN_TYPE: &str =
  "availability-plan/night";

const WEEK: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun
];

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct PlanEntry {
  pub day_of_week: Weekday,
  pub seats:       u32
}

/// Weekly template of open seats,
/// one entry per weekday in
/// Monday..Sunday order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPlan {
  plan_type: String,
  entries:   Vec<PlanEntry>
}

impl Default for AvailabilityPlan {
  fn default() -> Self {
    Self {
      plan_type: NIGHTLY_PLAN_TYPE
        .to_string(),
      entries:   WEEK
        .iter()
        .map(|&day_of_week| PlanEntry {
          day_of_week,
          seats: 1
        })
        .collect()
    }
  }
}

impl AvailabilityPlan {
  pub fn new(
    plan_type: impl Into<String>,
    entries: Vec<PlanEntry>
  ) -> anyhow::Result<Self> {
    let plan_type = plan_type.into();
    if plan_type.trim().is_empty() {
      return Err(anyhow!(
        "availability plan type cannot \
         be empty"
      ));
    }

    let mut ordered =
      Vec::with_capacity(entries.len());
    for weekday in WEEK {
      let mut matching = entries
        .iter()
        .filter(|entry| {
          entry.day_of_week == weekday
        });
      if let Some(entry) = matching.next()
      {
        if matching.next().is_some() {
          return Err(anyhow!(
            "availability plan lists \
             {} more than once",
            weekday_key(weekday)
          ));
        }
        ordered.push(*entry);
      }
    }

    Ok(Self {
      plan_type,
      entries: ordered
    })
  }

  #[must_use]
  pub fn plan_type(&self) -> &str {
    &self.plan_type
  }

  #[must_use]
  pub fn entries(&self) -> &[PlanEntry] {
    &self.entries
  }

  /// Seats for `weekday`; weekdays
  /// missing from the plan have none.
  #[must_use]
  pub fn seats_on(
    &self,
    weekday: Weekday
  ) -> u32 {
    self
      .entries
      .iter()
      .find(|entry| {
        entry.day_of_week == weekday
      })
      .map(|entry| entry.seats)
      .unwrap_or(0)
  }

  pub fn from_dto(
    dto: &AvailabilityPlanDto
  ) -> anyhow::Result<Self> {
    let entries = dto
      .entries
      .iter()
      .map(|entry| {
        let day_of_week =
          parse_weekday_key(
            &entry.day_of_week
          )?;
        Ok(PlanEntry {
          day_of_week,
          seats: entry.seats
        })
      })
      .collect::<anyhow::Result<Vec<_>>>(
      )?;
    Self::new(dto.plan_type.clone(), entries)
  }

  #[must_use]
  pub fn to_dto(
    &self
  ) -> AvailabilityPlanDto {
    AvailabilityPlanDto {
      plan_type: self.plan_type.clone(),
      entries:   self
        .entries
        .iter()
        .map(|entry| {
          AvailabilityPlanEntryDto {
            day_of_week: weekday_key(
              entry.day_of_week
            )
            .to_string(),
            seats:       entry.seats
          }
        })
        .collect()
    }
  }
}

#[must_use]
pub fn weekday_key(
  weekday: Weekday
) -> &'static str {
  match weekday {
    | Weekday::Mon => "mon",
    | Weekday::Tue => "tue",
    | Weekday::Wed => "wed",
    | Weekday::Thu => "thu",
    | Weekday::Fri => "fri",
    | Weekday::Sat => "sat",
    | Weekday::Sun => "sun"
  }
}

pub fn parse_weekday_key(
  raw: &str
) -> anyhow::Result<Weekday> {
  WEEK
    .iter()
    .copied()
    .find(|weekday| {
      raw
        .trim()
        .eq_ignore_ascii_case(
          weekday_key(*weekday)
        )
    })
    .ok_or_else(|| {
      anyhow!(
        "unknown dayOfWeek {raw:?}"
      )
    })
}
