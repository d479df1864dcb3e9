use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ListingState {
  #[default]
  Draft,
  Published,
  Closed
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct AvailabilityPlanEntryDto {
  #[serde(rename = "dayOfWeek")]
  pub day_of_week: String,
  pub seats:       u32
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct AvailabilityPlanDto {
  #[serde(rename = "type")]
  pub plan_type: String,
  #[serde(default)]
  pub entries:   Vec<AvailabilityPlanEntryDto>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
  #[serde(default)]
  pub id:                Option<Uuid>,
  #[serde(default)]
  pub title:             String,
  #[serde(default)]
  pub state:             ListingState,
  #[serde(default)]
  pub availability_plan:
    Option<AvailabilityPlanDto>
}

/// Reserved and blocked days of one
/// month, as `YYYY-MM-DD` strings.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct MonthAvailabilityDto {
  #[serde(default)]
  pub reserved_days: Vec<String>,
  #[serde(default)]
  pub blocked_days:  Vec<String>
}

/// Host snapshot keyed by `YYYY-MM`.
pub type AvailabilityCalendarDto =
  BTreeMap<String, MonthAvailabilityDto>;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
  pub availability_plan:
    AvailabilityPlanDto
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeDto {
  pub start_date: String,
  pub end_date:   String
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum DayToggleKind {
  Blocked,
  Allowed
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DayToggleDto {
  pub day:  String,
  pub kind: DayToggleKind
}

/// One journaled toggle, tagged with the
/// `YYYY-MM` month it was made in.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DayEditDto {
  pub month:  String,
  #[serde(flatten)]
  pub toggle: DayToggleDto
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn day_edit_is_flat_and_month_tagged() {
    let edit = DayEditDto {
      month:  "2024-06".to_string(),
      toggle: DayToggleDto {
        day:  "2024-06-20".to_string(),
        kind: DayToggleKind::Blocked
      }
    };

    let value = serde_json::to_value(&edit)
      .expect("serialize edit");
    assert_eq!(
      value,
      serde_json::json!({
        "month": "2024-06",
        "day": "2024-06-20",
        "kind": "blocked"
      })
    );
    let back: DayEditDto =
      serde_json::from_value(value)
        .expect("deserialize edit");
    assert_eq!(back, edit);
  }

  #[test]
  fn plan_uses_host_field_names() {
    let plan = AvailabilityPlanDto {
      plan_type: "availability-plan/night"
        .to_string(),
      entries:   vec![
        AvailabilityPlanEntryDto {
          day_of_week: "mon".to_string(),
          seats:       1
        },
      ]
    };

    let value = serde_json::to_value(&plan)
      .expect("serialize plan");
    assert_eq!(
      value,
      serde_json::json!({
        "type": "availability-plan/night",
        "entries": [
          { "dayOfWeek": "mon", "seats": 1 }
        ]
      })
    );
  }

  #[test]
  fn month_snapshot_defaults_missing_lists()
  {
    let calendar: AvailabilityCalendarDto =
      serde_json::from_str(
        r#"{"2024-06":{"reservedDays":["2024-06-10"]}}"#
      )
      .expect("parse calendar");

    let june = calendar
      .get("2024-06")
      .expect("june present");
    assert_eq!(
      june.reserved_days,
      vec!["2024-06-10".to_string()]
    );
    assert!(june.blocked_days.is_empty());
  }

  #[test]
  fn draft_listing_without_plan_parses() {
    let listing: ListingDto =
      serde_json::from_str(
        r#"{"title":"Cabin"}"#
      )
      .expect("parse listing");

    assert_eq!(listing.id, None);
    assert_eq!(
      listing.state,
      ListingState::Draft
    );
    assert!(
      listing
        .availability_plan
        .is_none()
    );
  }
}
