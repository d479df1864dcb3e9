use serde::Serialize;
use serde::de::DeserializeOwned;
use vacancy_shared::{
  AvailabilityCalendarDto,
  DayEditDto,
  ListingDto
};

const LISTING_STORAGE_KEY: &str =
  "vacancy.listing";
const CALENDAR_STORAGE_KEY: &str =
  "vacancy.calendar";
const MONTH_STORAGE_KEY: &str =
  "vacancy.month";
const EDITS_STORAGE_KEY: &str =
  "vacancy.edits";

const SEED_LISTING_JSON: &str =
  include_str!("../../assets/listing.json");
const SEED_CALENDAR_JSON: &str =
  include_str!("../../assets/calendar.json");

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(|window| {
    window
      .local_storage()
      .ok()
      .flatten()
  })
}

fn load_json<T>(
  key: &str,
  seed: &str
) -> T
where
  T: DeserializeOwned + Default
{
  let stored = local_storage()
    .and_then(|storage| {
      storage.get_item(key).ok().flatten()
    });

  if let Some(raw) = stored {
    match serde_json::from_str::<T>(&raw) {
      | Ok(value) => return value,
      | Err(err) => {
        tracing::error!(
          key,
          error = %err,
          "failed parsing stored value; falling back to seed"
        );
      }
    }
  }

  serde_json::from_str(seed).unwrap_or_else(
    |err| {
      tracing::error!(
        key,
        error = %err,
        "failed parsing bundled seed"
      );
      T::default()
    }
  )
}

fn save_json<T: Serialize>(
  key: &str,
  value: &T
) -> Result<(), String> {
  let raw = serde_json::to_string(value)
    .map_err(|err| err.to_string())?;
  let storage = local_storage()
    .ok_or_else(|| {
      "local storage unavailable"
        .to_string()
    })?;
  storage.set_item(key, &raw).map_err(
    |err| format!("{err:?}")
  )
}

pub(super) fn load_listing() -> ListingDto
{
  load_json(
    LISTING_STORAGE_KEY,
    SEED_LISTING_JSON
  )
}

pub(super) fn save_listing(
  listing: &ListingDto
) -> Result<(), String> {
  save_json(LISTING_STORAGE_KEY, listing)
}

pub(super) fn load_calendar()
-> AvailabilityCalendarDto {
  load_json(
    CALENDAR_STORAGE_KEY,
    SEED_CALENDAR_JSON
  )
}

pub(super) fn save_calendar(
  calendar: &AvailabilityCalendarDto
) {
  if let Err(err) =
    save_json(CALENDAR_STORAGE_KEY, calendar)
  {
    tracing::warn!(error = %err, "failed saving calendar snapshot");
  }
}

pub(super) fn load_month()
-> Option<String> {
  local_storage().and_then(|storage| {
    storage
      .get_item(MONTH_STORAGE_KEY)
      .ok()
      .flatten()
  })
}

pub(super) fn save_month(month: &str) {
  let Some(storage) = local_storage() else {
    tracing::warn!(%month, "local storage unavailable; current month not saved");
    return;
  };
  if let Err(err) =
    storage.set_item(MONTH_STORAGE_KEY, month)
  {
    tracing::warn!(%month, error = ?err, "failed saving current month");
  }
}

/// Journal with `edit` appended. A
/// corrupt journal restarts empty.
fn journaled(
  raw: Option<&str>,
  edit: &DayEditDto
) -> Vec<DayEditDto> {
  let mut edits = raw
    .map(|raw| {
      serde_json::from_str::<Vec<DayEditDto>>(
        raw
      )
      .unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed parsing edit journal; starting a new one");
        Vec::new()
      })
    })
    .unwrap_or_default();
  edits.push(edit.clone());
  edits
}

/// Live edits are journaled, tagged with
/// their month, so the host can replay
/// them.
pub(super) fn append_edit(
  edit: &DayEditDto
) {
  let stored = local_storage()
    .and_then(|storage| {
      storage
        .get_item(EDITS_STORAGE_KEY)
        .ok()
        .flatten()
    });
  let edits =
    journaled(stored.as_deref(), edit);
  if let Err(err) =
    save_json(EDITS_STORAGE_KEY, &edits)
  {
    tracing::warn!(error = %err, "failed journaling live edit");
  }
}
