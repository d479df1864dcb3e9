use chrono::Weekday;
use serde::Deserialize;
use vacancy_core::calendar::parse_week_start;
use vacancy_core::date_range_filter::FilterConfig;

const UI_CONFIG_TOML: &str =
  include_str!("../../assets/ui.toml");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiConfigFile {
  version:  u32,
  calendar: CalendarSection,
  filter:   FilterSection
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct CalendarSection {
  week_start: String
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FilterSection {
  id:                       String,
  url_param:                String,
  live_edit:                bool,
  show_as_popup:            bool,
  content_placement_offset: i32
}

impl Default for UiConfigFile {
  fn default() -> Self {
    Self {
      version:  1,
      calendar: CalendarSection::default(),
      filter:   FilterSection::default()
    }
  }
}

impl Default for CalendarSection {
  fn default() -> Self {
    Self {
      week_start: "sunday".to_string()
    }
  }
}

impl Default for FilterSection {
  fn default() -> Self {
    let defaults = FilterConfig::default();
    Self {
      id: defaults.id,
      url_param: defaults.url_param,
      live_edit: defaults.live_edit,
      show_as_popup: defaults
        .show_as_popup,
      content_placement_offset: defaults
        .content_placement_offset
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct UiConfig {
  pub week_start: Weekday,
  pub filter:     FilterConfig
}

pub(super) fn load_ui_config() -> UiConfig
{
  let file = match toml::from_str::<
    UiConfigFile
  >(UI_CONFIG_TOML)
  {
    | Ok(file) => {
      tracing::info!(
        version = file.version,
        week_start = %file.calendar.week_start,
        "loaded ui config"
      );
      file
    }
    | Err(error) => {
      tracing::error!(%error, "failed parsing ui config; using defaults");
      UiConfigFile::default()
    }
  };

  let mut filter = file.filter;
  if filter.url_param.trim().is_empty() {
    filter.url_param =
      FilterConfig::default().url_param;
  }

  UiConfig {
    week_start: parse_week_start(
      &file.calendar.week_start
    ),
    filter:     FilterConfig {
      id: filter.id,
      url_param: filter.url_param,
      live_edit: filter.live_edit,
      show_as_popup: filter.show_as_popup,
      content_placement_offset: filter
        .content_placement_offset
    }
  }
}
