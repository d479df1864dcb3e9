use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::debug;
use vacancy_shared::DateRangeDto;

use crate::datetime::{
  format_day,
  parse_day
};
use crate::messages::{
  Message,
  MessageId
};

const LABEL_PLAIN: &str =
  "BookingDateRangeFilter.labelPlain";
const LABEL_POPUP: &str =
  "BookingDateRangeFilter.labelPopup";
const LABEL_SELECTED: &str =
  "BookingDateRangeFilter.labelSelected";
const LABEL_DAY_FORMAT: &str = "%b %-d";

/// Check-in / check-out pair with
/// `start < end`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DateRange {
  start: NaiveDate,
  end:   NaiveDate
}

impl DateRange {
  pub fn new(
    start: NaiveDate,
    end: NaiveDate
  ) -> anyhow::Result<Self> {
    if start >= end {
      return Err(anyhow!(
        "date range must end after it \
         starts: {start} .. {end}"
      ));
    }
    Ok(Self { start, end })
  }

  #[must_use]
  pub fn start(self) -> NaiveDate {
    self.start
  }

  #[must_use]
  pub fn end(self) -> NaiveDate {
    self.end
  }

  #[must_use]
  pub fn nights(self) -> i64 {
    (self.end - self.start).num_days()
  }

  /// Parses `YYYY-MM-DD,YYYY-MM-DD`.
  pub fn parse_param(
    raw: &str
  ) -> anyhow::Result<Self> {
    let (start, end) = raw
      .split_once(',')
      .ok_or_else(|| {
        anyhow!(
          "expected START,END dates, \
           got {raw:?}"
        )
      })?;
    Self::new(
      parse_day(start)?,
      parse_day(end)?
    )
  }

  #[must_use]
  pub fn to_param(self) -> String {
    format!(
      "{},{}",
      format_day(self.start),
      format_day(self.end)
    )
  }

  pub fn from_dto(
    dto: &DateRangeDto
  ) -> anyhow::Result<Self> {
    Self::new(
      parse_day(&dto.start_date)?,
      parse_day(&dto.end_date)?
    )
  }

  #[must_use]
  pub fn to_dto(self) -> DateRangeDto {
    DateRangeDto {
      start_date: format_day(self.start),
      end_date:   format_day(self.end)
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
  pub id:                       String,
  pub url_param:                String,
  pub live_edit:                bool,
  pub show_as_popup:            bool,
  pub content_placement_offset: i32
}

impl Default for FilterConfig {
  fn default() -> Self {
    Self {
      id: "BookingDateRangeFilter"
        .to_string(),
      url_param: "dates".to_string(),
      live_edit: false,
      show_as_popup: true,
      content_placement_offset: 0
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FilterLayout {
  Popup {
    content_placement_offset: i32
  },
  Plain
}

/// What the filter reports to the
/// search page: `url_param=value`, or
/// removal of the param.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSubmission {
  pub url_param: String,
  pub range:     Option<DateRange>
}

impl FilterSubmission {
  #[must_use]
  pub fn value(&self) -> Option<String> {
    self.range.map(DateRange::to_param)
  }

  #[must_use]
  pub fn query_pair(&self) -> String {
    format!(
      "{}={}",
      self.url_param,
      self.value().unwrap_or_default()
    )
  }
}

/// Date-range search filter, shown
/// inline or as a popover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDateRangeFilter {
  config:  FilterConfig,
  applied: Option<DateRange>,
  draft:   Option<DateRange>,
  open:    bool
}

impl BookingDateRangeFilter {
  #[must_use]
  pub fn new(
    config: FilterConfig,
    initial: Option<DateRange>
  ) -> Self {
    Self {
      config,
      applied: initial,
      draft: initial,
      open: false
    }
  }

  /// Seeds from the current value of
  /// the url param, if any.
  pub fn from_url_value(
    config: FilterConfig,
    value: Option<&str>
  ) -> anyhow::Result<Self> {
    let initial = value
      .map(str::trim)
      .filter(|raw| !raw.is_empty())
      .map(DateRange::parse_param)
      .transpose()?;
    Ok(Self::new(config, initial))
  }

  #[must_use]
  pub fn config(&self) -> &FilterConfig {
    &self.config
  }

  #[must_use]
  pub fn applied(
    &self
  ) -> Option<DateRange> {
    self.applied
  }

  #[must_use]
  pub fn draft(&self) -> Option<DateRange> {
    self.draft
  }

  #[must_use]
  pub fn layout(&self) -> FilterLayout {
    if self.config.show_as_popup {
      FilterLayout::Popup {
        content_placement_offset: self
          .config
          .content_placement_offset
      }
    } else {
      FilterLayout::Plain
    }
  }

  /// Inline filters are always open.
  #[must_use]
  pub fn is_open(&self) -> bool {
    !self.config.show_as_popup
      || self.open
  }

  pub fn toggle_open(&mut self) {
    if self.config.show_as_popup {
      self.open = !self.open;
      if !self.open {
        self.draft = self.applied;
      }
    }
  }

  /// Stages a range; live-edit filters
  /// submit right away.
  #[tracing::instrument(skip(self), fields(id = %self.config.id))]
  pub fn select(
    &mut self,
    start: NaiveDate,
    end: NaiveDate
  ) -> anyhow::Result<Option<FilterSubmission>>
  {
    let range = DateRange::new(start, end)?;
    self.draft = Some(range);
    debug!(range = %range.to_param(), "staged date range");

    if self.config.live_edit {
      return Ok(Some(self.apply()));
    }
    Ok(None)
  }

  pub fn apply(
    &mut self
  ) -> FilterSubmission {
    self.applied = self.draft;
    self.open = false;
    self.submission()
  }

  pub fn clear(
    &mut self
  ) -> FilterSubmission {
    self.draft = None;
    self.apply()
  }

  pub fn cancel(&mut self) {
    self.draft = self.applied;
    self.open = false;
  }

  #[must_use]
  pub fn label(&self) -> Message {
    match self.applied {
      | Some(range) => {
        Message::new(MessageId::new(
          LABEL_SELECTED
        ))
        .with(
          "startDate",
          range
            .start
            .format(LABEL_DAY_FORMAT)
            .to_string()
        )
        .with(
          "endDate",
          range
            .end
            .format(LABEL_DAY_FORMAT)
            .to_string()
        )
      }
      | None if self.config.show_as_popup => {
        Message::new(MessageId::new(
          LABEL_POPUP
        ))
      }
      | None => Message::new(
        MessageId::new(LABEL_PLAIN)
      )
    }
  }

  fn submission(&self) -> FilterSubmission {
    FilterSubmission {
      url_param: self.config.url_param.clone(),
      range:     self.applied
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::messages::{
    Catalog,
    Messages
  };

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn popup() -> FilterConfig {
    FilterConfig {
      content_placement_offset: -14,
      ..FilterConfig::default()
    }
  }

  fn plain_live() -> FilterConfig {
    FilterConfig {
      live_edit: true,
      show_as_popup: false,
      ..FilterConfig::default()
    }
  }

  #[test]
  fn range_must_move_forward() {
    assert!(
      DateRange::new(
        ymd(2024, 6, 5),
        ymd(2024, 6, 5)
      )
      .is_err()
    );
    let range = DateRange::new(
      ymd(2024, 6, 1),
      ymd(2024, 6, 5)
    )
    .expect("valid range");
    assert_eq!(range.nights(), 4);
  }

  #[test]
  fn url_param_round_trip() {
    let range = DateRange::parse_param(
      "2024-06-01,2024-06-05"
    )
    .expect("valid param");
    assert_eq!(
      range.to_param(),
      "2024-06-01,2024-06-05"
    );
    assert!(
      DateRange::parse_param("2024-06-01")
        .is_err()
    );
  }

  #[test]
  fn popup_filter_submits_on_apply_only() {
    let mut filter =
      BookingDateRangeFilter::new(popup(), None);
    assert_eq!(
      filter.layout(),
      FilterLayout::Popup {
        content_placement_offset: -14
      }
    );
    assert!(!filter.is_open());

    filter.toggle_open();
    assert!(filter.is_open());
    let staged = filter
      .select(ymd(2024, 6, 1), ymd(2024, 6, 5))
      .expect("valid range");
    assert_eq!(staged, None);
    assert_eq!(filter.applied(), None);

    let submission = filter.apply();
    assert_eq!(
      submission.query_pair(),
      "dates=2024-06-01,2024-06-05"
    );
    assert!(!filter.is_open());
  }

  #[test]
  fn live_filter_submits_on_select() {
    let mut filter =
      BookingDateRangeFilter::new(
        plain_live(),
        None
      );
    assert!(filter.is_open());
    assert_eq!(filter.layout(), FilterLayout::Plain);

    let submission = filter
      .select(ymd(2024, 6, 1), ymd(2024, 6, 3))
      .expect("valid range")
      .expect("live edit submits");
    assert_eq!(
      submission.value(),
      Some("2024-06-01,2024-06-03".to_string())
    );
  }

  #[test]
  fn cancel_restores_initial_range() {
    let mut filter =
      BookingDateRangeFilter::from_url_value(
        popup(),
        Some("2024-06-01,2024-06-05")
      )
      .expect("valid url value");
    let initial = filter.applied();

    filter.toggle_open();
    filter
      .select(ymd(2024, 7, 1), ymd(2024, 7, 2))
      .expect("valid range");
    filter.cancel();

    assert_eq!(filter.draft(), initial);
    assert!(!filter.is_open());
  }

  #[test]
  fn clear_removes_param() {
    let mut filter =
      BookingDateRangeFilter::from_url_value(
        popup(),
        Some("2024-06-01,2024-06-05")
      )
      .expect("valid url value");
    let submission = filter.clear();
    assert_eq!(submission.range, None);
    assert_eq!(submission.query_pair(), "dates=");
  }

  #[test]
  fn empty_url_value_means_no_range() {
    let filter =
      BookingDateRangeFilter::from_url_value(
        popup(),
        Some("  ")
      )
      .expect("blank is fine");
    assert_eq!(filter.applied(), None);
  }

  #[test]
  fn label_shows_selected_dates() {
    let catalog = Catalog::english();
    let mut filter =
      BookingDateRangeFilter::new(
        plain_live(),
        None
      );
    assert_eq!(
      catalog.format(&filter.label()),
      "Dates"
    );

    filter
      .select(ymd(2024, 6, 1), ymd(2024, 6, 5))
      .expect("valid range");
    assert_eq!(
      catalog.format(&filter.label()),
      "Jun 1 - Jun 5"
    );
  }
}
