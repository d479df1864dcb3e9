use std::rc::Rc;

use chrono::NaiveDate;
use vacancy_core::date_range_filter::{
  BookingDateRangeFilter,
  DateRange,
  FilterLayout,
  FilterSubmission
};
use vacancy_core::datetime::{
  format_day,
  parse_day
};
use vacancy_core::messages::{
  Catalog,
  Messages
};
use web_sys::{
  HtmlInputElement,
  InputEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  UseStateHandle,
  classes,
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct BookingDateRangeFilterProps {
  pub filter:    BookingDateRangeFilter,
  pub catalog:   Rc<Catalog>,
  pub on_change: Callback<BookingDateRangeFilter>,
  pub on_submit: Callback<FilterSubmission>
}

/// Stages the typed range once both
/// inputs hold a valid, ordered pair.
fn stage_range(
  filter: &BookingDateRangeFilter,
  start_raw: &str,
  end_raw: &str,
  on_change: &Callback<BookingDateRangeFilter>,
  on_submit: &Callback<FilterSubmission>
) {
  let (Ok(start), Ok(end)) =
    (parse_day(start_raw), parse_day(end_raw))
  else {
    return;
  };

  let mut next = filter.clone();
  match next.select(start, end) {
    | Ok(submission) => {
      on_change.emit(next);
      if let Some(submission) = submission {
        on_submit.emit(submission);
      }
    }
    | Err(error) => {
      tracing::warn!(%error, "ignoring invalid date range");
    }
  }
}

fn input_value(event: &InputEvent) -> String {
  event
    .target_unchecked_into::<HtmlInputElement>()
    .value()
}

fn draft_value(
  filter: &BookingDateRangeFilter,
  pick: fn(DateRange) -> NaiveDate
) -> String {
  filter
    .draft()
    .map(|range| format_day(pick(range)))
    .unwrap_or_default()
}

fn on_date_input(
  props: &BookingDateRangeFilterProps,
  this: UseStateHandle<String>,
  other: UseStateHandle<String>,
  this_is_start: bool
) -> Callback<InputEvent> {
  let filter = props.filter.clone();
  let on_change = props.on_change.clone();
  let on_submit = props.on_submit.clone();
  Callback::from(
    move |event: InputEvent| {
      let value = input_value(&event);
      this.set(value.clone());
      let (start, end) = if this_is_start {
        (value, (*other).clone())
      } else {
        ((*other).clone(), value)
      };
      stage_range(
        &filter, &start, &end, &on_change,
        &on_submit
      );
    }
  )
}

#[function_component(BookingDateRangeFilterView)]
pub fn booking_date_range_filter_view(
  props: &BookingDateRangeFilterProps
) -> Html {
  let start_input = use_state(|| {
    draft_value(&props.filter, |r| r.start())
  });
  let end_input = use_state(|| {
    draft_value(&props.filter, |r| r.end())
  });

  let catalog = &props.catalog;
  let filter = &props.filter;
  let config = filter.config();

  let on_start = on_date_input(
    props,
    start_input.clone(),
    end_input.clone(),
    true
  );
  let on_end = on_date_input(
    props,
    end_input.clone(),
    start_input.clone(),
    false
  );

  let on_toggle = {
    let filter = filter.clone();
    let on_change = props.on_change.clone();
    Callback::from(move |_| {
      let mut next = filter.clone();
      next.toggle_open();
      on_change.emit(next);
    })
  };
  let on_apply = {
    let filter = filter.clone();
    let on_change = props.on_change.clone();
    let on_submit = props.on_submit.clone();
    Callback::from(move |_| {
      let mut next = filter.clone();
      let submission = next.apply();
      on_change.emit(next);
      on_submit.emit(submission);
    })
  };
  let on_clear = {
    let filter = filter.clone();
    let on_change = props.on_change.clone();
    let on_submit = props.on_submit.clone();
    let start_input = start_input.clone();
    let end_input = end_input.clone();
    Callback::from(move |_| {
      let mut next = filter.clone();
      let submission = next.clear();
      start_input.set(String::new());
      end_input.set(String::new());
      on_change.emit(next);
      on_submit.emit(submission);
    })
  };
  let on_cancel = {
    let filter = filter.clone();
    let on_change = props.on_change.clone();
    let start_input = start_input.clone();
    let end_input = end_input.clone();
    Callback::from(move |_| {
      let mut next = filter.clone();
      next.cancel();
      start_input.set(draft_value(&next, |r| r.start()));
      end_input.set(draft_value(&next, |r| r.end()));
      on_change.emit(next);
    })
  };

  let content = html! {
      <div class="date-range-content">
          <label>
              { catalog.text("BookingDateRangeFilter.startDate") }
              <input type="date" value={(*start_input).clone()} oninput={on_start} />
          </label>
          <label>
              { catalog.text("BookingDateRangeFilter.endDate") }
              <input type="date" value={(*end_input).clone()} oninput={on_end} />
          </label>
          <div class="actions">
              <button type="button" class="btn" onclick={on_clear}>{ catalog.text("BookingDateRangeFilter.clear") }</button>
              {
                  if config.live_edit {
                      html! {}
                  } else {
                      html! {
                          <>
                              <button type="button" class="btn" onclick={on_cancel}>{ catalog.text("BookingDateRangeFilter.cancel") }</button>
                              <button type="button" class="btn ok" onclick={on_apply}>{ catalog.text("BookingDateRangeFilter.apply") }</button>
                          </>
                      }
                  }
              }
          </div>
      </div>
  };

  let label = catalog.format(&filter.label());
  let selected = filter.applied().is_some();

  match filter.layout() {
    | FilterLayout::Popup {
      content_placement_offset
    } => {
      html! {
          <div id={config.id.clone()} class={classes!("date-range-filter", "popup", selected.then_some("selected"))}>
              <button type="button" class="btn filter-label" onclick={on_toggle}>{ label }</button>
              {
                  if filter.is_open() {
                      html! {
                          <div class="filter-popup" style={format!("left:{content_placement_offset}px;")}>
                              { content }
                          </div>
                      }
                  } else {
                      html! {}
                  }
              }
          </div>
      }
    }
    | FilterLayout::Plain => {
      html! {
          <div id={config.id.clone()} class={classes!("date-range-filter", "plain", selected.then_some("selected"))}>
              <div class="filter-label">{ label }</div>
              { content }
          </div>
      }
    }
  }
}
