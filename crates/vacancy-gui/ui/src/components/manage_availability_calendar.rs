use std::rc::Rc;

use chrono::{
  NaiveDate,
  Weekday
};
use gloo::events::EventListener;
use vacancy_core::calendar::{
  Breakpoint,
  CalendarLayout,
  DayStatus,
  MonthGrid,
  MonthNavigation
};
use vacancy_core::changes::MonthChangeSet;
use vacancy_core::messages::{
  Catalog,
  Messages
};
use vacancy_core::month::MonthKey;
use web_sys::KeyboardEvent;
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  UseStateHandle,
  classes,
  function_component,
  html,
  use_effect_with,
  use_node_ref,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct ManageAvailabilityCalendarProps {
  pub month:      MonthKey,
  pub changes:    MonthChangeSet,
  pub today:      NaiveDate,
  pub week_start: Weekday,
  pub catalog:    Rc<Catalog>,
  pub on_toggle:  Callback<NaiveDate>,
  pub on_month:   Callback<MonthKey>
}

fn measure_width(
  container: &NodeRef,
  width: &UseStateHandle<u32>
) {
  if let Some(element) =
    container.cast::<web_sys::Element>()
  {
    let measured =
      u32::try_from(element.client_width())
        .unwrap_or(0);
    if measured != **width {
      tracing::debug!(
        width = measured,
        "measured calendar container"
      );
      width.set(measured);
    }
  }
}

fn breakpoint_class(
  breakpoint: Breakpoint
) -> &'static str {
  match breakpoint {
    | Breakpoint::Wide => "wide",
    | Breakpoint::Medium => "medium",
    | Breakpoint::Narrow => "narrow"
  }
}

#[function_component(ManageAvailabilityCalendar)]
pub fn manage_availability_calendar(
  props: &ManageAvailabilityCalendarProps
) -> Html {
  let container = use_node_ref();
  let width = use_state(|| 0_u32);

  {
    let container = container.clone();
    let width = width.clone();
    use_effect_with((), move |_| {
      measure_width(&container, &width);
      let listener =
        web_sys::window().map(|window| {
          EventListener::new(
            &window,
            "resize",
            move |_| {
              measure_width(
                &container, &width
              )
            }
          )
        });
      move || drop(listener)
    });
  }

  let Some(layout) =
    CalendarLayout::for_width(*width)
  else {
    return html! {
        <div class="availability-calendar" ref={container}></div>
    };
  };

  let grid = MonthGrid::build(
    props.month,
    props.week_start,
    props.today,
    &props.changes
  );
  let nav = MonthNavigation::around(
    props.month
  );
  let catalog = &props.catalog;

  let on_previous = {
    let on_month = props.on_month.clone();
    Callback::from(move |_| {
      if let Some(month) = nav.previous {
        on_month.emit(month);
      }
    })
  };
  let on_next = {
    let on_month = props.on_month.clone();
    Callback::from(move |_| {
      if let Some(month) = nav.next {
        on_month.emit(month);
      }
    })
  };
  let onkeydown = {
    let on_month = props.on_month.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        if let Some(month) =
          nav.for_key(&event.key(), &layout)
        {
          on_month.emit(month);
        }
      }
    )
  };

  let cell_style = format!(
    "width:{0}px;height:{0}px;",
    layout.day_size
  );
  let legend = [
    (
      DayStatus::Today,
      "EditListingAvailabilityForm.legendToday"
    ),
    (
      DayStatus::Blocked,
      "EditListingAvailabilityForm.legendBlocked"
    ),
    (
      DayStatus::Reserved,
      "EditListingAvailabilityForm.legendReserved"
    ),
    (
      DayStatus::Open,
      "EditListingAvailabilityForm.legendOpen"
    ),
  ];

  html! {
      <div
          class={classes!("availability-calendar", breakpoint_class(layout.breakpoint))}
          ref={container}
          tabindex="0"
          {onkeydown}
      >
          <div class="calendar-nav">
              <button
                  type="button"
                  class="btn calendar-nav-prev"
                  aria-label={catalog.text("ManageAvailabilityCalendar.previousMonth")}
                  disabled={nav.previous.is_none()}
                  onclick={on_previous}
              >
                  { "‹" }
              </button>
              <div class="calendar-title">{ props.month.title() }</div>
              <button
                  type="button"
                  class="btn calendar-nav-next"
                  aria-label={catalog.text("ManageAvailabilityCalendar.nextMonth")}
                  disabled={nav.next.is_none()}
                  onclick={on_next}
              >
                  { "›" }
              </button>
          </div>
          <div class="calendar-weekday-row">
              {
                  for grid.weekday_labels().into_iter().map(|label| html! {
                      <div class="calendar-weekday" style={format!("width:{}px;", layout.day_size)}>{ label }</div>
                  })
              }
          </div>
          <div class="calendar-grid">
              {
                  for grid.weeks.iter().map(|week| html! {
                      <div class="calendar-week">
                          {
                              for week.iter().map(|cell| {
                                  let date = cell.date;
                                  let selectable = cell.selectable;
                                  let on_toggle = props.on_toggle.clone();
                                  html! {
                                      <button
                                          type="button"
                                          class={classes!(cell.markers.classes(), cell.outside_month.then_some("outside"))}
                                          style={cell_style.clone()}
                                          disabled={!selectable}
                                          title={cell.status.as_key()}
                                          onclick={Callback::from(move |_| {
                                              if selectable {
                                                  on_toggle.emit(date);
                                              }
                                          })}
                                      >
                                          { cell.label() }
                                      </button>
                                  }
                              })
                          }
                      </div>
                  })
              }
          </div>
          <div class="calendar-legend">
              {
                  for legend.iter().map(|(status, id)| html! {
                      <span class={classes!("legend-item", status.as_key())}>{ catalog.text(id) }</span>
                  })
              }
          </div>
          {
              if layout.hide_keyboard_shortcuts {
                  html! {}
              } else {
                  html! {
                      <div class="calendar-shortcuts">
                          <kbd>{ "←" }</kbd>
                          <kbd>{ "→" }</kbd>
                      </div>
                  }
              }
          }
      </div>
  }
}
