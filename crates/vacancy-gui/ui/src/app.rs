mod config;
mod storage;

use std::rc::Rc;

use chrono::{
  Local,
  NaiveDate
};
use vacancy_core::changes::AvailabilityCalendarChanges;
use vacancy_core::date_range_filter::{
  BookingDateRangeFilter,
  FilterSubmission
};
use vacancy_core::editor::{
  AvailabilityEditor,
  FormStatus
};
use vacancy_core::messages::{
  Catalog,
  Messages
};
use vacancy_core::month::MonthKey;
use vacancy_core::panel::AvailabilityPanel;
use vacancy_shared::ListingDto;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_memo,
  use_state
};

use crate::components::{
  BookingDateRangeFilterView,
  EditListingAvailabilityForm,
  EditListingAvailabilityPanel,
  ManageAvailabilityCalendar
};

const SUBMIT_MESSAGE: &str =
  "EditListingAvailabilityForm.submit";

#[derive(Clone)]
struct EditorState {
  panel:  AvailabilityPanel,
  editor: AvailabilityEditor,
  status: FormStatus
}

fn open_panel(
  listing: ListingDto
) -> AvailabilityPanel {
  match AvailabilityPanel::new(listing) {
    | Ok(panel) => panel,
    | Err(error) => {
      tracing::error!(%error, "stored listing has an invalid plan; starting a new listing");
      AvailabilityPanel::new(
        ListingDto::default()
      )
      .expect(
        "a listing without a plan uses \
         the default plan"
      )
    }
  }
}

fn load_editor_state(
  today: NaiveDate
) -> EditorState {
  let panel =
    open_panel(storage::load_listing());

  let changes =
    AvailabilityCalendarChanges::from_snapshot(
      &storage::load_calendar()
    )
    .unwrap_or_else(|error| {
      tracing::error!(%error, "stored calendar snapshot is invalid; starting empty");
      AvailabilityCalendarChanges::new()
    });

  let month = storage::load_month()
    .and_then(|raw| raw.parse().ok())
    .or_else(|| MonthKey::from_day(&today).ok())
    .unwrap_or_else(|| {
      tracing::error!(%today, "today has no month key; starting at the last one");
      MonthKey::new(9999, 12)
        .expect("9999-12 is a valid month key")
    });

  tracing::info!(
    %month,
    published = panel.is_published(),
    "loaded availability editor"
  );

  let editor =
    panel.editor(month, changes);
  EditorState {
    panel,
    editor,
    status: FormStatus::default()
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let today = Local::now().date_naive();
  let ui_config =
    use_memo((), |_| config::load_ui_config());
  let catalog: Rc<Catalog> =
    use_memo((), |_| Catalog::english());

  let state =
    use_state(|| load_editor_state(today));
  let filter = {
    let filter_config =
      ui_config.filter.clone();
    use_state(move || {
      BookingDateRangeFilter::new(
        filter_config,
        None
      )
    })
  };
  let filter_query =
    use_state(|| None::<String>);

  let on_toggle = {
    let state = state.clone();
    Callback::from(move |day: NaiveDate| {
      let mut next = (*state).clone();
      let Some(toggle) =
        next.editor.toggle_day(&day, today)
      else {
        return;
      };
      storage::save_calendar(
        &next.editor.changes().to_snapshot()
      );
      storage::append_edit(&toggle.to_edit(
        next.editor.current_month()
      ));
      next.status.updated = false;
      state.set(next);
    })
  };

  let on_month = {
    let state = state.clone();
    Callback::from(move |month: MonthKey| {
      let mut next = (*state).clone();
      let month =
        next.editor.set_current_month(month);
      storage::save_month(&month.to_string());
      state.set(next);
    })
  };

  let on_submit = {
    let state = state.clone();
    Callback::from(move |()| {
      let mut next = (*state).clone();
      next.status = FormStatus {
        update_in_progress: true,
        ..FormStatus::default()
      };

      let update =
        next.panel.submit(&mut next.editor);
      let mut listing =
        next.panel.listing().clone();
      listing.availability_plan =
        Some(update.availability_plan);

      match storage::save_listing(&listing) {
        | Ok(()) => {
          next.panel = open_panel(listing);
          next.status = FormStatus {
            updated: true,
            ..FormStatus::default()
          };
        }
        | Err(error) => {
          tracing::error!(%error, "failed saving listing");
          next.status = FormStatus {
            update_error: true,
            ..FormStatus::default()
          };
        }
      }
      state.set(next);
    })
  };

  let on_filter_change = {
    let filter = filter.clone();
    Callback::from(
      move |next: BookingDateRangeFilter| {
        filter.set(next)
      }
    )
  };

  let on_filter_submit = {
    let filter_query = filter_query.clone();
    Callback::from(
      move |submission: FilterSubmission| {
        let pair = submission.query_pair();
        tracing::info!(query = %pair, "date range filter submitted");
        filter_query.set(Some(pair));
      }
    )
  };

  let editor = &state.editor;
  let title =
    catalog.format(&state.panel.title());
  let error =
    AvailabilityEditor::error_message(
      &state.status
    )
    .map(|id| catalog.text(id.as_str()));

  html! {
      <EditListingAvailabilityPanel {title}>
          <BookingDateRangeFilterView
              filter={(*filter).clone()}
              catalog={catalog.clone()}
              on_change={on_filter_change}
              on_submit={on_filter_submit}
          />
          {
              match &*filter_query {
                  Some(pair) => html! { <code class="filter-query">{ pair }</code> },
                  None => html! {},
              }
          }
          <EditListingAvailabilityForm
              submit_button={editor.submit_button(&state.status)}
              {error}
              submit_label={catalog.text(SUBMIT_MESSAGE)}
              {on_submit}
          >
              <ManageAvailabilityCalendar
                  month={editor.current_month()}
                  changes={editor.current_changes().clone()}
                  {today}
                  week_start={ui_config.week_start}
                  catalog={catalog.clone()}
                  {on_toggle}
                  {on_month}
              />
          </EditListingAvailabilityForm>
      </EditListingAvailabilityPanel>
  }
}
