use vacancy_core::editor::SubmitButtonState;
use web_sys::SubmitEvent;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct EditListingAvailabilityFormProps {
  pub submit_button: SubmitButtonState,
  pub error:         Option<String>,
  pub submit_label:  String,
  pub on_submit:     Callback<()>,
  #[prop_or_default]
  pub children:      Html
}

#[function_component(EditListingAvailabilityForm)]
pub fn edit_listing_availability_form(
  props: &EditListingAvailabilityFormProps
) -> Html {
  let button = props.submit_button;
  let onsubmit = {
    let on_submit = props.on_submit.clone();
    Callback::from(
      move |event: SubmitEvent| {
        event.prevent_default();
        if !button.disabled {
          on_submit.emit(());
        }
      }
    )
  };

  html! {
      <form class="availability-form" {onsubmit}>
          {
              match &props.error {
                  Some(message) => html! { <p class="error">{ message }</p> },
                  None => html! {},
              }
          }
          { props.children.clone() }
          <button
              type="submit"
              class={classes!(
                  "btn",
                  "submit",
                  button.ready.then_some("ready"),
                  button.in_progress.then_some("in-progress")
              )}
              disabled={button.disabled}
          >
              { if button.ready { "✓" } else { "" } }
              { &props.submit_label }
          </button>
      </form>
  }
}
