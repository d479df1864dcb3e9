use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct EditListingAvailabilityPanelProps {
  pub title:    String,
  #[prop_or_default]
  pub children: Html
}

#[function_component(EditListingAvailabilityPanel)]
pub fn edit_listing_availability_panel(
  props: &EditListingAvailabilityPanelProps
) -> Html {
  html! {
      <section class="panel availability-panel">
          <h1 class="header">{ &props.title }</h1>
          { props.children.clone() }
      </section>
  }
}
