use vacancy_shared::{
  ListingDto,
  ListingState,
  ListingUpdate
};

use crate::changes::AvailabilityCalendarChanges;
use crate::editor::AvailabilityEditor;
use crate::messages::{
  Message,
  MessageId
};
use crate::month::MonthKey;
use crate::plan::AvailabilityPlan;

const PANEL_TITLE: &str =
  "EditListingAvailabilityPanel.title";
const CREATE_LISTING_TITLE: &str =
  "EditListingAvailabilityPanel.createListingTitle";

/// Listing-level wrapper around the
/// availability editor.
#[derive(Debug, Clone)]
pub struct AvailabilityPanel {
  listing: ListingDto,
  plan:    AvailabilityPlan
}

impl AvailabilityPanel {
  /// Listings without a plan (new
  /// drafts) get the default template.
  pub fn new(
    listing: ListingDto
  ) -> anyhow::Result<Self> {
    let plan = match listing
      .availability_plan
      .as_ref()
    {
      | Some(dto) => {
        AvailabilityPlan::from_dto(dto)?
      }
      | None => AvailabilityPlan::default()
    };
    Ok(Self { listing, plan })
  }

  #[must_use]
  pub fn listing(&self) -> &ListingDto {
    &self.listing
  }

  #[must_use]
  pub fn is_published(&self) -> bool {
    self.listing.id.is_some()
      && self.listing.state
        != ListingState::Draft
  }

  #[must_use]
  pub fn title(&self) -> Message {
    if self.is_published() {
      Message::new(MessageId::new(
        PANEL_TITLE
      ))
      .with(
        "listingTitle",
        self.listing.title.clone()
      )
    } else {
      Message::new(MessageId::new(
        CREATE_LISTING_TITLE
      ))
    }
  }

  #[must_use]
  pub fn initial_plan(
    &self
  ) -> &AvailabilityPlan {
    &self.plan
  }

  #[must_use]
  pub fn editor(
    &self,
    current_month: MonthKey,
    changes: AvailabilityCalendarChanges
  ) -> AvailabilityEditor {
    AvailabilityEditor::new(
      current_month,
      changes,
      self.plan.clone()
    )
  }

  /// Payload for the host's save
  /// routine.
  #[must_use]
  pub fn submit(
    &self,
    editor: &mut AvailabilityEditor
  ) -> ListingUpdate {
    ListingUpdate {
      availability_plan: editor
        .submit()
        .to_dto()
    }
  }
}
