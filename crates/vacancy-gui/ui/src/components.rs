mod booking_date_range_filter;
mod edit_listing_availability_form;
mod edit_listing_availability_panel;
mod manage_availability_calendar;

pub use booking_date_range_filter::BookingDateRangeFilterView;
pub use edit_listing_availability_form::EditListingAvailabilityForm;
pub use edit_listing_availability_panel::EditListingAvailabilityPanel;
pub use manage_availability_calendar::ManageAvailabilityCalendar;
