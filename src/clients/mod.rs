pub mod credentials;
pub mod google_calendar;
