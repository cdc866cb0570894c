// Export components
pub mod google_calendar;
pub mod work_log;

// Re-export the calendar client
pub use google_calendar::GoogleCalendarClient;
// Re-export the work-item loop
pub use work_log::WorkLog;
