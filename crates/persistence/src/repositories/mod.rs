//! Repository implementations for database operations.

pub mod attendance_session;
pub mod location_sample;
pub mod schedule_entry;

pub use attendance_session::{AttendanceSessionRepository, SessionQuery};
pub use location_sample::LocationSampleRepository;
pub use schedule_entry::ScheduleEntryRepository;
