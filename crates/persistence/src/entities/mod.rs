//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attendance_session;
pub mod location_sample;
pub mod schedule_entry;

pub use attendance_session::AttendanceSessionEntity;
pub use location_sample::LocationSampleEntity;
pub use schedule_entry::ScheduleEntryEntity;
