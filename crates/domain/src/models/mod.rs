//! Domain models for the tracking engine.

pub mod attendance;
pub mod coordinate;
pub mod location_sample;
pub mod reconciliation;
pub mod schedule;

pub use attendance::{
    AttendanceSession, BreakRecord, CheckInRequest, GeofenceCheck, NewSession, ProgressUpdate,
    ProgressUpdateRequest, SessionGeofence, SessionState, StartBreakRequest,
};
pub use coordinate::{Coordinate, GeofenceTarget};
pub use location_sample::{LocationHistory, LocationSample, SampleActivity, DEFAULT_HISTORY_CAPACITY};
pub use reconciliation::{
    ApprovalRequest, CorrectHoursRequest, PaymentReport, PaymentReportFilter,
    WorkerPaymentSummary,
};
pub use schedule::{
    CreateScheduleEntryRequest, ScheduleStatus, ScheduleWindow, UpdateScheduleEntryRequest,
    WorkerScheduleEntry,
};
