//! Engine services. Each owns one area of the domain and shares the
//! [`EngineContext`](crate::context::EngineContext).

pub mod attendance;
pub mod reconciliation;
pub mod scheduling;

pub use attendance::AttendanceService;
pub use reconciliation::ReconciliationService;
pub use scheduling::ScheduleService;
