//! Domain layer for the site tracking engine.
//!
//! This crate contains:
//! - Domain models (Coordinate, AttendanceSession, WorkerScheduleEntry)
//! - Pure business rules (geofencing, schedule conflicts, reconciliation)
//! - Collaborator traits (persistence, location, address, clock)
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
pub mod store;

pub use errors::{DomainError, StateConflict};
pub use store::{PersistenceStore, SessionFilter, StoreError};
