//! Domain error taxonomy.
//!
//! Domain errors always propagate to the caller unmodified; they carry enough
//! context (ids, current state) to render a precise message.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::attendance::SessionState;

/// An operation that is invalid for the current attendance state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateConflict {
    #[error("Worker {worker_id} already has an open session {session_id}")]
    AlreadyActive { worker_id: Uuid, session_id: Uuid },

    #[error("Session {session_id} is not active (state: {state})")]
    NotActive { session_id: Uuid, state: SessionState },

    #[error("Session {session_id} is already on break")]
    AlreadyOnBreak { session_id: Uuid },

    #[error("Session {session_id} has no break in progress (state: {state})")]
    NoActiveBreak { session_id: Uuid, state: SessionState },

    #[error("Session {session_id} is not checked in (state: {state})")]
    NotCheckedIn { session_id: Uuid, state: SessionState },

    #[error("Session {session_id} is already completed")]
    SessionCompleted { session_id: Uuid },

    #[error("Session {session_id} must be completed first (state: {state})")]
    NotCompleted { session_id: Uuid, state: SessionState },
}

/// Errors raised by domain rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("State conflict: {0}")]
    StateConflict(#[from] StateConflict),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Schedule conflict: worker {worker_id} already has entry {conflicting_entry_id} overlapping on {date}")]
    ScheduleConflict {
        worker_id: Uuid,
        date: NaiveDate,
        conflicting_entry_id: Uuid,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn session_not_found(session_id: Uuid) -> Self {
        DomainError::NotFound(format!("Session {} not found", session_id))
    }

    pub fn schedule_entry_not_found(entry_id: Uuid) -> Self {
        DomainError::NotFound(format!("Schedule entry {} not found", entry_id))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, err.code),
                })
            })
            .collect();

        if messages.is_empty() {
            DomainError::Validation(errors.to_string())
        } else {
            DomainError::Validation(messages.join(", "))
        }
    }
}
