use domain::errors::{DomainError, StateConflict};
use domain::services::LocationSourceError;
use domain::store::StoreError;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("External dependency failure: {0}")]
    ExternalDependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// HTTP-equivalent status for the request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Domain(DomainError::StateConflict(_)) => 409,
            EngineError::Domain(DomainError::ScheduleConflict { .. }) => 409,
            EngineError::Domain(DomainError::Validation(_)) => 400,
            EngineError::Domain(DomainError::NotFound(_)) => 404,
            EngineError::ExternalDependency(_) => 503,
            EngineError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for the request layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Domain(DomainError::StateConflict(_)) => "state_conflict",
            EngineError::Domain(DomainError::ScheduleConflict { .. }) => "schedule_conflict",
            EngineError::Domain(DomainError::Validation(_)) => "validation_error",
            EngineError::Domain(DomainError::NotFound(_)) => "not_found",
            EngineError::ExternalDependency(_) => "service_unavailable",
            EngineError::Internal(_) => "internal_error",
        }
    }

    /// The state conflict, if this is one.
    pub fn state_conflict(&self) -> Option<&StateConflict> {
        match self {
            EngineError::Domain(DomainError::StateConflict(conflict)) => Some(conflict),
            _ => None,
        }
    }
}

impl From<StateConflict> for EngineError {
    fn from(conflict: StateConflict) -> Self {
        EngineError::Domain(DomainError::StateConflict(conflict))
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => EngineError::Domain(DomainError::NotFound(msg)),
            StoreError::Transient(msg) | StoreError::Backend(msg) => {
                EngineError::ExternalDependency(format!("Storage: {}", msg))
            }
        }
    }
}

impl From<LocationSourceError> for EngineError {
    fn from(err: LocationSourceError) -> Self {
        EngineError::ExternalDependency(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Domain(DomainError::from(errors))
    }
}
