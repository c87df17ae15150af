//! Reverse geocoding abstraction.

use thiserror::Error;

use crate::models::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address lookup failed: {0}")]
    Lookup(String),

    #[error("Address lookup unavailable: {0}")]
    Unavailable(String),
}

/// Turns a coordinate into a human-readable address.
///
/// Failures never block an attendance transition; the address is omitted.
#[async_trait::async_trait]
pub trait AddressResolver: Send + Sync {
    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Option<String>, AddressError>;
}

/// Resolver used when geocoding is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAddressResolver;

#[async_trait::async_trait]
impl AddressResolver for NoopAddressResolver {
    async fn reverse_geocode(&self, _coordinate: &Coordinate) -> Result<Option<String>, AddressError> {
        Ok(None)
    }
}

/// Mock resolver for tests.
#[derive(Debug, Clone, Default)]
pub struct MockAddressResolver {
    pub address: Option<String>,
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockAddressResolver {
    pub fn returning(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            simulate_failure: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            address: None,
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for MockAddressResolver {
    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Option<String>, AddressError> {
        if self.simulate_failure {
            tracing::warn!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "Mock address resolver simulating failure"
            );
            return Err(AddressError::Unavailable("Simulated failure".to_string()));
        }
        Ok(self.address.clone())
    }
}
