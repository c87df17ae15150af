//! Reverse geocoding against a Nominatim-compatible service.
//!
//! Used to attach a readable address to geofence checks. Every failure is
//! reported to the caller, which omits the address and carries on.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use domain::models::Coordinate;
use domain::services::{AddressError, AddressResolver};

use crate::config::GeocodingConfig;

// ============================================================================
// Response Types
// ============================================================================

/// Nominatim `/reverse?format=jsonv2` response.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ReverseResponse {
    fn into_address(self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        self.display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

// ============================================================================
// Circuit Breaker
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Stops calling the service after consecutive failures, retrying after a cool-down.
struct CircuitBreaker {
    is_open: AtomicBool,
    failure_count: AtomicU32,
    failure_threshold: u32,
    reset_timeout: Duration,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(failure_threshold: u32, reset_timeout_secs: u64) -> Self {
        Self {
            is_open: AtomicBool::new(false),
            failure_count: AtomicU32::new(0),
            failure_threshold: failure_threshold.max(1),
            reset_timeout: Duration::from_secs(reset_timeout_secs),
            opened_at: RwLock::new(None),
        }
    }

    async fn is_allowed(&self) -> bool {
        self.state().await != CircuitState::Open
    }

    async fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        if self.is_open.swap(false, Ordering::Relaxed) {
            info!("Geocoding circuit breaker closed after successful request");
            *self.opened_at.write().await = None;
        }
    }

    async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count < self.failure_threshold {
            return;
        }

        let reopening = self.is_open.swap(true, Ordering::Relaxed);
        *self.opened_at.write().await = Some(Instant::now());
        if !reopening {
            warn!(
                failure_count = count,
                threshold = self.failure_threshold,
                "Geocoding circuit breaker opened due to consecutive failures"
            );
        }
    }

    async fn state(&self) -> CircuitState {
        if !self.is_open.load(Ordering::Relaxed) {
            return CircuitState::Closed;
        }

        match *self.opened_at.read().await {
            Some(opened) if opened.elapsed() >= self.reset_timeout => CircuitState::HalfOpen,
            _ => CircuitState::Open,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct NominatimAddressResolver {
    client: Client,
    config: GeocodingConfig,
    circuit_breaker: CircuitBreaker,
}

impl NominatimAddressResolver {
    pub fn new(config: GeocodingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        let circuit_breaker =
            CircuitBreaker::new(config.circuit_breaker_failures, config.circuit_breaker_reset_secs);

        Ok(Self {
            client,
            config,
            circuit_breaker,
        })
    }

    pub fn is_available(&self) -> bool {
        self.config.enabled && !self.config.url.is_empty()
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state().await
    }

    async fn call_reverse(&self, coordinate: &Coordinate) -> Result<Option<String>, AddressError> {
        let url = format!("{}/reverse", self.config.url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AddressError::Lookup(format!("Request timeout after {}ms", self.config.timeout_ms))
                } else {
                    AddressError::Lookup(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AddressError::Lookup(format!("HTTP {}", status)));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| AddressError::Lookup(format!("Invalid response: {}", e)))?;
        Ok(body.into_address())
    }
}

#[async_trait::async_trait]
impl AddressResolver for NominatimAddressResolver {
    async fn reverse_geocode(&self, coordinate: &Coordinate) -> Result<Option<String>, AddressError> {
        if !self.is_available() {
            return Ok(None);
        }
        if !self.circuit_breaker.is_allowed().await {
            return Err(AddressError::Unavailable("circuit breaker open".into()));
        }

        let start = Instant::now();
        let result = self.call_reverse(coordinate).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(address) => {
                self.circuit_breaker.record_success().await;
                debug!(found = address.is_some(), duration_ms, "Reverse geocoding finished");
            }
            Err(e) => {
                self.circuit_breaker.record_failure().await;
                warn!(error = %e, duration_ms, "Reverse geocoding failed");
            }
        }
        result
    }
}
