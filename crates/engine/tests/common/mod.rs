//! Common test utilities for integration tests.
//!
//! Builds an engine on the in-memory store with a manual clock and a
//! scripted location source, so tests control both time and position.

// Not every integration test uses every helper.
#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use domain::models::{CheckInRequest, Coordinate, CreateScheduleEntryRequest, GeofenceTarget};
use domain::services::{AddressResolver, Clock, ManualClock, MockAddressResolver, MockLocationSource};
use persistence::InMemoryStore;
use sitetrack_engine::config::TrackingConfig;
use sitetrack_engine::TrackingEngine;

/// Test engine plus handles to the collaborators it was built with.
pub struct TestHarness {
    pub engine: TrackingEngine,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub locations: Arc<MockLocationSource>,
}

impl TestHarness {
    /// Moves the manual clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// 2024-06-03 08:00 UTC, a Monday.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
}

pub fn work_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

/// Time of day on [`work_date`].
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
}

/// Building entrance used as geofence center.
pub fn site() -> Coordinate {
    Coordinate::new(38.9, -77.0)
}

pub fn site_geofence(radius_meters: f64) -> GeofenceTarget {
    GeofenceTarget::new(site(), radius_meters)
}

pub fn harness() -> TestHarness {
    build(
        MockLocationSource::fixed(site()),
        Arc::new(MockAddressResolver::returning("100 Main St")),
        TrackingConfig::default(),
    )
}

pub fn harness_with(
    locations: MockLocationSource,
    addresses: Arc<dyn AddressResolver>,
    settings: TrackingConfig,
) -> TestHarness {
    build(locations, addresses, settings)
}

fn build(
    locations: MockLocationSource,
    addresses: Arc<dyn AddressResolver>,
    settings: TrackingConfig,
) -> TestHarness {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let locations = Arc::new(locations);

    let engine = TrackingEngine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .location_source(locations.clone())
        .address_resolver(addresses)
        .settings(settings)
        .build()
        .expect("Failed to build test engine");

    TestHarness {
        engine,
        store,
        clock,
        locations,
    }
}

/// Check-in at the site without a geofence.
pub fn check_in_request(worker_id: Uuid, hourly_rate: f64) -> CheckInRequest {
    CheckInRequest {
        worker_id,
        location: Some(site()),
        building_id: Some(Uuid::new_v4()),
        work_order_id: None,
        geofence: None,
        hourly_rate,
    }
}

pub fn schedule_request(
    worker_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateScheduleEntryRequest {
    CreateScheduleEntryRequest {
        worker_id,
        building_id: Uuid::new_v4(),
        date: work_date(),
        start_time: start,
        end_time: end,
        task: "Inspect HVAC units".to_string(),
    }
}
