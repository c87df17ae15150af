//! Engine metrics.
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub fn record_check_in() {
    counter!("attendance_check_ins_total").increment(1);
}

pub fn record_check_out() {
    counter!("attendance_check_outs_total").increment(1);
}

pub fn record_sampler_tick(outcome: &'static str) {
    counter!("sampler_ticks_total", "outcome" => outcome).increment(1);
}

pub fn record_geofence_validation(valid: bool) {
    let label = if valid { "true" } else { "false" };
    counter!("geofence_validations_total", "valid" => label).increment(1);
}

pub fn record_schedule_conflict() {
    counter!("schedule_conflicts_total").increment(1);
}

pub fn set_active_samplers(count: usize) {
    gauge!("active_samplers").set(count as f64);
}

/// Installs the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a tokio runtime, once, before metrics matter.
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install()
}
