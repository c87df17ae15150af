//! Hours correction, approval and payment report models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use shared::validation::MAX_CORRECTED_HOURS;

/// Request payload for overriding the hours of a completed session.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CorrectHoursRequest {
    #[validate(custom(function = "shared::validation::validate_corrected_hours"))]
    pub corrected_hours: f64,

    #[validate(custom(function = "shared::validation::validate_reason"))]
    pub reason: String,

    pub corrected_by: Uuid,

    #[validate(custom(function = "shared::validation::validate_hourly_rate"))]
    #[serde(default)]
    pub new_hourly_rate: Option<f64>,
}

/// Request payload for approving or rejecting a completed session.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub approved: bool,

    pub approved_by: Uuid,

    #[validate(length(max = 500, message = "Rejection reason must be at most 500 characters"))]
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Filter for the payment report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReportFilter {
    /// Inclusive lower bound on clock-in time.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on clock-in time.
    pub to: Option<DateTime<Utc>>,
    #[serde(rename = "workerID", default)]
    pub worker_id: Option<Uuid>,
}

impl PaymentReportFilter {
    pub fn includes(&self, worker_id: Uuid, clock_in: DateTime<Utc>) -> bool {
        self.worker_id.map_or(true, |w| w == worker_id)
            && self.from.map_or(true, |from| clock_in >= from)
            && self.to.map_or(true, |to| clock_in < to)
    }
}

/// Aggregated pay for one worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPaymentSummary {
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,
    pub sessions_count: usize,
    pub total_hours: f64,
    pub total_pay: f64,
    pub avg_hourly_rate: f64,
}

/// Payment report over approved, completed sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReport {
    pub workers: Vec<WorkerPaymentSummary>,
    pub total_sessions: usize,
    pub total_hours: f64,
    pub total_pay: f64,
    pub generated_at: DateTime<Utc>,
}
