//! Hours correction, approval and payment aggregation.
//!
//! These functions operate on already-loaded sessions; locking and
//! persistence are the caller's concern.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{DomainError, StateConflict};
use crate::models::{
    ApprovalRequest, AttendanceSession, CorrectHoursRequest, PaymentReport, PaymentReportFilter,
    SessionState, WorkerPaymentSummary,
};
use shared::numeric::round2;

fn require_completed(session: &AttendanceSession) -> Result<(), DomainError> {
    if session.state != SessionState::Completed {
        return Err(StateConflict::NotCompleted {
            session_id: session.id,
            state: session.state,
        }
        .into());
    }
    Ok(())
}

/// Overrides the hours of a completed session and recomputes pay.
///
/// The first correction snapshots the effective hours into `original_hours`;
/// later corrections keep that snapshot.
pub fn correct_hours(
    session: &mut AttendanceSession,
    request: &CorrectHoursRequest,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    request.validate()?;
    require_completed(session)?;

    if session.original_hours.is_none() {
        session.original_hours = Some(session.effective_hours());
    }
    session.corrected_hours = Some(request.corrected_hours);
    session.correction_reason = Some(request.reason.trim().to_string());
    session.corrected_by = Some(request.corrected_by);
    session.corrected_at = Some(now);

    if let Some(rate) = request.new_hourly_rate {
        session.hourly_rate = rate;
    }

    session.recalculate_pay();
    session.updated_at = now;
    Ok(())
}

/// Approves or rejects a completed session.
pub fn approve(
    session: &mut AttendanceSession,
    request: &ApprovalRequest,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    request.validate()?;
    require_completed(session)?;

    if request.approved {
        session.rejection_reason = None;
    } else {
        let reason = request
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| DomainError::validation("Rejection reason is required"))?;
        session.rejection_reason = Some(reason.to_string());
    }

    session.is_approved = request.approved;
    session.approved_by = Some(request.approved_by);
    session.approved_at = Some(now);
    session.updated_at = now;
    Ok(())
}

#[derive(Default)]
struct Totals {
    sessions: usize,
    hours: f64,
    pay: f64,
}

/// Aggregates pay over completed, approved sessions matching `filter`.
///
/// Workers are ordered by id so reports are stable across calls.
pub fn build_payment_report(
    sessions: &[AttendanceSession],
    filter: &PaymentReportFilter,
    now: DateTime<Utc>,
) -> PaymentReport {
    let mut per_worker: BTreeMap<Uuid, Totals> = BTreeMap::new();

    for session in sessions.iter().filter(|s| {
        s.state == SessionState::Completed
            && s.is_approved
            && filter.includes(s.worker_id, s.clock_in_time)
    }) {
        let totals = per_worker.entry(session.worker_id).or_default();
        totals.sessions += 1;
        totals.hours += session.effective_hours();
        totals.pay += session.calculated_pay;
    }

    let workers: Vec<WorkerPaymentSummary> = per_worker
        .into_iter()
        .map(|(worker_id, totals)| {
            let avg_hourly_rate = if totals.hours > 0.0 {
                round2(totals.pay / totals.hours)
            } else {
                0.0
            };
            WorkerPaymentSummary {
                worker_id,
                sessions_count: totals.sessions,
                total_hours: round2(totals.hours),
                total_pay: round2(totals.pay),
                avg_hourly_rate,
            }
        })
        .collect();

    PaymentReport {
        total_sessions: workers.iter().map(|w| w.sessions_count).sum(),
        total_hours: round2(workers.iter().map(|w| w.total_hours).sum()),
        total_pay: round2(workers.iter().map(|w| w.total_pay).sum()),
        workers,
        generated_at: now,
    }
}
