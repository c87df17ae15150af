//! Hours correction, approval and payment report integration tests.

mod common;

use chrono::Duration;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use uuid::Uuid;

use common::*;
use domain::errors::{DomainError, StateConflict};
use domain::models::{
    ApprovalRequest, AttendanceSession, CorrectHoursRequest, PaymentReportFilter,
};
use sitetrack_engine::EngineError;

fn correction(hours: f64, reason: &str, by: Uuid) -> CorrectHoursRequest {
    CorrectHoursRequest {
        corrected_hours: hours,
        reason: reason.to_string(),
        corrected_by: by,
        new_hourly_rate: None,
    }
}

fn approval(by: Uuid) -> ApprovalRequest {
    ApprovalRequest {
        approved: true,
        approved_by: by,
        rejection_reason: None,
    }
}

/// Checks the worker in now and out after `minutes`.
async fn completed_session(
    h: &TestHarness,
    worker: Uuid,
    rate: f64,
    minutes: i64,
) -> AttendanceSession {
    let session = h
        .engine
        .attendance()
        .check_in(check_in_request(worker, rate))
        .await
        .unwrap();
    h.advance(Duration::minutes(minutes));
    h.engine
        .attendance()
        .check_out(session.id, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_correction_snapshots_original_hours_once() {
    let h = harness();
    let admin = Uuid::new_v4();
    let session = completed_session(&h, Uuid::new_v4(), 20.0, 450).await;
    assert_eq!(session.raw_hours, Some(7.5));

    let reconciliation = h.engine.reconciliation();
    let corrected = reconciliation
        .correct_hours(session.id, correction(6.0, "forgot to clock out", admin))
        .await
        .unwrap();
    assert_eq!(corrected.original_hours, Some(7.5));
    assert_eq!(corrected.effective_hours(), 6.0);
    assert_eq!(corrected.calculated_pay, 120.0);
    assert_eq!(corrected.corrected_by, Some(admin));
    assert_eq!(corrected.correction_reason.as_deref(), Some("forgot to clock out"));

    let reason: String = Sentence(4..8).fake();
    let corrected = reconciliation
        .correct_hours(session.id, correction(5.5, &reason, admin))
        .await
        .unwrap();
    assert_eq!(corrected.original_hours, Some(7.5));
    assert_eq!(corrected.corrected_hours, Some(5.5));
    assert_eq!(corrected.raw_hours, Some(7.5));
    assert_eq!(corrected.calculated_pay, 110.0);
}

#[tokio::test]
async fn test_correction_with_new_rate() {
    let h = harness();
    let session = completed_session(&h, Uuid::new_v4(), 20.0, 240).await;

    let mut request = correction(4.0, "Rate adjusted by payroll", Uuid::new_v4());
    request.new_hourly_rate = Some(25.0);
    let corrected = h
        .engine
        .reconciliation()
        .correct_hours(session.id, request)
        .await
        .unwrap();

    assert_eq!(corrected.hourly_rate, 25.0);
    assert_eq!(corrected.calculated_pay, 100.0);
}

#[tokio::test]
async fn test_correction_validation() {
    let h = harness();
    let session = completed_session(&h, Uuid::new_v4(), 20.0, 60).await;
    let reconciliation = h.engine.reconciliation();

    for request in [
        correction(24.5, "Too many hours", Uuid::new_v4()),
        correction(-1.0, "Negative hours", Uuid::new_v4()),
        correction(2.0, "  ab  ", Uuid::new_v4()),
    ] {
        let err = reconciliation
            .correct_hours(session.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    let unchanged = h.engine.attendance().get_session(session.id).await.unwrap();
    assert!(unchanged.original_hours.is_none());
    assert_eq!(unchanged.calculated_pay, 20.0);
}

#[tokio::test]
async fn test_open_session_cannot_be_corrected_or_approved() {
    let h = harness();
    let session = h
        .engine
        .attendance()
        .check_in(check_in_request(Uuid::new_v4(), 20.0))
        .await
        .unwrap();
    let reconciliation = h.engine.reconciliation();

    let err = reconciliation
        .correct_hours(session.id, correction(1.0, "Early correction", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(
        err.state_conflict(),
        Some(StateConflict::NotCompleted { .. })
    ));

    let err = reconciliation
        .approve(session.id, approval(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_rejection_requires_reason() {
    let h = harness();
    let session = completed_session(&h, Uuid::new_v4(), 20.0, 60).await;
    let reconciliation = h.engine.reconciliation();
    let supervisor = Uuid::new_v4();

    let err = reconciliation
        .approve(
            session.id,
            ApprovalRequest {
                approved: false,
                approved_by: supervisor,
                rejection_reason: Some("   ".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Domain(DomainError::Validation(_))));

    let rejected = reconciliation
        .approve(
            session.id,
            ApprovalRequest {
                approved: false,
                approved_by: supervisor,
                rejection_reason: Some("Hours do not match the work order".into()),
            },
        )
        .await
        .unwrap();
    assert!(!rejected.is_approved);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Hours do not match the work order")
    );

    h.advance(Duration::hours(1));
    let approved = reconciliation
        .approve(session.id, approval(supervisor))
        .await
        .unwrap();
    assert!(approved.is_approved);
    assert!(approved.rejection_reason.is_none());
    assert_eq!(approved.approved_by, Some(supervisor));
    assert_eq!(approved.approved_at, Some(h.clock_now()));
}

#[tokio::test]
async fn test_payment_report() {
    let h = harness();
    let supervisor = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let a1 = completed_session(&h, alice, 20.0, 8 * 60).await;
    let b1 = completed_session(&h, bob, 30.0, 4 * 60).await;
    let a2 = completed_session(&h, alice, 20.0, 2 * 60).await;
    // Open and unapproved sessions are excluded.
    h.engine
        .attendance()
        .check_in(check_in_request(bob, 30.0))
        .await
        .unwrap();

    let reconciliation = h.engine.reconciliation();
    for id in [a1.id, b1.id] {
        reconciliation.approve(id, approval(supervisor)).await.unwrap();
    }

    let report = reconciliation
        .payment_report(&PaymentReportFilter::default())
        .await
        .unwrap();
    assert_eq!(report.total_sessions, 2);
    assert_eq!(report.total_hours, 12.0);
    assert_eq!(report.total_pay, 280.0);
    assert_eq!(report.workers.len(), 2);
    let alice_summary = report.workers.iter().find(|w| w.worker_id == alice).unwrap();
    assert_eq!(alice_summary.sessions_count, 1);
    assert_eq!(alice_summary.total_pay, 160.0);
    assert_eq!(alice_summary.avg_hourly_rate, 20.0);

    reconciliation.approve(a2.id, approval(supervisor)).await.unwrap();
    let report = reconciliation
        .payment_report(&PaymentReportFilter {
            worker_id: Some(alice),
            ..PaymentReportFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(report.workers.len(), 1);
    assert_eq!(report.workers[0].sessions_count, 2);
    assert_eq!(report.total_hours, 10.0);
    assert_eq!(report.total_pay, 200.0);

    let report = reconciliation
        .payment_report(&PaymentReportFilter {
            from: Some(b1.clock_in_time),
            ..PaymentReportFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(report.total_sessions, 2);
    assert_eq!(report.total_pay, 160.0);
}

#[tokio::test]
async fn test_report_uses_corrected_hours() {
    let h = harness();
    let worker = Uuid::new_v4();
    let session = completed_session(&h, worker, 15.0, 600).await;
    let reconciliation = h.engine.reconciliation();

    reconciliation
        .correct_hours(session.id, correction(8.0, "Lunch not recorded", Uuid::new_v4()))
        .await
        .unwrap();
    reconciliation
        .approve(session.id, approval(Uuid::new_v4()))
        .await
        .unwrap();

    let report = reconciliation
        .payment_report(&PaymentReportFilter::default())
        .await
        .unwrap();
    assert_eq!(report.total_hours, 8.0);
    assert_eq!(report.total_pay, 120.0);
    assert_eq!(report.workers[0].avg_hourly_rate, 15.0);
}

#[tokio::test]
async fn test_empty_report() {
    let h = harness();
    let report = h
        .engine
        .reconciliation()
        .payment_report(&PaymentReportFilter::default())
        .await
        .unwrap();
    assert!(report.workers.is_empty());
    assert_eq!(report.total_sessions, 0);
    assert_eq!(report.total_pay, 0.0);
    assert_eq!(report.generated_at, t0());
}
