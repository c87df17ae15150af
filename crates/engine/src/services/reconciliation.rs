//! Supervisor corrections, approvals and payment reports.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use domain::errors::DomainError;
use domain::models::{
    ApprovalRequest, AttendanceSession, CorrectHoursRequest, PaymentReport, PaymentReportFilter,
    SessionState,
};
use domain::services::reconciliation;
use domain::store::SessionFilter;

use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::persist;
use crate::tracking::TrackingRegistry;

pub struct ReconciliationService {
    ctx: Arc<EngineContext>,
    registry: Arc<TrackingRegistry>,
}

impl ReconciliationService {
    pub fn new(ctx: Arc<EngineContext>, registry: Arc<TrackingRegistry>) -> Self {
        Self { ctx, registry }
    }

    pub async fn correct_hours(
        &self,
        session_id: Uuid,
        request: CorrectHoursRequest,
    ) -> EngineResult<AttendanceSession> {
        let worker_id = self.load(session_id).await?.worker_id;

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let mut session = self.load(session_id).await?;
        // Review never changes whether the session is open.
        self.sync_tracking(worker_id).await;
        reconciliation::correct_hours(&mut session, &request, self.ctx.clock.now())?;
        persist::save_session(self.ctx.store.as_ref(), &session).await?;

        info!(
            worker_id = %worker_id,
            session_id = %session_id,
            corrected_by = %request.corrected_by,
            original_hours = session.original_hours.unwrap_or(0.0),
            corrected_hours = request.corrected_hours,
            calculated_pay = session.calculated_pay,
            "Session hours corrected"
        );
        Ok(session)
    }

    pub async fn approve(
        &self,
        session_id: Uuid,
        request: ApprovalRequest,
    ) -> EngineResult<AttendanceSession> {
        let worker_id = self.load(session_id).await?.worker_id;

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let mut session = self.load(session_id).await?;
        // Review never changes whether the session is open.
        self.sync_tracking(worker_id).await;
        reconciliation::approve(&mut session, &request, self.ctx.clock.now())?;
        persist::save_session(self.ctx.store.as_ref(), &session).await?;

        info!(
            worker_id = %worker_id,
            session_id = %session_id,
            approved = session.is_approved,
            approved_by = %request.approved_by,
            "Session reviewed"
        );
        Ok(session)
    }

    /// Pay totals over completed, approved sessions.
    pub async fn payment_report(&self, filter: &PaymentReportFilter) -> EngineResult<PaymentReport> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(DomainError::validation("'to' must not be before 'from'").into());
            }
        }

        let sessions = self
            .ctx
            .store
            .list_sessions(&SessionFilter {
                worker_id: filter.worker_id,
                state: Some(SessionState::Completed),
                from: filter.from,
                to: filter.to,
                approved: Some(true),
            })
            .await?;

        let report = reconciliation::build_payment_report(&sessions, filter, self.ctx.clock.now());
        info!(
            workers = report.workers.len(),
            total_sessions = report.total_sessions,
            total_pay = report.total_pay,
            "Payment report generated"
        );
        Ok(report)
    }

    async fn sync_tracking(&self, worker_id: Uuid) {
        if let Err(err) = self.registry.ensure(worker_id).await {
            warn!(worker_id = %worker_id, error = %err, "Failed to reconcile sampler");
        }
    }

    async fn load(&self, session_id: Uuid) -> EngineResult<AttendanceSession> {
        self.ctx
            .store
            .load_session(session_id)
            .await?
            .ok_or_else(|| DomainError::session_not_found(session_id).into())
    }
}
