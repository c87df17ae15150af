//! Periodic location sampling for one worker.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use domain::models::{LocationSample, SampleActivity};

use crate::context::EngineContext;
use crate::{metrics, persist};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A tracking sample was appended.
    Recorded,
    /// No sample this time (location or store failure); the loop continues.
    Skipped,
    /// The worker has no open session; the loop exits.
    Terminated,
}

impl TickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickOutcome::Recorded => "recorded",
            TickOutcome::Skipped => "skipped",
            TickOutcome::Terminated => "terminated",
        }
    }
}

/// Samples one worker's location while the worker has an open session.
#[derive(Clone)]
pub struct LocationSampler {
    worker_id: Uuid,
    ctx: Arc<EngineContext>,
}

impl LocationSampler {
    pub fn new(worker_id: Uuid, ctx: Arc<EngineContext>) -> Self {
        Self { worker_id, ctx }
    }

    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    /// Records one tracking sample.
    ///
    /// The location is fetched before taking the worker lock so a slow
    /// provider never blocks check-out or break transitions.
    pub async fn tick(&self) -> TickOutcome {
        let worker_id = self.worker_id;

        let location = match self.ctx.acquire_location(worker_id).await {
            Ok(location) => Some(location),
            Err(err) => {
                warn!(worker_id = %worker_id, error = %err, "Location unavailable, skipping sample");
                None
            }
        };

        let _guard = self.ctx.session_locks.lock(worker_id).await;

        let mut session = match self.ctx.store.find_active_session_for_worker(worker_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!(worker_id = %worker_id, "No open session, sampler terminating");
                return TickOutcome::Terminated;
            }
            Err(err) => {
                warn!(worker_id = %worker_id, error = %err, "Failed to load session, skipping sample");
                return TickOutcome::Skipped;
            }
        };

        let Some(coordinate) = location else {
            return TickOutcome::Skipped;
        };

        let now = self.ctx.clock.now();
        let sample = LocationSample::new(
            coordinate,
            now,
            SampleActivity::Tracking,
            worker_id,
            Some(session.id),
        );

        let store = self.ctx.store.as_ref();
        if let Err(err) =
            persist::append_worker_sample(store, worker_id, &sample, self.ctx.history_capacity()).await
        {
            warn!(worker_id = %worker_id, error = %err, "Failed to append worker sample");
            return TickOutcome::Skipped;
        }

        session.record_sample(sample);
        session.refresh_elapsed(now);
        if let Err(err) = persist::save_session(store, &session).await {
            warn!(
                worker_id = %worker_id,
                session_id = %session.id,
                error = %err,
                "Failed to save sampled session"
            );
            return TickOutcome::Skipped;
        }

        debug!(
            worker_id = %worker_id,
            session_id = %session.id,
            elapsed_seconds = session.elapsed_seconds,
            "Tracking sample recorded"
        );
        TickOutcome::Recorded
    }

    /// Ticks every `period` until shut down or until the session ends.
    ///
    /// The first tick fires one full period after start; the check-in sample
    /// covers time zero.
    pub async fn run(self, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        let worker_id = self.worker_id;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first immediate tick
        interval.tick().await;

        info!(worker_id = %worker_id, period_secs = period.as_secs(), "Sampler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = self.tick().await;
                    metrics::record_sampler_tick(outcome.as_str());
                    if outcome == TickOutcome::Terminated {
                        info!(worker_id = %worker_id, "Sampler finished, session closed");
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!(worker_id = %worker_id, "Sampler shutting down");
                        break;
                    }
                }
            }
        }
    }
}
