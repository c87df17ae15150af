//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record how long a store query took.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "store_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called periodically by the engine.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("store_connections_active").set(active as f64);
    gauge!("store_connections_idle").set(idle as f64);
    gauge!("store_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_attendance_session_by_id");
/// let result = sqlx::query_as::<_, AttendanceSessionEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("upsert_attendance_session");
        assert_eq!(timer.query_name, "upsert_attendance_session");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("list_attendance_sessions").record();
    }
}
