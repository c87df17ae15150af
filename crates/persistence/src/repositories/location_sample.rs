//! Worker location history repository for database operations.

use domain::models::LocationSample;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::LocationSampleEntity;
use crate::metrics::QueryTimer;

/// Repository for the bounded per-worker location history.
#[derive(Clone)]
pub struct LocationSampleRepository {
    pool: PgPool,
}

impl LocationSampleRepository {
    /// Creates a new LocationSampleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a sample and trim the worker's history to `capacity` rows.
    ///
    /// Runs in one transaction so readers never see more than `capacity` rows.
    /// Returns the number of evicted samples.
    pub async fn append(
        &self,
        worker_id: Uuid,
        sample: &LocationSample,
        capacity: usize,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("append_worker_location_sample");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO worker_location_samples (
                worker_id, latitude, longitude, accuracy, activity, source_session_id, captured_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(worker_id)
        .bind(sample.coordinate.latitude)
        .bind(sample.coordinate.longitude)
        .bind(sample.coordinate.accuracy)
        .bind(sample.activity.as_str())
        .bind(sample.source_session_id)
        .bind(sample.captured_at)
        .execute(&mut *tx)
        .await?;

        let evicted = sqlx::query(
            r#"
            DELETE FROM worker_location_samples
            WHERE worker_id = $1
              AND id NOT IN (
                  SELECT id FROM worker_location_samples
                  WHERE worker_id = $1
                  ORDER BY id DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(worker_id)
        .bind(capacity.max(1) as i64)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(evicted)
    }

    /// Up to `limit` samples, newest first.
    pub async fn recent(
        &self,
        worker_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LocationSampleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_recent_worker_location_samples");

        let result = sqlx::query_as::<_, LocationSampleEntity>(
            r#"
            SELECT id, worker_id, latitude, longitude, accuracy, activity, source_session_id,
                   captured_at
            FROM worker_location_samples
            WHERE worker_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(worker_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }
}
