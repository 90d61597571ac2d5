//! Postgres store for the job queue.

use crate::error::{SchedulerError, SchedulerResult};
use crate::job::{Job, JobId, JobState};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    queue: String,
    job_type: String,
    payload: serde_json::Value,
    state: String,
    attempts: i32,
    max_attempts: i32,
    delete_on_dead: bool,
    last_error: Option<String>,
    enqueued_at: DateTime<Utc>,
    scheduled_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    visible_until: Option<DateTime<Utc>>,
}

impl JobRow {
    fn into_job(self) -> SchedulerResult<Job> {
        let state = JobState::parse(&self.state)
            .ok_or_else(|| SchedulerError::ExecutionFailed(format!("unknown job state {}", self.state)))?;
        Ok(Job {
            id: self.id,
            queue: self.queue,
            job_type: self.job_type,
            payload: self.payload,
            state,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            delete_on_dead: self.delete_on_dead,
            last_error: self.last_error,
            enqueued_at: self.enqueued_at,
            scheduled_at: self.scheduled_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            visible_until: self.visible_until,
        })
    }
}

const SELECT_COLUMNS: &str = "id, queue, job_type, payload, state, attempts, max_attempts, \
     delete_on_dead, last_error, enqueued_at, scheduled_at, started_at, finished_at, visible_until";

/// Durable queue over the `jobs` table.
///
/// Claims use `FOR UPDATE SKIP LOCKED`, so concurrent workers never hand
/// out the same job twice; the invisibility timeout returns jobs whose
/// worker died mid-flight.
#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a job.
    pub async fn enqueue(&self, job: &Job) -> SchedulerResult<JobId> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, queue, job_type, payload, state, attempts, max_attempts,
                              delete_on_dead, last_error, enqueued_at, scheduled_at, started_at,
                              finished_at, visible_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(job.id)
        .bind(&job.queue)
        .bind(&job.job_type)
        .bind(&job.payload)
        .bind(job.state.as_str())
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.delete_on_dead)
        .bind(&job.last_error)
        .bind(job.enqueued_at)
        .bind(job.scheduled_at)
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(job.visible_until)
        .execute(&self.pool)
        .await?;

        debug!(job_id = %job.id, job_type = %job.job_type, queue = %job.queue, "job enqueued");
        Ok(job.id)
    }

    /// Insert a job delayed by `delay`.
    pub async fn enqueue_in(&self, job: Job, delay: Duration) -> SchedulerResult<JobId> {
        let delayed = job.schedule_after(
            chrono::Duration::from_std(delay)
                .map_err(|e| SchedulerError::ExecutionFailed(e.to_string()))?,
        );
        self.enqueue(&delayed).await
    }

    /// Claim the next ready job from the given lanes, in lane order.
    ///
    /// The claim stamps `visible_until`; a worker that dies leaves the job
    /// to be reclaimed once the stamp expires.
    pub async fn dequeue(
        &self,
        lanes: &[&str],
        invisibility: Duration,
    ) -> SchedulerResult<Option<Job>> {
        self.reclaim_expired().await?;

        let lanes: Vec<String> = lanes.iter().map(|s| s.to_string()).collect();
        for lane in &lanes {
            let row = sqlx::query_as::<_, JobRow>(&format!(
                r#"
                UPDATE jobs
                SET state = 'processing', attempts = attempts + 1, started_at = NOW(),
                    visible_until = NOW() + make_interval(secs => $2)
                WHERE id = (
                    SELECT id FROM jobs
                    WHERE queue = $1
                      AND (state = 'enqueued'
                           OR (state IN ('scheduled', 'retrying') AND scheduled_at <= NOW()))
                    ORDER BY enqueued_at ASC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING {SELECT_COLUMNS}
                "#
            ))
            .bind(lane)
            .bind(invisibility.as_secs_f64())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return Ok(Some(row.into_job()?));
            }
        }
        Ok(None)
    }

    /// Return expired claims to the queue.
    pub async fn reclaim_expired(&self) -> SchedulerResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET state = 'enqueued', visible_until = NULL
            WHERE state = 'processing' AND visible_until < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record a successful run.
    pub async fn complete(&self, job_id: JobId) -> SchedulerResult<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET state = 'succeeded', finished_at = NOW(), visible_until = NULL
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a failed run: schedule a retry with backoff, park the job
    /// dead, or delete it when the job asked for that.
    pub async fn fail(&self, job: &mut Job, error: &str) -> SchedulerResult<()> {
        job.fail(error, Utc::now());

        if job.state == JobState::Dead && job.delete_on_dead {
            self.delete(job.id).await?;
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE jobs
            SET state = $2, last_error = $3, scheduled_at = $4, finished_at = $5,
                visible_until = NULL
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.state.as_str())
        .bind(&job.last_error)
        .bind(job.scheduled_at)
        .bind(job.finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, job_id: JobId) -> SchedulerResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(JobRow::into_job).transpose()
    }

    /// Delete a job row. Returns whether anything was removed.
    pub async fn delete(&self, job_id: JobId) -> SchedulerResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Job counts grouped by state.
    pub async fn counts_by_state(&self) -> SchedulerResult<Vec<(JobState, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT state, COUNT(*) FROM jobs GROUP BY state")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for (state, count) in rows {
            if let Some(state) = JobState::parse(&state) {
                counts.push((state, count));
            }
        }
        Ok(counts)
    }

    /// Recently finished jobs, newest first.
    pub async fn history(&self, limit: i64) -> SchedulerResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM jobs \
             WHERE finished_at IS NOT NULL ORDER BY finished_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(JobRow::into_job).collect()
    }

    /// Remove finished jobs older than the cutoff. Returns rows removed.
    pub async fn purge_finished(&self, older_than: DateTime<Utc>) -> SchedulerResult<u64> {
        let result = sqlx::query(
            "DELETE FROM jobs WHERE state = 'succeeded' AND finished_at < $1",
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
