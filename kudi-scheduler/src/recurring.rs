//! Recurring jobs: cron rows enqueued when due.

use crate::error::{SchedulerError, SchedulerResult};
use crate::expression::CronExpression;
use crate::job::{Job, JobData, JobId};
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Desired registration for one recurring job.
#[derive(Debug, Clone)]
pub struct RecurringSpec {
    pub id: String,
    pub job_type: String,
    pub payload: JobData,
    pub cron_expr: String,
    pub queue: String,
    pub delete_on_dead: bool,
}

/// A persisted recurring job.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecurringJob {
    pub id: String,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub cron_expr: String,
    pub queue: String,
    pub delete_on_dead: bool,
    pub enabled: bool,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_enqueued_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, job_type, payload, cron_expr, queue, delete_on_dead, enabled, \
     next_run_at, last_enqueued_at, updated_at";

/// Store for the `recurring_jobs` table.
#[derive(Clone)]
pub struct RecurringStore {
    pool: PgPool,
}

impl RecurringStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register or update a recurring job. Idempotent: the same id always
    /// yields one row, with the schedule and arguments overwritten.
    pub async fn schedule(&self, spec: &RecurringSpec) -> SchedulerResult<()> {
        let expression = CronExpression::parse(&spec.cron_expr)?;
        let next_run = expression.next();

        sqlx::query(
            r#"
            INSERT INTO recurring_jobs (id, job_type, payload, cron_expr, queue, delete_on_dead,
                                        enabled, next_run_at, last_enqueued_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, NULL, NOW())
            ON CONFLICT (id) DO UPDATE
            SET job_type = EXCLUDED.job_type,
                payload = EXCLUDED.payload,
                cron_expr = EXCLUDED.cron_expr,
                queue = EXCLUDED.queue,
                delete_on_dead = EXCLUDED.delete_on_dead,
                enabled = TRUE,
                next_run_at = EXCLUDED.next_run_at,
                updated_at = NOW()
            "#,
        )
        .bind(&spec.id)
        .bind(&spec.job_type)
        .bind(&spec.payload)
        .bind(&spec.cron_expr)
        .bind(&spec.queue)
        .bind(spec.delete_on_dead)
        .bind(next_run)
        .execute(&self.pool)
        .await?;

        info!(recurring_id = %spec.id, cron = %spec.cron_expr, "recurring job registered");
        Ok(())
    }

    /// Remove a recurring job. Returns whether it existed.
    pub async fn delete(&self, recurring_id: &str) -> SchedulerResult<bool> {
        let result = sqlx::query("DELETE FROM recurring_jobs WHERE id = $1")
            .bind(recurring_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, recurring_id: &str) -> SchedulerResult<Option<RecurringJob>> {
        let row = sqlx::query_as::<_, RecurringJob>(&format!(
            "SELECT {SELECT_COLUMNS} FROM recurring_jobs WHERE id = $1"
        ))
        .bind(recurring_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self) -> SchedulerResult<Vec<RecurringJob>> {
        let rows = sqlx::query_as::<_, RecurringJob>(&format!(
            "SELECT {SELECT_COLUMNS} FROM recurring_jobs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Enabled recurring jobs due at or before `now`.
    pub async fn due(&self, now: DateTime<Utc>) -> SchedulerResult<Vec<RecurringJob>> {
        let rows = sqlx::query_as::<_, RecurringJob>(&format!(
            "SELECT {SELECT_COLUMNS} FROM recurring_jobs \
             WHERE enabled = TRUE AND next_run_at IS NOT NULL AND next_run_at <= $1 \
             ORDER BY next_run_at"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Advance a recurring job past an enqueue.
    pub async fn mark_enqueued(
        &self,
        recurring_id: &str,
        next_run: Option<DateTime<Utc>>,
    ) -> SchedulerResult<()> {
        sqlx::query(
            "UPDATE recurring_jobs SET last_enqueued_at = NOW(), next_run_at = $2 WHERE id = $1",
        )
        .bind(recurring_id)
        .bind(next_run)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Ticks the recurring store and enqueues due jobs.
pub struct RecurringScheduler {
    recurring: RecurringStore,
    jobs: JobStore,
    tick_interval: Duration,
    max_attempts: i32,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl RecurringScheduler {
    pub fn new(
        recurring: RecurringStore,
        jobs: JobStore,
        tick_interval: Duration,
        max_attempts: i32,
    ) -> Self {
        Self {
            recurring,
            jobs,
            tick_interval,
            max_attempts,
            shutdown: None,
            handle: None,
        }
    }

    /// Start the tick loop.
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.handle.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(tick_secs = self.tick_interval.as_secs(), "starting recurring scheduler");

        let (tx, mut rx) = watch::channel(false);
        let recurring = self.recurring.clone();
        let jobs = self.jobs.clone();
        let tick_interval = self.tick_interval;
        let max_attempts = self.max_attempts;

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = rx.changed() => {
                        info!("recurring scheduler stopping");
                        break;
                    }
                    _ = tokio::time::sleep(tick_interval) => {
                        if let Err(e) = tick(&recurring, &jobs, Utc::now(), max_attempts).await {
                            error!(error = %e, "recurring tick failed");
                        }
                    }
                }
            }
        });

        self.shutdown = Some(tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop the loop; an in-flight tick completes.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let tx = self.shutdown.take().ok_or(SchedulerError::NotRunning)?;
        let _ = tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Fire one execution of a recurring job now, without touching its
    /// schedule.
    pub async fn trigger(&self, recurring_id: &str) -> SchedulerResult<JobId> {
        let row = self
            .recurring
            .get(recurring_id)
            .await?
            .ok_or_else(|| SchedulerError::RecurringNotFound(recurring_id.to_string()))?;

        let job = Job::new(row.queue, row.job_type, row.payload)
            .with_max_attempts(self.max_attempts)
            .with_delete_on_dead(row.delete_on_dead);
        self.jobs.enqueue(&job).await
    }

    /// Run one tick immediately. Returns the number of jobs enqueued.
    pub async fn run_once(&self, now: DateTime<Utc>) -> SchedulerResult<usize> {
        tick(&self.recurring, &self.jobs, now, self.max_attempts).await
    }
}

async fn tick(
    recurring: &RecurringStore,
    jobs: &JobStore,
    now: DateTime<Utc>,
    max_attempts: i32,
) -> SchedulerResult<usize> {
    let due = recurring.due(now).await?;
    let mut enqueued = 0;

    for row in due {
        let next_run = CronExpression::parse(&row.cron_expr)?.next_after(now);
        let job = Job::new(row.queue.clone(), row.job_type.clone(), row.payload.clone())
            .with_max_attempts(max_attempts)
            .with_delete_on_dead(row.delete_on_dead);

        jobs.enqueue(&job).await?;
        recurring.mark_enqueued(&row.id, next_run).await?;
        enqueued += 1;
        debug!(recurring_id = %row.id, job_id = %job.id, "recurring job enqueued");
    }

    Ok(enqueued)
}
