//! Read surface for the scheduler dashboard.

use crate::error::SchedulerResult;
use crate::job::{Job, JobState};
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Job counts by state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub scheduled: i64,
    pub enqueued: i64,
    pub processing: i64,
    pub succeeded: i64,
    pub retrying: i64,
    pub failed: i64,
    pub dead: i64,
}

impl JobCounts {
    /// Fold grouped rows into the fixed shape.
    pub fn from_rows(rows: &[(JobState, i64)]) -> Self {
        let mut counts = Self::default();
        for (state, count) in rows {
            match state {
                JobState::Scheduled => counts.scheduled = *count,
                JobState::Enqueued => counts.enqueued = *count,
                JobState::Processing => counts.processing = *count,
                JobState::Succeeded => counts.succeeded = *count,
                JobState::Retrying => counts.retrying = *count,
                JobState::Failed => counts.failed = *count,
                JobState::Dead => counts.dead = *count,
            }
        }
        counts
    }
}

/// A worker-pool server row, used for liveness.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServerRecord {
    pub id: Uuid,
    pub hostname: String,
    pub worker_count: i32,
    pub queues: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub heartbeat_at: DateTime<Utc>,
}

impl ServerRecord {
    /// A server is alive when its heartbeat is fresher than the threshold.
    pub fn is_alive(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        now - self.heartbeat_at <= threshold
    }
}

/// Monitoring queries over the scheduler tables.
#[derive(Clone)]
pub struct Dashboard {
    jobs: JobStore,
    pool: PgPool,
}

impl Dashboard {
    pub fn new(pool: PgPool) -> Self {
        Self {
            jobs: JobStore::new(pool.clone()),
            pool,
        }
    }

    /// Current job counts by state.
    pub async fn counts(&self) -> SchedulerResult<JobCounts> {
        let rows = self.jobs.counts_by_state().await?;
        Ok(JobCounts::from_rows(&rows))
    }

    /// Recently finished jobs, newest first.
    pub async fn history(&self, limit: i64) -> SchedulerResult<Vec<Job>> {
        self.jobs.history(limit).await
    }

    /// Registered worker-pool servers with their last heartbeat.
    pub async fn servers(&self) -> SchedulerResult<Vec<ServerRecord>> {
        let rows = sqlx::query_as::<_, ServerRecord>(
            "SELECT id, hostname, worker_count, queues, started_at, heartbeat_at \
             FROM scheduler_servers ORDER BY started_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_fold() {
        let rows = vec![
            (JobState::Enqueued, 4),
            (JobState::Succeeded, 120),
            (JobState::Dead, 2),
        ];
        let counts = JobCounts::from_rows(&rows);

        assert_eq!(counts.enqueued, 4);
        assert_eq!(counts.succeeded, 120);
        assert_eq!(counts.dead, 2);
        assert_eq!(counts.processing, 0);
    }

    #[test]
    fn test_server_liveness() {
        let server = ServerRecord {
            id: Uuid::new_v4(),
            hostname: "worker-1".into(),
            worker_count: 5,
            queues: vec!["default".into()],
            started_at: Utc::now() - chrono::Duration::hours(1),
            heartbeat_at: Utc::now() - chrono::Duration::seconds(10),
        };

        assert!(server.is_alive(Utc::now(), chrono::Duration::seconds(90)));
        assert!(!server.is_alive(
            Utc::now() + chrono::Duration::minutes(10),
            chrono::Duration::seconds(90)
        ));
    }
}
