//! Job definition and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job unique identifier.
pub type JobId = Uuid;

/// Job payload.
pub type JobData = serde_json::Value;

/// The named queue lanes workers pull from, in claim-priority order.
pub mod queues {
    pub const CRITICAL: &str = "critical";
    pub const DEFAULT: &str = "default";
    pub const LOW: &str = "low";

    /// Every lane, highest priority first.
    pub const ALL: [&str; 3] = [CRITICAL, DEFAULT, LOW];
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Waiting for its scheduled time
    Scheduled,
    /// Ready to be claimed by a worker
    Enqueued,
    /// Claimed and running
    Processing,
    /// Finished successfully
    Succeeded,
    /// Failed, waiting for its retry slot
    Retrying,
    /// Failed, disposition not yet decided
    Failed,
    /// Failed permanently (attempts exhausted)
    Dead,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Retrying => "retrying",
            Self::Failed => "failed",
            Self::Dead => "dead",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "enqueued" => Some(Self::Enqueued),
            "processing" => Some(Self::Processing),
            "succeeded" => Some(Self::Succeeded),
            "retrying" => Some(Self::Retrying),
            "failed" => Some(Self::Failed),
            "dead" => Some(Self::Dead),
            _ => None,
        }
    }
}

/// A unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier
    pub id: JobId,

    /// Queue lane
    pub queue: String,

    /// Handler key
    pub job_type: String,

    /// Handler payload
    pub payload: JobData,

    /// Current state
    pub state: JobState,

    /// Attempts so far
    pub attempts: i32,

    /// Attempts allowed before the job goes dead
    pub max_attempts: i32,

    /// Delete the row instead of keeping it when the job goes dead
    pub delete_on_dead: bool,

    /// Last execution error
    pub last_error: Option<String>,

    /// When the job entered the queue
    pub enqueued_at: DateTime<Utc>,

    /// Earliest execution time for delayed or retrying jobs
    pub scheduled_at: Option<DateTime<Utc>>,

    /// When the current (or last) attempt started
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,

    /// Claim expiry; a processing job past this point is reclaimed
    pub visible_until: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a job ready for immediate execution.
    pub fn new(queue: impl Into<String>, job_type: impl Into<String>, payload: JobData) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: queue.into(),
            job_type: job_type.into(),
            payload,
            state: JobState::Enqueued,
            attempts: 0,
            max_attempts: 3,
            delete_on_dead: false,
            last_error: None,
            enqueued_at: Utc::now(),
            scheduled_at: None,
            started_at: None,
            finished_at: None,
            visible_until: None,
        }
    }

    /// Set the retry bound.
    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Drop the row instead of parking it when attempts are exhausted.
    pub fn with_delete_on_dead(mut self, delete_on_dead: bool) -> Self {
        self.delete_on_dead = delete_on_dead;
        self
    }

    /// Delay execution until a point in time.
    pub fn schedule_at(mut self, time: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(time);
        self.state = JobState::Scheduled;
        self
    }

    /// Delay execution by a duration.
    pub fn schedule_after(mut self, delay: chrono::Duration) -> Self {
        self.schedule_at(Utc::now() + delay)
    }

    /// Whether the job may run now.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_at {
            Some(at) => now >= at,
            None => true,
        }
    }

    /// Whether another attempt is allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Exponential backoff for the next retry, capped at an hour.
    pub fn backoff_delay(&self) -> chrono::Duration {
        let seconds = 2_i64.pow(self.attempts.max(1) as u32 - 1);
        chrono::Duration::seconds(seconds.min(3600))
    }

    /// Decide the post-failure disposition: retrying with a backoff slot,
    /// or dead.
    pub fn fail(&mut self, error: &str, now: DateTime<Utc>) {
        self.last_error = Some(error.to_string());
        if self.can_retry() {
            self.state = JobState::Retrying;
            self.scheduled_at = Some(now + self.backoff_delay());
        } else {
            self.state = JobState::Dead;
            self.finished_at = Some(now);
        }
        self.visible_until = None;
    }

    /// Mark the job finished successfully.
    pub fn succeed(&mut self, now: DateTime<Utc>) {
        self.state = JobState::Succeeded;
        self.finished_at = Some(now);
        self.visible_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_enqueued() {
        let job = Job::new(queues::DEFAULT, "daily_statements", serde_json::json!({}));
        assert_eq!(job.state, JobState::Enqueued);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.max_attempts, 3);
        assert!(!job.delete_on_dead);
        assert!(job.is_ready(Utc::now()));
    }

    #[test]
    fn test_scheduled_job_is_not_ready_until_due() {
        let job = Job::new(queues::LOW, "cleanup", serde_json::json!({}))
            .schedule_after(chrono::Duration::hours(1));

        assert_eq!(job.state, JobState::Scheduled);
        assert!(!job.is_ready(Utc::now()));
        assert!(job.is_ready(Utc::now() + chrono::Duration::hours(2)));
    }

    #[test]
    fn test_failure_walks_retry_then_dead() {
        let mut job = Job::new(queues::DEFAULT, "task", serde_json::json!({}));
        let now = Utc::now();

        job.attempts = 1;
        job.fail("first error", now);
        assert_eq!(job.state, JobState::Retrying);
        assert!(job.scheduled_at.is_some());

        job.attempts = 2;
        job.fail("second error", now);
        assert_eq!(job.state, JobState::Retrying);

        job.attempts = 3;
        job.fail("third error", now);
        assert_eq!(job.state, JobState::Dead);
        assert!(job.finished_at.is_some());
        assert_eq!(job.last_error.as_deref(), Some("third error"));
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let mut job = Job::new(queues::DEFAULT, "task", serde_json::json!({}));

        job.attempts = 1;
        assert_eq!(job.backoff_delay(), chrono::Duration::seconds(1));
        job.attempts = 2;
        assert_eq!(job.backoff_delay(), chrono::Duration::seconds(2));
        job.attempts = 3;
        assert_eq!(job.backoff_delay(), chrono::Duration::seconds(4));
        job.attempts = 20;
        assert_eq!(job.backoff_delay(), chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_succeed_clears_claim() {
        let mut job = Job::new(queues::CRITICAL, "interest", serde_json::json!({}));
        job.visible_until = Some(Utc::now());
        job.succeed(Utc::now());

        assert_eq!(job.state, JobState::Succeeded);
        assert!(job.visible_until.is_none());
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            JobState::Scheduled,
            JobState::Enqueued,
            JobState::Processing,
            JobState::Succeeded,
            JobState::Retrying,
            JobState::Failed,
            JobState::Dead,
        ] {
            assert_eq!(JobState::parse(state.as_str()), Some(state));
        }
        assert_eq!(JobState::parse("unknown"), None);
    }

    #[test]
    fn test_lane_order() {
        assert_eq!(queues::ALL, ["critical", "default", "low"]);
    }
}
