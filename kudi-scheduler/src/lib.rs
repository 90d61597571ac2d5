//! Database-backed scheduled-job runtime for Kudi.
//!
//! Jobs live in the same Postgres database as the rest of the service:
//! workers claim them with `FOR UPDATE SKIP LOCKED` and an invisibility
//! timeout, retry failures with exponential backoff up to a per-job bound,
//! and park exhausted jobs in a dead state for operator attention.
//! Recurring jobs are five-field cron rows upserted idempotently at boot;
//! a scheduler loop enqueues them when due. The dashboard module is the
//! read surface: counts by state, history, and server liveness.

pub mod dashboard;
pub mod error;
pub mod expression;
pub mod job;
pub mod recurring;
pub mod store;
pub mod worker;

pub use dashboard::{Dashboard, JobCounts, ServerRecord};
pub use error::{SchedulerError, SchedulerResult};
pub use expression::CronExpression;
pub use job::{queues, Job, JobData, JobId, JobState};
pub use recurring::{RecurringJob, RecurringScheduler, RecurringSpec, RecurringStore};
pub use store::JobStore;
pub use worker::{JobHandler, WorkerPool, WorkerPoolConfig};
