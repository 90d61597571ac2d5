//! Wiring: job handlers into the worker pool, recurring rows at boot.

use crate::job_types;
use crate::{InterestJob, MaintenanceJob, StatementJob};
use chrono::{Days, NaiveDate, Utc};
use kudi_config::{
    SchedulerSettings, RECURRING_ACCOUNT_CLEANUP, RECURRING_DAILY_STATEMENTS,
    RECURRING_MONTHLY_INTEREST,
};
use kudi_scheduler::{queues, Job, RecurringSpec, RecurringStore, SchedulerError, SchedulerResult, WorkerPool};
use std::sync::Arc;
use tracing::info;

/// Shared job dependencies handed to the worker registrations.
#[derive(Clone)]
pub struct JobContext {
    pub statements: Arc<StatementJob>,
    pub interest: Arc<InterestJob>,
    pub maintenance: Arc<MaintenanceJob>,
}

/// Pull an ISO date out of the payload, defaulting to today (UTC) for
/// triggered runs and to yesterday for the nightly statement run.
fn payload_date(job: &Job, key: &str, default: NaiveDate) -> SchedulerResult<NaiveDate> {
    match job.payload.get(key) {
        None => Ok(default),
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| SchedulerError::ExecutionFailed(format!("{key} must be a string")))?;
            text.parse()
                .map_err(|e| SchedulerError::ExecutionFailed(format!("invalid {key}: {e}")))
        }
    }
}

/// Register the three job handlers on a worker pool.
pub fn register_job_handlers(workers: &mut WorkerPool, context: JobContext) {
    let statements = context.statements.clone();
    workers.register_handler(job_types::DAILY_STATEMENTS, move |job| {
        let statements = statements.clone();
        async move {
            let yesterday = Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .unwrap_or_else(|| Utc::now().date_naive());
            let date = payload_date(&job, "statement_date", yesterday)?;
            statements
                .run(date)
                .await
                .map_err(|e| SchedulerError::ExecutionFailed(e.to_string()))?;
            Ok(())
        }
    });

    let interest = context.interest.clone();
    workers.register_handler(job_types::MONTHLY_INTEREST, move |job| {
        let interest = interest.clone();
        async move {
            let date = payload_date(&job, "calculation_date", Utc::now().date_naive())?;
            interest
                .run(date)
                .await
                .map_err(|e| SchedulerError::ExecutionFailed(e.to_string()))?;
            Ok(())
        }
    });

    let maintenance = context.maintenance.clone();
    workers.register_handler(job_types::ACCOUNT_CLEANUP, move |_job| {
        let maintenance = maintenance.clone();
        async move {
            maintenance
                .run(Utc::now())
                .await
                .map_err(|e| SchedulerError::ExecutionFailed(e.to_string()))?;
            Ok(())
        }
    });
}

/// Write the recurring-job rows. Idempotent: re-running at every boot
/// updates schedules in place.
pub async fn register_recurring_jobs(
    recurring: &RecurringStore,
    settings: &SchedulerSettings,
) -> SchedulerResult<()> {
    let specs = [
        RecurringSpec {
            id: RECURRING_DAILY_STATEMENTS.to_string(),
            job_type: job_types::DAILY_STATEMENTS.to_string(),
            payload: serde_json::json!({}),
            cron_expr: settings
                .cron_for(RECURRING_DAILY_STATEMENTS)
                .unwrap_or("0 2 * * *")
                .to_string(),
            queue: queues::DEFAULT.to_string(),
            // Statement runs are re-generated nightly; a dead run has no
            // value the next morning.
            delete_on_dead: true,
        },
        RecurringSpec {
            id: RECURRING_MONTHLY_INTEREST.to_string(),
            job_type: job_types::MONTHLY_INTEREST.to_string(),
            payload: serde_json::json!({}),
            cron_expr: settings
                .cron_for(RECURRING_MONTHLY_INTEREST)
                .unwrap_or("0 1 1 * *")
                .to_string(),
            queue: queues::CRITICAL.to_string(),
            delete_on_dead: false,
        },
        RecurringSpec {
            id: RECURRING_ACCOUNT_CLEANUP.to_string(),
            job_type: job_types::ACCOUNT_CLEANUP.to_string(),
            payload: serde_json::json!({}),
            cron_expr: settings
                .cron_for(RECURRING_ACCOUNT_CLEANUP)
                .unwrap_or("0 0 * * 0")
                .to_string(),
            queue: queues::LOW.to_string(),
            delete_on_dead: false,
        },
    ];

    for spec in &specs {
        recurring.schedule(spec).await?;
    }
    info!(count = specs.len(), "recurring jobs registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_date_defaults() {
        let job = Job::new(queues::DEFAULT, job_types::DAILY_STATEMENTS, serde_json::json!({}));
        let fallback = NaiveDate::from_ymd_opt(2026, 7, 31).unwrap();
        assert_eq!(payload_date(&job, "statement_date", fallback).unwrap(), fallback);
    }

    #[test]
    fn test_payload_date_parses_iso() {
        let job = Job::new(
            queues::DEFAULT,
            job_types::DAILY_STATEMENTS,
            serde_json::json!({ "statement_date": "2026-08-01" }),
        );
        let fallback = NaiveDate::from_ymd_opt(2026, 7, 31).unwrap();
        assert_eq!(
            payload_date(&job, "statement_date", fallback).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
        );
    }

    #[test]
    fn test_payload_date_rejects_non_string() {
        let job = Job::new(
            queues::DEFAULT,
            job_types::MONTHLY_INTEREST,
            serde_json::json!({ "calculation_date": 20260801 }),
        );
        let fallback = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(payload_date(&job, "calculation_date", fallback).is_err());
    }
}
