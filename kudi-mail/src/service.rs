//! The outbound email interface.

use crate::error::MailResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Emails the core sends. Implementations deliver asynchronously; callers
/// log failures and do not retry.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send a customer their account statement.
    async fn send_statement_notification(
        &self,
        email: &str,
        full_name: &str,
        statement_date: NaiveDate,
        artifact: &[u8],
    ) -> MailResult<()>;

    /// Alert operations that a scheduled job failed.
    async fn send_job_failure_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()>;

    /// Page operations about a critical condition.
    async fn send_critical_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()>;
}
