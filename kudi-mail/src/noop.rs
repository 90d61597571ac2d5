//! No-op mailer for tests and local runs.

use crate::error::MailResult;
use crate::service::EmailService;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Logs instead of sending. Counts sends so tests can assert on them.
#[derive(Debug, Default)]
pub struct NoopEmailService {
    sent: AtomicUsize,
}

impl NoopEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages "sent".
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for NoopEmailService {
    async fn send_statement_notification(
        &self,
        email: &str,
        full_name: &str,
        statement_date: NaiveDate,
        artifact: &[u8],
    ) -> MailResult<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!(
            to = email,
            name = full_name,
            date = %statement_date,
            bytes = artifact.len(),
            "statement notification (noop)"
        );
        Ok(())
    }

    async fn send_job_failure_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!(subject, message, details, "job failure alert (noop)");
        Ok(())
    }

    async fn send_critical_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!(subject, message, details, "critical alert (noop)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_counts_sends() {
        let mailer = NoopEmailService::new();
        assert_eq!(mailer.sent_count(), 0);

        mailer
            .send_statement_notification(
                "ada@kudi.example",
                "Ada Lovelace",
                NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                b"statement",
            )
            .await
            .unwrap();
        mailer
            .send_job_failure_alert("job failed", "monthly interest", "boom")
            .await
            .unwrap();

        assert_eq!(mailer.sent_count(), 2);
    }
}
