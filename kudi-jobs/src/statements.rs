//! Daily statement generation.

use crate::renderer::StatementRenderer;
use crate::report::JobReport;
use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::future::join_all;
use kudi_domain::{Account, BankError};
use kudi_mail::EmailService;
use kudi_persistence::{AccountRepository, CustomerRepository, TransactionRepository};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Renders and emails statements for every active account.
///
/// Accounts run in batches; inside a batch they run concurrently, and one
/// account's failure never stops the others.
pub struct StatementJob {
    accounts: AccountRepository,
    customers: CustomerRepository,
    transactions: TransactionRepository,
    renderer: Arc<dyn StatementRenderer>,
    mailer: Arc<dyn EmailService>,
}

impl StatementJob {
    /// Accounts processed concurrently per batch.
    pub const BATCH_SIZE: usize = 100;

    /// Days of history included in a statement.
    pub const STATEMENT_DAYS: u64 = 30;

    pub fn new(
        accounts: AccountRepository,
        customers: CustomerRepository,
        transactions: TransactionRepository,
        renderer: Arc<dyn StatementRenderer>,
        mailer: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            accounts,
            customers,
            transactions,
            renderer,
            mailer,
        }
    }

    /// Generate statements dated `statement_date`.
    pub async fn run(&self, statement_date: NaiveDate) -> Result<JobReport, BankError> {
        let started = Instant::now();
        let accounts = self.accounts.list_active().await?;
        info!(accounts = accounts.len(), date = %statement_date, "statement run starting");

        let mut processed = 0usize;
        let mut failed = 0usize;

        for batch in accounts.chunks(Self::BATCH_SIZE) {
            let outcomes = join_all(
                batch
                    .iter()
                    .map(|account| self.process_account(account, statement_date)),
            )
            .await;

            for (account, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(_) => processed += 1,
                    Err(e) => {
                        failed += 1;
                        warn!(
                            account = %account.account_number(),
                            error = %e,
                            "statement generation failed for account"
                        );
                    }
                }
            }
        }

        let report = JobReport::new(processed, failed, started.elapsed());
        info!(
            processed = report.processed,
            failed = report.failed,
            elapsed_ms = report.duration.as_millis() as u64,
            "statement run finished"
        );
        Ok(report)
    }

    /// Render one account's statement and email it when the owner opted in.
    /// Returns whether an email went out.
    async fn process_account(
        &self,
        account: &Account,
        statement_date: NaiveDate,
    ) -> Result<bool, BankError> {
        let start_date = statement_date
            .checked_sub_days(Days::new(Self::STATEMENT_DAYS))
            .ok_or_else(|| BankError::Internal("statement window underflow".into()))?;
        let start = Utc.from_utc_datetime(&start_date.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(
            &statement_date
                .and_hms_opt(23, 59, 59)
                .unwrap_or_else(|| statement_date.and_time(NaiveTime::MIN)),
        );

        let transactions = self
            .transactions
            .find_for_account_between(account.id(), start, end)
            .await?;

        let owner = self
            .customers
            .find(account.customer_id())
            .await?
            .ok_or_else(|| BankError::not_found("customer", account.customer_id()))?;

        let artifact = self
            .renderer
            .render(account, &owner, &transactions, start_date, statement_date);

        if !owner.email_opt_in() {
            return Ok(false);
        }

        self.mailer
            .send_statement_notification(owner.email(), &owner.full_name(), statement_date, &artifact)
            .await
            .map_err(|e| BankError::Internal(format!("statement email failed: {e}")))?;
        Ok(true)
    }
}
