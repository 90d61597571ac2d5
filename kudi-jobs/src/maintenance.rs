//! Account maintenance: dormancy rules and archival reporting.

use chrono::{DateTime, Duration, Utc};
use kudi_domain::BankError;
use kudi_persistence::{AccountRepository, TransactionRepository};
use tracing::info;

/// Outcome of one maintenance run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Accounts moved to Inactive by the dormancy rules.
    pub status_updates: usize,

    /// Accounts archived.
    pub archived: usize,

    /// Transactions older than the archival cutoff (reported, not moved).
    pub stale_transactions: i64,
}

/// Applies dormancy rules to idle accounts and reports stale transactions.
pub struct MaintenanceJob {
    accounts: AccountRepository,
    transactions: TransactionRepository,
}

impl MaintenanceJob {
    /// Idle horizon before an account is examined at all.
    const IDLE_YEARS: i64 = 2;

    /// Idle horizon after which an empty account is archived.
    const ARCHIVE_YEARS: i64 = 3;

    /// Transactions older than this are candidates for archival.
    const TRANSACTION_ARCHIVE_YEARS: i64 = 7;

    pub fn new(accounts: AccountRepository, transactions: TransactionRepository) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    /// Run both maintenance passes.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<MaintenanceReport, BankError> {
        let mut report = MaintenanceReport::default();

        // Pass 1: dormancy and archival on idle accounts.
        let idle_cutoff = now - Duration::days(365 * Self::IDLE_YEARS);
        let archive_cutoff = now - Duration::days(365 * Self::ARCHIVE_YEARS);
        let mut idle_accounts = self.accounts.list_idle_since(idle_cutoff).await?;

        for account in idle_accounts.iter_mut() {
            if account.update_status_based_on_rules(now) {
                report.status_updates += 1;
            }
            if account.balance().is_zero() && account.last_activity_at() < archive_cutoff {
                account.mark_archived();
                report.archived += 1;
            }
        }
        if !idle_accounts.is_empty() {
            self.accounts.update_all(&mut idle_accounts).await?;
        }

        // Pass 2: enumerate transactions past the archival cutoff. Moving
        // them to cold storage happens elsewhere; this run only reports.
        let transaction_cutoff = now - Duration::days(365 * Self::TRANSACTION_ARCHIVE_YEARS);
        report.stale_transactions = self.transactions.count_older_than(transaction_cutoff).await?;

        info!(
            status_updates = report.status_updates,
            archived = report.archived,
            stale_transactions = report.stale_transactions,
            "maintenance run finished"
        );
        Ok(report)
    }
}
