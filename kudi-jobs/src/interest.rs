//! Monthly interest calculation.

use crate::report::JobReport;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use kudi_domain::{Account, AccountType, BankError, Money};
use kudi_mail::EmailService;
use kudi_persistence::{AccountRepository, TransactionRepository, UnitOfWork};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Credits monthly interest to interest-bearing active accounts.
///
/// The rate is annual and tiered by account type and average daily
/// balance; the credit is `principal x rate x days / 365` over the
/// calendar month containing the calculation date. All credits flush in
/// one transaction.
pub struct InterestJob {
    accounts: AccountRepository,
    transactions: TransactionRepository,
    mailer: Arc<dyn EmailService>,
    pool: PgPool,
}

impl InterestJob {
    pub fn new(
        accounts: AccountRepository,
        transactions: TransactionRepository,
        mailer: Arc<dyn EmailService>,
        pool: PgPool,
    ) -> Self {
        Self {
            accounts,
            transactions,
            mailer,
            pool,
        }
    }

    /// Annual rate for an account type at a given average balance (major
    /// units).
    pub fn annual_rate(account_type: AccountType, average_balance: Decimal) -> Decimal {
        match account_type {
            AccountType::Savings => {
                if average_balance >= Decimal::from(10_000) {
                    Decimal::new(15, 3) // 1.5%
                } else {
                    Decimal::new(10, 3) // 1.0%
                }
            }
            AccountType::Checking => Decimal::new(1, 3), // 0.1%
            AccountType::FixedDeposit => Decimal::new(35, 3), // 3.5%
        }
    }

    /// Interest for one month: `principal x rate x days / 365`.
    pub fn interest_for(
        average_balance: Decimal,
        annual_rate: Decimal,
        days_in_month: u32,
    ) -> Decimal {
        average_balance * annual_rate * Decimal::from(days_in_month) / Decimal::from(365)
    }

    /// Credit interest for the calendar month containing `calculation_date`.
    pub async fn run(&self, calculation_date: NaiveDate) -> Result<JobReport, BankError> {
        let started = Instant::now();
        let (month_start, month_end, days_in_month) = month_window(calculation_date)?;

        let accounts = self.accounts.list_interest_bearing().await?;
        info!(
            accounts = accounts.len(),
            month = %month_start.format("%Y-%m"),
            "interest run starting"
        );

        let mut credited: Vec<Account> = Vec::new();
        let mut failed = 0usize;

        for mut account in accounts {
            match self
                .credit_account(&mut account, month_start, month_end, days_in_month)
                .await
            {
                Ok(true) => credited.push(account),
                Ok(false) => {}
                Err(e) => {
                    failed += 1;
                    warn!(
                        account = %account.account_number(),
                        error = %e,
                        "interest calculation failed for account"
                    );
                }
            }
        }

        let processed = credited.len();
        if !credited.is_empty() {
            let mut uow = UnitOfWork::new(self.pool.clone());
            for account in credited {
                uow.track_account(account);
            }
            if let Err(e) = uow.commit().await {
                let _ = self
                    .mailer
                    .send_job_failure_alert(
                        "Monthly interest calculation failed",
                        "The interest credit transaction could not be committed.",
                        &e.to_string(),
                    )
                    .await;
                return Err(e);
            }
        }

        let report = JobReport::new(processed, failed, started.elapsed());
        info!(
            processed = report.processed,
            failed = report.failed,
            elapsed_ms = report.duration.as_millis() as u64,
            "interest run finished"
        );
        Ok(report)
    }

    /// Compute and post one account's credit in memory. Returns whether a
    /// credit was posted.
    async fn credit_account(
        &self,
        account: &mut Account,
        month_start: NaiveDate,
        month_end: NaiveDate,
        days_in_month: u32,
    ) -> Result<bool, BankError> {
        let start = Utc.from_utc_datetime(&month_start.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&month_end.and_time(NaiveTime::MIN));

        let average_balance = self
            .transactions
            .average_daily_balance(account.id(), start, end)
            .await?;
        if average_balance <= Decimal::ZERO {
            return Ok(false);
        }

        let rate = Self::annual_rate(account.account_type(), average_balance);
        let interest = Self::interest_for(average_balance, rate, days_in_month);
        let amount = Money::from_decimal(interest, account.balance().currency);
        if !amount.is_positive() {
            return Ok(false);
        }

        account.post_interest(amount, end, "Monthly interest")?;
        Ok(true)
    }
}

/// First day, last day, and day count of the calendar month containing
/// `date`.
fn month_window(date: NaiveDate) -> Result<(NaiveDate, NaiveDate, u32), BankError> {
    let first = date
        .with_day(1)
        .ok_or_else(|| BankError::Internal("invalid calculation date".into()))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .ok_or_else(|| BankError::Internal("month window overflow".into()))?;
    Ok((first, last, last.day()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str_exact(value).unwrap()
    }

    #[test]
    fn test_month_window() {
        let (first, last, days) =
            month_window(NaiveDate::from_ymd_opt(2026, 11, 15).unwrap()).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 11, 30).unwrap());
        assert_eq!(days, 30);

        let (_, last, days) =
            month_window(NaiveDate::from_ymd_opt(2028, 2, 3).unwrap()).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
        assert_eq!(days, 29);
    }

    #[test]
    fn test_rate_tiers() {
        assert_eq!(
            InterestJob::annual_rate(AccountType::Savings, dec("12000")),
            dec("0.015")
        );
        assert_eq!(
            InterestJob::annual_rate(AccountType::Savings, dec("9999.99")),
            dec("0.010")
        );
        assert_eq!(
            InterestJob::annual_rate(AccountType::Savings, dec("10000")),
            dec("0.015")
        );
        assert_eq!(
            InterestJob::annual_rate(AccountType::Checking, dec("50000")),
            dec("0.001")
        );
        assert_eq!(
            InterestJob::annual_rate(AccountType::FixedDeposit, dec("100")),
            dec("0.035")
        );
    }

    #[test]
    fn test_interest_formula() {
        // 12,000 at 1.5% over a 30-day month: 12000 * 0.015 * 30 / 365.
        let interest = InterestJob::interest_for(dec("12000"), dec("0.015"), 30);
        let rounded = interest.round_dp(4);
        assert_eq!(rounded, dec("14.7945"));
    }

    #[test]
    fn test_interest_rounds_to_minor_units() {
        let interest = InterestJob::interest_for(dec("12000"), dec("0.015"), 30);
        let money = Money::from_decimal(interest, kudi_domain::Currency::NGN);
        assert_eq!(money.amount, 1_479);
    }
}
