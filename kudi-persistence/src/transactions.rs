//! Transaction repository.

use crate::db_err;
use chrono::{DateTime, Days, NaiveDate, Utc};
use kudi_domain::{
    AccountId, BankError, Currency, Money, Transaction, TransactionId, TransactionType,
};
use rust_decimal::Decimal;
use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    transaction_type: String,
    amount_amount: i64,
    amount_currency: String,
    description: String,
    timestamp: DateTime<Utc>,
    reference: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl TransactionRow {
    fn into_domain(self) -> Result<Transaction, BankError> {
        let transaction_type = TransactionType::parse(&self.transaction_type).ok_or_else(|| {
            BankError::Internal(format!("unknown transaction type {}", self.transaction_type))
        })?;
        let currency = Currency::from_code(&self.amount_currency)
            .ok_or_else(|| BankError::Internal(format!("unknown currency {}", self.amount_currency)))?;

        Ok(Transaction::rehydrate(
            TransactionId::from_uuid(self.id),
            AccountId::from_uuid(self.account_id),
            transaction_type,
            Money::new(self.amount_amount, currency),
            self.description,
            self.timestamp,
            self.reference,
            self.is_deleted,
            self.deleted_at,
            self.deleted_by,
        ))
    }
}

const SELECT_COLUMNS: &str = "id, account_id, transaction_type, amount_amount, amount_currency, \
     description, timestamp, reference, is_deleted, deleted_at, deleted_by";

/// Typed reads and writes over the `transactions` table.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, BankError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TransactionRow::into_domain).transpose()
    }

    pub async fn find_for_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, BankError> {
        load_for_account(&self.pool, account_id).await
    }

    /// Transactions for an account inside an inclusive window, oldest first.
    pub async fn find_for_account_between(
        &self,
        account_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, BankError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE account_id = $1 AND timestamp >= $2 AND timestamp <= $3 AND is_deleted = FALSE \
             ORDER BY timestamp ASC"
        ))
        .bind(account_id.as_uuid())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    /// All transactions older than the cutoff.
    pub async fn find_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Transaction>, BankError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE timestamp < $1 AND is_deleted = FALSE ORDER BY timestamp ASC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    pub async fn count_older_than(&self, cutoff: DateTime<Utc>) -> Result<i64, BankError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions WHERE timestamp < $1 AND is_deleted = FALSE",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.0)
    }

    /// An account's transactions since a point in time, oldest first.
    pub async fn find_recent_since(
        &self,
        account_id: AccountId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, BankError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE account_id = $1 AND timestamp >= $2 AND is_deleted = FALSE \
             ORDER BY timestamp ASC"
        ))
        .bind(account_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    /// All transactions across accounts inside an inclusive window.
    pub async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, BankError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE timestamp >= $1 AND timestamp <= $2 AND is_deleted = FALSE \
             ORDER BY timestamp ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    pub async fn add(&self, transaction: &Transaction) -> Result<(), BankError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        insert_transaction(&mut conn, transaction).await
    }

    /// Insert a set of transactions in one database transaction.
    pub async fn add_range(&self, transactions: &[Transaction]) -> Result<(), BankError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for transaction in transactions {
            insert_transaction(&mut *tx, transaction).await?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Average end-of-day balance over `[start, end]`, both truncated to
    /// midnight UTC, in major units.
    ///
    /// The walk is seeded with the balance as of the day before `start`
    /// (the net of all earlier transactions), then visits each day exactly
    /// once, applying that day's signed entries and accumulating the
    /// end-of-day balance. No transactions at all yields zero.
    pub async fn average_daily_balance(
        &self,
        account_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, BankError> {
        if end < start {
            return Err(BankError::validation(
                "period",
                "end date must not precede start date",
            ));
        }

        let start_day = start.date_naive();
        let end_day = end.date_naive();
        let days = (end_day - start_day).num_days() + 1;

        #[derive(sqlx::FromRow)]
        struct EntryRow {
            transaction_type: String,
            amount_amount: i64,
            amount_currency: String,
            timestamp: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT transaction_type, amount_amount, amount_currency, timestamp \
             FROM transactions \
             WHERE account_id = $1 AND timestamp < $2 AND is_deleted = FALSE \
             ORDER BY timestamp ASC",
        )
        .bind(account_id.as_uuid())
        .bind(end_of_day(end_day))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        if rows.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let mut decimals = 2u32;
        let mut opening: i64 = 0;
        let mut by_day: HashMap<NaiveDate, i64> = HashMap::new();
        for row in &rows {
            let transaction_type = TransactionType::parse(&row.transaction_type).ok_or_else(|| {
                BankError::Internal(format!("unknown transaction type {}", row.transaction_type))
            })?;
            if let Some(currency) = Currency::from_code(&row.amount_currency) {
                decimals = currency.decimals();
            }
            let signed = transaction_type.direction() * row.amount_amount;
            let day = row.timestamp.date_naive();
            if day < start_day {
                opening += signed;
            } else {
                *by_day.entry(day).or_insert(0) += signed;
            }
        }

        let mut running = opening;
        let mut accumulated: i64 = 0;
        let mut day = start_day;
        while day <= end_day {
            if let Some(net) = by_day.get(&day) {
                running += net;
            }
            accumulated += running;
            day = day
                .checked_add_days(Days::new(1))
                .ok_or_else(|| BankError::Internal("date overflow".into()))?;
        }

        let divisor = Decimal::from(10i64.pow(decimals));
        Ok(Decimal::from(accumulated) / divisor / Decimal::from(days))
    }
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    // Exclusive upper bound: the first instant of the next day.
    let next = day.succ_opt().unwrap_or(day);
    DateTime::from_naive_utc_and_offset(next.and_time(chrono::NaiveTime::MIN), Utc)
}

pub(crate) async fn load_for_account(
    pool: &PgPool,
    account_id: AccountId,
) -> Result<Vec<Transaction>, BankError> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions \
         WHERE account_id = $1 AND is_deleted = FALSE ORDER BY timestamp ASC"
    ))
    .bind(account_id.as_uuid())
    .fetch_all(pool)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(TransactionRow::into_domain).collect()
}

pub(crate) async fn insert_transaction(
    conn: &mut PgConnection,
    transaction: &Transaction,
) -> Result<(), BankError> {
    sqlx::query(
        r#"
        INSERT INTO transactions (id, account_id, transaction_type, amount_amount, amount_currency,
                                  description, timestamp, reference, is_deleted, deleted_at, deleted_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(transaction.id().as_uuid())
    .bind(transaction.account_id().as_uuid())
    .bind(transaction.transaction_type().as_str())
    .bind(transaction.amount().amount)
    .bind(transaction.amount().currency.code())
    .bind(transaction.description())
    .bind(transaction.timestamp())
    .bind(transaction.reference())
    .bind(transaction.is_deleted())
    .bind(transaction.deleted_at())
    .bind(transaction.deleted_by())
    .execute(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_day_is_next_midnight() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let bound = end_of_day(day);
        assert_eq!(bound.date_naive(), NaiveDate::from_ymd_opt(2026, 8, 2).unwrap());
        assert_eq!(bound.time(), chrono::NaiveTime::MIN);
    }
}
