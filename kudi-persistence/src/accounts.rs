//! Account repository.

use crate::db_err;
use crate::transactions;
use chrono::{DateTime, Utc};
use kudi_domain::{
    Account, AccountId, AccountNumber, AccountStatus, AccountType, BankError, Currency, CustomerId,
    Money, Transaction,
};
use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    account_number: String,
    customer_id: Uuid,
    account_type: String,
    balance_amount: i64,
    balance_currency: String,
    date_opened: DateTime<Utc>,
    is_active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
    row_version: Uuid,
    last_activity_at: DateTime<Utc>,
    status: String,
    is_interest_bearing: bool,
    is_archived: bool,
}

impl AccountRow {
    fn into_domain(self, transactions: Vec<Transaction>) -> Result<Account, BankError> {
        let account_number = AccountNumber::parse(&self.account_number)
            .map_err(|e| BankError::Internal(format!("corrupt account_number column: {e}")))?;
        let account_type = AccountType::parse(&self.account_type)
            .ok_or_else(|| BankError::Internal(format!("unknown account type {}", self.account_type)))?;
        let currency = Currency::from_code(&self.balance_currency)
            .ok_or_else(|| BankError::Internal(format!("unknown currency {}", self.balance_currency)))?;
        let status = AccountStatus::parse(&self.status)
            .ok_or_else(|| BankError::Internal(format!("unknown account status {}", self.status)))?;

        Ok(Account::rehydrate(
            AccountId::from_uuid(self.id),
            account_number,
            CustomerId::from_uuid(self.customer_id),
            account_type,
            Money::new(self.balance_amount, currency),
            self.date_opened,
            self.is_active,
            self.is_deleted,
            self.deleted_at,
            self.deleted_by,
            self.row_version,
            self.last_activity_at,
            status,
            self.is_interest_bearing,
            self.is_archived,
            transactions,
        ))
    }
}

const SELECT_COLUMNS: &str = "id, account_number, customer_id, account_type, balance_amount, \
     balance_currency, date_opened, is_active, is_deleted, deleted_at, deleted_by, row_version, \
     last_activity_at, status, is_interest_bearing, is_archived";

/// Typed reads and writes over the `accounts` table.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load an account together with its child transactions.
    pub async fn find(&self, id: AccountId) -> Result<Option<Account>, BankError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let children = transactions::load_for_account(&self.pool, id).await?;
                Ok(Some(row.into_domain(children)?))
            }
        }
    }

    /// Load an account by its number, with child transactions.
    pub async fn find_by_number(
        &self,
        account_number: &AccountNumber,
    ) -> Result<Option<Account>, BankError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE account_number = $1 AND is_deleted = FALSE"
        ))
        .bind(account_number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let id = AccountId::from_uuid(row.id);
                let children = transactions::load_for_account(&self.pool, id).await?;
                Ok(Some(row.into_domain(children)?))
            }
        }
    }

    pub async fn find_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE customer_id = $1 AND is_deleted = FALSE \
             ORDER BY date_opened"
        ))
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    pub async fn number_exists(&self, account_number: &AccountNumber) -> Result<bool, BankError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE account_number = $1)")
                .bind(account_number.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.0)
    }

    /// Active, non-deleted accounts. Children are not loaded.
    pub async fn list_active(&self) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE is_active = TRUE AND is_deleted = FALSE ORDER BY date_opened"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    /// Active accounts flagged as interest bearing.
    pub async fn list_interest_bearing(&self) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE is_active = TRUE AND is_deleted = FALSE AND is_interest_bearing = TRUE \
             ORDER BY date_opened"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    /// Empty, still-Active accounts whose last activity predates the cutoff.
    pub async fn list_inactive_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE last_activity_at < $1 AND status = 'Active' AND balance_amount = 0 \
               AND is_deleted = FALSE ORDER BY last_activity_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    /// Non-deleted accounts whose last activity predates the cutoff,
    /// regardless of balance. Used by the maintenance job.
    pub async fn list_idle_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE last_activity_at < $1 AND is_deleted = FALSE AND is_archived = FALSE \
             ORDER BY last_activity_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    pub async fn list_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE status = $1 AND is_deleted = FALSE ORDER BY date_opened"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    /// Active accounts below a minor-unit threshold in the given currency.
    pub async fn list_low_balance(
        &self,
        threshold: Money,
    ) -> Result<Vec<Account>, BankError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts \
             WHERE balance_amount < $1 AND balance_currency = $2 \
               AND is_active = TRUE AND is_deleted = FALSE ORDER BY balance_amount"
        ))
        .bind(threshold.amount)
        .bind(threshold.currency.code())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_domain(Vec::new())).collect()
    }

    pub async fn add(&self, account: &Account) -> Result<(), BankError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        insert_account(&mut conn, account).await
    }

    /// Persist an update under the optimistic row-version check; rotates the
    /// in-memory token on success.
    pub async fn update(&self, account: &mut Account) -> Result<(), BankError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let new_version = Uuid::new_v4();
        update_account(&mut conn, account, new_version).await?;
        account.set_row_version(new_version);
        Ok(())
    }

    /// Persist a set of updates in one transaction.
    pub async fn update_all(&self, accounts: &mut [Account]) -> Result<(), BankError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut versions = Vec::with_capacity(accounts.len());
        for account in accounts.iter() {
            let new_version = Uuid::new_v4();
            update_account(&mut *tx, account, new_version).await?;
            versions.push(new_version);
        }
        tx.commit().await.map_err(db_err)?;
        for (account, version) in accounts.iter_mut().zip(versions) {
            account.set_row_version(version);
        }
        Ok(())
    }
}

pub(crate) async fn insert_account(
    conn: &mut PgConnection,
    account: &Account,
) -> Result<(), BankError> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id, account_number, customer_id, account_type, balance_amount,
                              balance_currency, date_opened, is_active, is_deleted, deleted_at,
                              deleted_by, row_version, last_activity_at, status,
                              is_interest_bearing, is_archived)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(account.id().as_uuid())
    .bind(account.account_number().as_str())
    .bind(account.customer_id().as_uuid())
    .bind(account.account_type().as_str())
    .bind(account.balance().amount)
    .bind(account.balance().currency.code())
    .bind(account.date_opened())
    .bind(account.is_active())
    .bind(account.is_deleted())
    .bind(account.deleted_at())
    .bind(account.deleted_by())
    .bind(account.row_version())
    .bind(account.last_activity_at())
    .bind(account.status().as_str())
    .bind(account.is_interest_bearing())
    .bind(account.is_archived())
    .execute(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Update one account row, guarded by the current row version. Zero rows
/// affected means another writer got there first.
pub(crate) async fn update_account(
    conn: &mut PgConnection,
    account: &Account,
    new_version: Uuid,
) -> Result<(), BankError> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET balance_amount = $3, is_active = $4, is_deleted = $5, deleted_at = $6,
            deleted_by = $7, row_version = $8, last_activity_at = $9, status = $10,
            is_interest_bearing = $11, is_archived = $12
        WHERE id = $1 AND row_version = $2
        "#,
    )
    .bind(account.id().as_uuid())
    .bind(account.row_version())
    .bind(account.balance().amount)
    .bind(account.is_active())
    .bind(account.is_deleted())
    .bind(account.deleted_at())
    .bind(account.deleted_by())
    .bind(new_version)
    .bind(account.last_activity_at())
    .bind(account.status().as_str())
    .bind(account.is_interest_bearing())
    .bind(account.is_archived())
    .execute(conn)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(BankError::Conflict(format!(
            "account {} was modified concurrently",
            account.account_number()
        )));
    }
    Ok(())
}
