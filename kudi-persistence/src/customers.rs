//! Customer repository.

use crate::db_err;
use chrono::{DateTime, NaiveDate, Utc};
use kudi_domain::{BankError, Customer, CustomerId};
use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address: String,
    date_of_birth: NaiveDate,
    bvn: String,
    credit_score: i32,
    email_opt_in: bool,
    date_created: DateTime<Utc>,
    is_active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl CustomerRow {
    fn into_domain(self) -> Customer {
        Customer::rehydrate(
            CustomerId::from_uuid(self.id),
            self.first_name,
            self.last_name,
            self.email,
            self.phone,
            self.address,
            self.date_of_birth,
            self.bvn,
            self.credit_score,
            self.email_opt_in,
            self.date_created,
            self.is_active,
            self.is_deleted,
            self.deleted_at,
            self.deleted_by,
        )
    }
}

const SELECT_COLUMNS: &str = "id, first_name, last_name, email, phone, address, date_of_birth, \
     bvn, credit_score, email_opt_in, date_created, is_active, is_deleted, deleted_at, deleted_by";

/// Typed reads and writes over the `customers` table.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: CustomerId) -> Result<Option<Customer>, BankError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(CustomerRow::into_domain))
    }

    pub async fn exists(&self, id: CustomerId) -> Result<bool, BankError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.0)
    }

    /// Case-insensitive email lookup.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, BankError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE LOWER(email) = LOWER($1) AND is_deleted = FALSE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(CustomerRow::into_domain))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, BankError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE LOWER(email) = LOWER($1) AND is_deleted = FALSE)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.0)
    }

    pub async fn list_all(&self) -> Result<Vec<Customer>, BankError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE is_deleted = FALSE ORDER BY date_created"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }

    pub async fn add(&self, customer: &Customer) -> Result<(), BankError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        insert_customer(&mut conn, customer).await
    }

    pub async fn update(&self, customer: &Customer) -> Result<(), BankError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        update_customer(&mut conn, customer).await
    }
}

pub(crate) async fn insert_customer(
    conn: &mut PgConnection,
    customer: &Customer,
) -> Result<(), BankError> {
    sqlx::query(
        r#"
        INSERT INTO customers (id, first_name, last_name, email, phone, address, date_of_birth,
                               bvn, credit_score, email_opt_in, date_created, is_active,
                               is_deleted, deleted_at, deleted_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(customer.id().as_uuid())
    .bind(customer.first_name())
    .bind(customer.last_name())
    .bind(customer.email())
    .bind(customer.phone())
    .bind(customer.address())
    .bind(customer.date_of_birth())
    .bind(customer.bvn())
    .bind(customer.credit_score())
    .bind(customer.email_opt_in())
    .bind(customer.date_created())
    .bind(customer.is_active())
    .bind(customer.is_deleted())
    .bind(customer.deleted_at())
    .bind(customer.deleted_by())
    .execute(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

pub(crate) async fn update_customer(
    conn: &mut PgConnection,
    customer: &Customer,
) -> Result<(), BankError> {
    sqlx::query(
        r#"
        UPDATE customers
        SET first_name = $2, last_name = $3, email = $4, phone = $5, address = $6,
            credit_score = $7, email_opt_in = $8, is_active = $9, is_deleted = $10,
            deleted_at = $11, deleted_by = $12
        WHERE id = $1
        "#,
    )
    .bind(customer.id().as_uuid())
    .bind(customer.first_name())
    .bind(customer.last_name())
    .bind(customer.email())
    .bind(customer.phone())
    .bind(customer.address())
    .bind(customer.credit_score())
    .bind(customer.email_opt_in())
    .bind(customer.is_active())
    .bind(customer.is_deleted())
    .bind(customer.deleted_at())
    .bind(customer.deleted_by())
    .execute(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}
