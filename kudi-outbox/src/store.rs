//! Postgres store for outbox rows.

use crate::error::OutboxResult;
use crate::message::OutboxMessage;
use sqlx::postgres::PgConnection;
use sqlx::PgPool;

/// Typed access to the `outbox_messages` table.
///
/// Inserts happen on a caller-supplied connection so the unit of work can
/// write rows inside the same transaction as the aggregate mutations that
/// produced them. Reads and batch updates run on the pool.
#[derive(Clone)]
pub struct OutboxStore {
    pool: PgPool,
}

impl OutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert rows on the given connection, typically a transaction owned
    /// by the unit of work.
    pub async fn insert_all(
        conn: &mut PgConnection,
        messages: &[OutboxMessage],
    ) -> OutboxResult<()> {
        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO outbox_messages (id, event_type, content, occurred_on, processed_on, retry_count, error)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(message.id)
            .bind(&message.event_type)
            .bind(&message.content)
            .bind(message.occurred_on)
            .bind(message.processed_on)
            .bind(message.retry_count)
            .bind(&message.error)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Pending rows eligible for delivery, oldest first.
    pub async fn fetch_pending(
        &self,
        limit: i64,
        max_retries: i32,
    ) -> OutboxResult<Vec<OutboxMessage>> {
        let rows = sqlx::query_as::<_, OutboxMessage>(
            r#"
            SELECT id, event_type, content, occurred_on, processed_on, retry_count, error
            FROM outbox_messages
            WHERE processed_on IS NULL AND retry_count < $1
            ORDER BY occurred_on ASC
            LIMIT $2
            "#,
        )
        .bind(max_retries)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persist the outcome of one relay batch in a single transaction.
    pub async fn apply(&self, messages: &[OutboxMessage]) -> OutboxResult<()> {
        let mut tx = self.pool.begin().await?;
        for message in messages {
            sqlx::query(
                r#"
                UPDATE outbox_messages
                SET processed_on = $2, retry_count = $3, error = $4
                WHERE id = $1
                "#,
            )
            .bind(message.id)
            .bind(message.processed_on)
            .bind(message.retry_count)
            .bind(&message.error)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Re-queue quarantined rows by resetting their retry counts. Operator
    /// action; returns the number of rows released.
    pub async fn reset_dead_letters(&self, max_retries: i32) -> OutboxResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE outbox_messages
            SET retry_count = 0, error = NULL
            WHERE processed_on IS NULL AND retry_count >= $1
            "#,
        )
        .bind(max_retries)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rows still awaiting delivery (dead letters included).
    pub async fn pending_count(&self) -> OutboxResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM outbox_messages WHERE processed_on IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    /// Rows quarantined after exhausting their retries.
    pub async fn dead_letter_count(&self, max_retries: i32) -> OutboxResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM outbox_messages WHERE processed_on IS NULL AND retry_count >= $1",
        )
        .bind(max_retries)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}
