//! Pool construction and schema migrations.

use kudi_config::DatabaseSettings;
use kudi_domain::BankError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Embedded schema migrations (`./migrations`).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Connect a pool from the database settings.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, BankError> {
    info!(max_connections = settings.max_connections, "connecting to database");
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.connection_string)
        .await
        .map_err(crate::db_err)
}

/// Run pending migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), BankError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| BankError::Internal(format!("migration failed: {e}")))
}
