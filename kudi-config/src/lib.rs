//! Typed configuration for the Kudi service.
//!
//! Settings load from an optional TOML file, then `KUDI_*` environment
//! variables override individual keys. A `.env` file is honored when
//! present. Every setting except the database connection string has a
//! default.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    AppConfig, DatabaseSettings, OutboxSettings, SchedulerSettings, RECURRING_ACCOUNT_CLEANUP,
    RECURRING_DAILY_STATEMENTS, RECURRING_MONTHLY_INTEREST,
};
