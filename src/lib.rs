//! Kudi: a transactional core-banking service.
//!
//! The workspace splits the service into focused crates; this facade
//! re-exports them and provides the composition root.
//!
//! - [`domain`]: customer/account/transaction aggregates, value types,
//!   domain events, the error taxonomy
//! - [`events`]: the in-process event bus
//! - [`validation`]: declarative input validation
//! - [`cqrs`]: command/query buses with logging, validation, and
//!   post-commit event dispatch
//! - [`app`]: the concrete banking commands, queries, and DTOs
//! - [`persistence`]: Postgres repositories and the unit of work
//! - [`outbox`]: the transactional outbox and its background relay
//! - [`scheduler`]: the database-backed job queue, workers, and cron
//! - [`jobs`]: statement, interest, and maintenance job implementations
//! - [`mail`]: the outbound email interface
//! - [`config`]: typed settings
//!
//! # Quick start
//!
//! ```no_run
//! use kudi::runtime::BankingRuntime;
//! use kudi::app::CreateCustomer;
//! use kudi::config::AppConfig;
//! use kudi::mail::NoopEmailService;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let mut runtime = BankingRuntime::bootstrap(config, Arc::new(NoopEmailService::new())).await?;
//! runtime.start().await?;
//!
//! let customer_id = runtime
//!     .commands()
//!     .execute(CreateCustomer {
//!         first_name: "Ada".into(),
//!         last_name: "Lovelace".into(),
//!         email: "ada@kudi.example".into(),
//!         phone: "+2348012345678".into(),
//!         address: "12 Marina, Lagos".into(),
//!         date_of_birth: "1990-12-10".parse()?,
//!         bvn: "22345678901".into(),
//!         credit_score: 700,
//!         email_opt_in: true,
//!     })
//!     .await?;
//! println!("customer {customer_id}");
//!
//! runtime.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub use kudi_app as app;
pub use kudi_config as config;
pub use kudi_cqrs as cqrs;
pub use kudi_domain as domain;
pub use kudi_events as events;
pub use kudi_jobs as jobs;
pub use kudi_mail as mail;
pub use kudi_outbox as outbox;
pub use kudi_persistence as persistence;
pub use kudi_scheduler as scheduler;
pub use kudi_validation as validation;

pub mod runtime;
