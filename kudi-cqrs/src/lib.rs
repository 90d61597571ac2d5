//! The command/query pipeline.
//!
//! Every request passes three ordered stages: logging, declarative
//! validation, then the handler. Commands run a fourth stage after the
//! handler succeeds: the events the unit of work committed are published on
//! the in-process bus, where subscriber failures are logged but never
//! surfaced (the outbox already holds the events durably). Handlers never
//! call other handlers; composition is by data.
//!
//! Handlers, validators, and subscribers are all registered explicitly in
//! the composition root. Nothing is discovered by reflection.

pub mod command;
pub mod query;

pub use command::{Command, CommandBus, CommandHandler, Executed};
pub use query::{Query, QueryBus, QueryHandler};

use kudi_validation::ValidationErrors;

/// Declarative validation rules for one request type, run by the pipeline
/// before the handler. Collects every violation.
pub trait RequestValidator<R>: Send + Sync {
    fn validate(&self, request: &R) -> Result<(), ValidationErrors>;
}
