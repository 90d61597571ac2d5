//! Outbound email for Kudi.
//!
//! The core calls [`EmailService`] and never retries: a failed send is
//! logged by the caller and the triggering work continues. The SMTP
//! implementation rides on lettre; the no-op implementation backs tests
//! and local runs.

pub mod error;
pub mod noop;
pub mod service;
pub mod smtp;

pub use error::{MailError, MailResult};
pub use noop::NoopEmailService;
pub use service::EmailService;
pub use smtp::{SmtpConfig, SmtpEmailService};
