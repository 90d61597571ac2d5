//! SMTP mailer over lettre.

use crate::error::{MailError, MailResult};
use crate::service::EmailService;
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname.
    pub relay: String,

    /// From address, e.g. `Kudi <no-reply@kudi.example>`.
    pub from: String,

    /// Operations address for alerts.
    pub operations: String,

    /// Optional credentials.
    pub credentials: Option<(String, String)>,
}

/// Sends through an SMTP relay.
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    operations: Mailbox,
}

impl SmtpEmailService {
    pub fn new(config: SmtpConfig) -> MailResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if let Some((user, password)) = config.credentials {
            builder = builder.credentials(lettre::transport::smtp::authentication::Credentials::new(
                user, password,
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&config.from)?,
            operations: parse_mailbox(&config.operations)?,
        })
    }

    async fn send(&self, message: Message) -> MailResult<()> {
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }

    fn alert(&self, subject: &str, message: &str, details: &str) -> MailResult<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.operations.clone())
            .subject(subject)
            .body(format!("{message}\n\n{details}"))
            .map_err(|e| MailError::Message(e.to_string()))
    }
}

fn parse_mailbox(value: &str) -> MailResult<Mailbox> {
    value
        .parse()
        .map_err(|_| MailError::InvalidAddress(value.to_string()))
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_statement_notification(
        &self,
        email: &str,
        full_name: &str,
        statement_date: NaiveDate,
        artifact: &[u8],
    ) -> MailResult<()> {
        let to = parse_mailbox(email)?;
        let filename = format!("statement-{}.txt", statement_date.format("%Y%m%d"));
        let body = format!(
            "Dear {full_name},\n\nYour account statement for {statement_date} is attached.\n"
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Your account statement - {statement_date}"))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body))
                    .singlepart(
                        Attachment::new(filename)
                            .body(artifact.to_vec(), ContentType::TEXT_PLAIN),
                    ),
            )
            .map_err(|e| MailError::Message(e.to_string()))?;

        debug!(to = email, date = %statement_date, "sending statement notification");
        self.send(message).await
    }

    async fn send_job_failure_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()> {
        let message = self.alert(subject, message, details)?;
        self.send(message).await
    }

    async fn send_critical_alert(
        &self,
        subject: &str,
        message: &str,
        details: &str,
    ) -> MailResult<()> {
        let message = self.alert(&format!("[CRITICAL] {subject}"), message, details)?;
        self.send(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_parsing() {
        assert!(parse_mailbox("Kudi <no-reply@kudi.example>").is_ok());
        assert!(parse_mailbox("ops@kudi.example").is_ok());
        assert!(parse_mailbox("not a mailbox").is_err());
    }

    #[test]
    fn test_service_construction() {
        let service = SmtpEmailService::new(SmtpConfig {
            relay: "smtp.kudi.example".into(),
            from: "no-reply@kudi.example".into(),
            operations: "ops@kudi.example".into(),
            credentials: None,
        });
        assert!(service.is_ok());

        let bad = SmtpEmailService::new(SmtpConfig {
            relay: "smtp.kudi.example".into(),
            from: "nonsense".into(),
            operations: "ops@kudi.example".into(),
            credentials: None,
        });
        assert!(bad.is_err());
    }
}
