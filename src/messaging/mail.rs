//! Outbound e-mail.
//!
//! Bodies arrive already rendered; senders only wrap them into a message and
//! hand them to the transport.

use crate::config::MailConfig;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// STARTTLS SMTP sender; the transport pools its connections
#[derive(Clone)]
pub struct SmtpMailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailSender")
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl SmtpMailSender {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| WorkflowError::Configuration(format!("invalid mail.from_address: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| WorkflowError::Configuration(format!("SMTP relay {}: {e}", config.smtp_host)))?
            .port(config.smtp_port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| WorkflowError::delivery("email", format!("invalid recipient {to}: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| WorkflowError::delivery("email", format!("build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| WorkflowError::delivery("email", format!("SMTP send: {e}")))?;

        info!(to = %to, "📧 Email sent");
        Ok(())
    }
}

/// Used when mail is disabled: records the send in the log and succeeds
#[derive(Debug, Clone, Default)]
pub struct LoggingMailSender;

#[async_trait]
impl MailSender for LoggingMailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        debug!(
            to = %to,
            subject = %subject,
            body_len = body.len(),
            "📭 Mail disabled, skipping send"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_sender_rejects_bad_from_address() {
        let config = MailConfig {
            from_address: "not an address".to_string(),
            ..MailConfig::default()
        };
        let err = SmtpMailSender::from_config(&config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_logging_sender_always_succeeds() {
        LoggingMailSender
            .send("dentist@example.com", "Order shipped", "Your order is on its way")
            .await
            .unwrap();
    }
}
