//! Email channel over SMTP.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use super::{EmailSender, NotifyError};
use crate::config::SmtpConfig;

/// Sends plain-text email through an authenticated STARTTLS relay.
///
/// The transport is built once and shared; lettre pools connections.
#[derive(Clone)]
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpEmailSender {
    /// Create a sender from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host cannot be resolved into a transport.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(text.to_string())?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

/// Stand-in used when SMTP is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send_email(&self, to: &str, subject: &str, _text: &str) -> Result<(), NotifyError> {
        tracing::debug!(to = %to, subject = %subject, "SMTP not configured, email dropped");
        Err(NotifyError::ChannelDisabled("email"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(from: &str) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.powergrid.in".to_string(),
            port: 587,
            username: "helpdesk".to_string(),
            password: SecretString::from("app-password"),
            from_address: from.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_sending() {
        let sender = SmtpEmailSender::new(&config("helpdesk@powergrid.in")).unwrap();
        let result = sender.send_email("not an address", "Hi", "Body").await;
        assert!(matches!(result, Err(NotifyError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_invalid_from_address_rejected() {
        let sender = SmtpEmailSender::new(&config("helpdesk")).unwrap();
        let result = sender.send_email("ops@powergrid.in", "Hi", "Body").await;
        assert!(matches!(result, Err(NotifyError::InvalidAddress(a)) if a == "helpdesk"));
    }

    #[tokio::test]
    async fn test_disabled_sender_reports_disabled() {
        let result = DisabledEmailSender
            .send_email("ops@powergrid.in", "Hi", "Body")
            .await;
        assert!(matches!(result, Err(NotifyError::ChannelDisabled("email"))));
    }
}
