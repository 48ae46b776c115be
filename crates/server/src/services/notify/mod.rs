//! Ticket notifications.
//!
//! A lifecycle operation sends at most one notification, on the channel the
//! client picked with `notifyType`. Delivery failures are logged and never
//! fail the operation; the caller only sees a [`NotificationOutcome`].

pub mod email;
pub mod sms;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use helpdesk_core::NotifyType;

pub use email::{DisabledEmailSender, SmtpEmailSender};
pub use sms::{DisabledSmsSender, TwilioSmsSender};

/// Errors raised by a notification sender.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel has no provider configured.
    #[error("{0} channel is not configured")]
    ChannelDisabled(&'static str),

    /// Recipient or sender address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build the email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// HTTP request to the SMS provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SMS provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Sends plain-text email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message to one recipient.
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifyError>;
}

/// Sends SMS messages.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send one message to one phone number.
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

/// What happened to the notification attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationOutcome {
    /// The provider accepted the message.
    Sent,
    /// A channel was requested but delivery did not happen.
    Failed,
    /// No channel was requested.
    Skipped,
}

/// Where a notification may go.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recipient<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Message content for either channel.
///
/// Email uses `subject` and `body`; SMS sends `body` only.
#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Routes a notification to exactly one sender.
#[derive(Clone)]
pub struct NotificationDispatcher {
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given senders.
    #[must_use]
    pub fn new(email: Arc<dyn EmailSender>, sms: Arc<dyn SmsSender>) -> Self {
        Self { email, sms }
    }

    /// A dispatcher whose channels are both disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledEmailSender), Arc::new(DisabledSmsSender))
    }

    /// Send `notification` on the channel selected by `notify_type`.
    ///
    /// Never returns an error: failures are logged and reported as
    /// [`NotificationOutcome::Failed`].
    pub async fn dispatch(
        &self,
        notify_type: NotifyType,
        recipient: Recipient<'_>,
        notification: &Notification,
    ) -> NotificationOutcome {
        let (channel, to, result) = match notify_type {
            NotifyType::None => return NotificationOutcome::Skipped,
            NotifyType::Email => {
                let Some(to) = recipient.email else {
                    tracing::warn!(channel = "email", "No recipient address, notification not sent");
                    return NotificationOutcome::Failed;
                };
                let result = self
                    .email
                    .send_email(to, &notification.subject, &notification.body)
                    .await;
                ("email", to, result)
            }
            NotifyType::Sms => {
                let Some(to) = recipient.phone else {
                    tracing::warn!(channel = "sms", "No recipient phone, notification not sent");
                    return NotificationOutcome::Failed;
                };
                let result = self.sms.send_sms(to, &notification.body).await;
                ("sms", to, result)
            }
        };

        match result {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => {
                tracing::warn!(channel, to = %to, error = %e, "Notification failed");
                NotificationOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        emails: Mutex<Vec<(String, String, String)>>,
        sms: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for Recorder {
        async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifyError> {
            self.emails
                .lock()
                .push((to.to_owned(), subject.to_owned(), text.to_owned()));
            if self.fail {
                return Err(NotifyError::InvalidAddress(to.to_owned()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SmsSender for Recorder {
        async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
            self.sms.lock().push((to.to_owned(), body.to_owned()));
            Ok(())
        }
    }

    fn dispatcher(recorder: &Arc<Recorder>) -> NotificationDispatcher {
        NotificationDispatcher::new(recorder.clone(), recorder.clone())
    }

    fn note() -> Notification {
        Notification {
            subject: "Ticket Created: Printer jam".to_string(),
            body: "Printer jam".to_string(),
        }
    }

    const TO: Recipient<'static> = Recipient {
        email: Some("ops@powergrid.in"),
        phone: Some("+919800000000"),
    };

    #[tokio::test]
    async fn test_email_uses_only_email_sender() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(&recorder)
            .dispatch(NotifyType::Email, TO, &note())
            .await;

        assert_eq!(outcome, NotificationOutcome::Sent);
        assert_eq!(recorder.emails.lock().len(), 1);
        assert!(recorder.sms.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sms_uses_only_sms_sender() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(&recorder)
            .dispatch(NotifyType::Sms, TO, &note())
            .await;

        assert_eq!(outcome, NotificationOutcome::Sent);
        assert!(recorder.emails.lock().is_empty());
        assert_eq!(recorder.sms.lock()[0].0, "+919800000000");
    }

    #[tokio::test]
    async fn test_none_sends_nothing() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(&recorder)
            .dispatch(NotifyType::None, TO, &note())
            .await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(recorder.emails.lock().is_empty());
        assert!(recorder.sms.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sender_failure_is_swallowed() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let outcome = dispatcher(&recorder)
            .dispatch(NotifyType::Email, TO, &note())
            .await;

        assert_eq!(outcome, NotificationOutcome::Failed);
    }

    #[tokio::test]
    async fn test_missing_phone_fails_without_sending() {
        let recorder = Arc::new(Recorder::default());
        let recipient = Recipient {
            email: Some("ops@powergrid.in"),
            phone: None,
        };
        let outcome = dispatcher(&recorder)
            .dispatch(NotifyType::Sms, recipient, &note())
            .await;

        assert_eq!(outcome, NotificationOutcome::Failed);
        assert!(recorder.sms.lock().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_channels_report_failure() {
        let outcome = NotificationDispatcher::disabled()
            .dispatch(NotifyType::Email, TO, &note())
            .await;
        assert_eq!(outcome, NotificationOutcome::Failed);
    }
}
