//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::HelpdeskConfig;
use crate::db::Stores;
use crate::services::auth::TokenKeys;
use crate::services::identity::{DisabledIdentityProvider, HttpIdentityProvider, IdentityProvider};
use crate::services::notify::{
    DisabledEmailSender, DisabledSmsSender, EmailSender, NotificationDispatcher, SmsSender,
    SmtpEmailSender, TwilioSmsSender,
};

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories, notification channels and signing keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HelpdeskConfig,
    stores: Stores,
    notifier: NotificationDispatcher,
    identity: Arc<dyn IdentityProvider>,
    tokens: TokenKeys,
}

impl AppState {
    /// Create application state, building providers from configuration.
    ///
    /// Unconfigured channels are replaced by disabled senders.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport or HTTP client cannot be built.
    pub fn new(config: HelpdeskConfig, stores: Stores) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        let email: Arc<dyn EmailSender> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpEmailSender::new(smtp)?),
            None => {
                tracing::warn!("SMTP not configured, email notifications disabled");
                Arc::new(DisabledEmailSender)
            }
        };
        let sms: Arc<dyn SmsSender> = match &config.twilio {
            Some(twilio) => Arc::new(TwilioSmsSender::new(twilio, http.clone())),
            None => {
                tracing::warn!("Twilio not configured, SMS notifications disabled");
                Arc::new(DisabledSmsSender)
            }
        };
        let identity: Arc<dyn IdentityProvider> = match &config.identity_sync {
            Some(sync) => Arc::new(HttpIdentityProvider::new(sync, http)),
            None => Arc::new(DisabledIdentityProvider),
        };

        Ok(Self::from_parts(
            config,
            stores,
            NotificationDispatcher::new(email, sms),
            identity,
        ))
    }

    /// Assemble state from ready-made parts.
    #[must_use]
    pub fn from_parts(
        config: HelpdeskConfig,
        stores: Stores,
        notifier: NotificationDispatcher,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                notifier,
                identity,
                tokens,
            }),
        }
    }

    /// Get a reference to the helpdesk configuration.
    #[must_use]
    pub fn config(&self) -> &HelpdeskConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the notification dispatcher.
    #[must_use]
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.inner.notifier
    }

    /// Get a reference to the identity provider mirror.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }
}
