//! External identity provider mirror.
//!
//! Password changes are mirrored to the organisation's identity provider on
//! a best-effort basis. Callers log and ignore failures.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use crate::config::IdentitySyncConfig;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the update.
    #[error("provider returned {0}")]
    Rejected(u16),
}

/// Receives password updates for mirroring.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Set the password for `uid` in the external provider.
    async fn update_password(&self, uid: &str, new_password: &str) -> Result<(), IdentityError>;
}

/// No mirror configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn update_password(&self, _uid: &str, _new_password: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    uid: &'a str,
    password: &'a str,
}

/// Mirrors password changes by POSTing JSON to a configured endpoint.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    url: String,
    token: Option<SecretString>,
}

impl HttpIdentityProvider {
    /// Create a provider sharing the given HTTP client.
    #[must_use]
    pub fn new(config: &IdentitySyncConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn update_password(&self, uid: &str, new_password: &str) -> Result<(), IdentityError> {
        let mut request = self.client.post(&self.url).json(&PasswordUpdate {
            uid,
            password: new_password,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(IdentityError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(uid = %uid, "Password mirrored to identity provider");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Provider that always fails, for exercising the best-effort path.
    pub struct FailingIdentityProvider;

    #[async_trait]
    impl IdentityProvider for FailingIdentityProvider {
        async fn update_password(&self, _uid: &str, _new: &str) -> Result<(), IdentityError> {
            Err(IdentityError::Rejected(503))
        }
    }

    #[tokio::test]
    async fn test_disabled_provider_is_noop() {
        assert!(
            DisabledIdentityProvider
                .update_password("uid", "pw")
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_password_update_body() {
        let body = serde_json::to_value(PasswordUpdate {
            uid: "42",
            password: "pw",
        })
        .unwrap_or_default();
        assert_eq!(body["uid"], "42");
        assert_eq!(body["password"], "pw");
    }
}
