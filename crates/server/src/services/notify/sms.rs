//! SMS channel over the Twilio REST API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{NotifyError, SmsSender};
use crate::config::TwilioConfig;

/// Sends SMS by POSTing to Twilio's `Messages.json` resource.
#[derive(Clone)]
pub struct TwilioSmsSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
    base_url: String,
}

impl TwilioSmsSender {
    /// Create a sender sharing the given HTTP client.
    #[must_use]
    pub fn new(config: &TwilioConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %to, "SMS sent");
        Ok(())
    }
}

/// Stand-in used when Twilio is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSmsSender;

#[async_trait]
impl SmsSender for DisabledSmsSender {
    async fn send_sms(&self, to: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::debug!(to = %to, "Twilio not configured, SMS dropped");
        Err(NotifyError::ChannelDisabled("sms"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_uses_account_sid() {
        let config = TwilioConfig {
            account_sid: "AC0123".to_string(),
            auth_token: SecretString::from("token"),
            from_number: "+15005550006".to_string(),
            base_url: "https://api.twilio.com/2010-04-01/".to_string(),
        };
        let sender = TwilioSmsSender::new(&config, reqwest::Client::new());

        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC0123/Messages.json"
        );
    }
}
