//! Helpdesk configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HELPDESK_JWT_SECRET` - HS256 signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HELPDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; in-memory store when neither is set)
//! - `HELPDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `HELPDESK_PORT` - Listen port (default: 5000)
//! - `HELPDESK_TOKEN_TTL_HOURS` - Login token lifetime, 1 to 720 (default: 1)
//! - `HELPDESK_LOG_JSON` - Emit JSON logs when set
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   Email channel (all of host/username/password/from, or none)
//! - `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_FROM_NUMBER` - SMS channel
//! - `HELPDESK_FALLBACK_EMAIL`, `HELPDESK_FALLBACK_PHONE` - Contact used for
//!   in-progress notifications
//! - `IDENTITY_SYNC_URL`, `IDENTITY_SYNC_TOKEN` - Password change mirror
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Longest accepted login token lifetime (30 days).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 30;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_FALLBACK_EMAIL: &str = "it.support@powergrid.in";
const DEFAULT_FALLBACK_PHONE: &str = "+910000000000";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Incomplete {0} configuration: {1} is not set")]
    Incomplete(&'static str, String),
}

/// Helpdesk application configuration.
#[derive(Debug, Clone)]
pub struct HelpdeskConfig {
    /// `PostgreSQL` connection URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// SMTP settings, when email notifications are enabled
    pub smtp: Option<SmtpConfig>,
    /// Twilio settings, when SMS notifications are enabled
    pub twilio: Option<TwilioConfig>,
    /// Contact used when an operation has no stored ticket contact
    pub fallback_contact: FallbackContact,
    /// Password change mirror, when enabled
    pub identity_sync: Option<IdentitySyncConfig>,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// JWT signing configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 shared secret
    pub secret: SecretString,
    /// Lifetime of issued tokens in hours
    pub ttl_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// SMTP relay configuration.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP relay host (STARTTLS)
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: SecretString,
    /// `From:` address for outgoing mail
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Twilio messaging configuration.
#[derive(Clone)]
pub struct TwilioConfig {
    /// Account SID (also the basic-auth username)
    pub account_sid: String,
    /// Auth token (basic-auth password)
    pub auth_token: SecretString,
    /// Sending phone number in E.164 format
    pub from_number: String,
    /// API base URL, overridable for tests
    pub base_url: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Support desk contact for in-progress notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackContact {
    pub email: String,
    pub phone: String,
}

impl Default for FallbackContact {
    fn default() -> Self {
        Self {
            email: DEFAULT_FALLBACK_EMAIL.to_owned(),
            phone: DEFAULT_FALLBACK_PHONE.to_owned(),
        }
    }
}

/// External identity provider mirror configuration.
#[derive(Clone)]
pub struct IdentitySyncConfig {
    /// Endpoint receiving `{ "uid", "password" }` updates
    pub url: String,
    /// Bearer token for the endpoint
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for IdentitySyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySyncConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HelpdeskConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, if
    /// an optional provider is only partially configured, or if the JWT
    /// secret fails validation (length, placeholder detection, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_optional_env("HELPDESK_DATABASE_URL")
            .or_else(|| get_optional_env("DATABASE_URL"))
            .map(SecretString::from);
        let host = parse_env("HELPDESK_HOST", "127.0.0.1")?;
        let port = parse_env("HELPDESK_PORT", "5000")?;

        let secret = get_validated_secret("HELPDESK_JWT_SECRET")?;
        validate_secret_length(&secret, "HELPDESK_JWT_SECRET")?;
        let jwt = JwtConfig {
            secret,
            ttl_hours: validate_token_ttl(
                parse_env("HELPDESK_TOKEN_TTL_HOURS", "1")?,
                "HELPDESK_TOKEN_TTL_HOURS",
            )?,
        };

        let fallback = FallbackContact::default();
        let fallback_contact = FallbackContact {
            email: get_optional_env("HELPDESK_FALLBACK_EMAIL").unwrap_or(fallback.email),
            phone: get_optional_env("HELPDESK_FALLBACK_PHONE").unwrap_or(fallback.phone),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            smtp: SmtpConfig::from_env()?,
            twilio: TwilioConfig::from_env()?,
            fallback_contact,
            identity_sync: get_optional_env("IDENTITY_SYNC_URL").map(|url| IdentitySyncConfig {
                url,
                token: get_optional_env("IDENTITY_SYNC_TOKEN").map(SecretString::from),
            }),
            log_json: get_optional_env("HELPDESK_LOG_JSON").is_some(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: parse_env("SMTP_PORT", "587")?,
            username: require_for("SMTP", "SMTP_USERNAME")?,
            password: SecretString::from(require_for("SMTP", "SMTP_PASSWORD")?),
            from_address: require_for("SMTP", "SMTP_FROM")?,
        }))
    }
}

impl TwilioConfig {
    /// Production Twilio REST endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twilio.com/2010-04-01";

    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(account_sid) = get_optional_env("TWILIO_ACCOUNT_SID") else {
            return Ok(None);
        };

        Ok(Some(Self {
            account_sid,
            auth_token: SecretString::from(require_for("Twilio", "TWILIO_AUTH_TOKEN")?),
            from_number: require_for("Twilio", "TWILIO_FROM_NUMBER")?,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable that becomes mandatory once its provider is enabled.
fn require_for(provider: &'static str, key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::Incomplete(provider, key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .as_deref()
        .unwrap_or(default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate a token lifetime in hours.
fn validate_token_ttl(hours: i64, var_name: &str) -> Result<i64, ConfigError> {
    match chrono::Duration::try_hours(hours) {
        Some(_) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => Ok(hours),
        _ => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be between 1 and {MAX_TOKEN_TTL_HOURS} hours (got {hours})"),
        )),
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
