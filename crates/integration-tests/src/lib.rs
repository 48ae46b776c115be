//! Integration tests for the helpdesk API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p helpdesk-integration-tests
//!
//! # Include the PostgreSQL repository tests
//! HELPDESK_TEST_DATABASE_URL=postgres://... cargo test -p helpdesk-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the real router in-process with `tower::ServiceExt::oneshot`
//! over the in-memory store. Notification senders and the identity provider are
//! replaced by recorders so tests can assert what would have been sent.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use helpdesk_server::config::{FallbackContact, HelpdeskConfig, JwtConfig};
use helpdesk_server::db::{Stores, memory::MemoryStore};
use helpdesk_server::routes;
use helpdesk_server::services::identity::{IdentityError, IdentityProvider};
use helpdesk_server::services::notify::{
    EmailSender, NotificationDispatcher, NotifyError, SmsSender,
};
use helpdesk_server::state::AppState;

/// JWT secret used by every test app.
pub const TEST_JWT_SECRET: &str = "Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%";

/// One recorded email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// One recorded SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// Email and SMS sender that records instead of delivering.
#[derive(Debug, Default)]
pub struct RecordingSender {
    emails: Mutex<Vec<SentEmail>>,
    sms: Mutex<Vec<SentSms>>,
    fail: bool,
}

impl RecordingSender {
    /// A recorder whose every send fails after being recorded.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn emails(&self) -> Vec<SentEmail> {
        self.emails.lock().clone()
    }

    #[must_use]
    pub fn sms(&self) -> Vec<SentSms> {
        self.sms.lock().clone()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.emails.lock().len() + self.sms.lock().len()
    }

    fn result(&self) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Provider {
                status: 503,
                body: "provider unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifyError> {
        self.emails.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        self.result()
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.sms.lock().push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        self.result()
    }
}

/// Identity provider that records mirrored password changes.
#[derive(Debug, Default)]
pub struct RecordingIdentity {
    updates: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingIdentity {
    /// Provider that rejects every update.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// UIDs whose password was mirrored.
    #[must_use]
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl IdentityProvider for RecordingIdentity {
    async fn update_password(&self, uid: &str, _new_password: &str) -> Result<(), IdentityError> {
        self.updates.lock().push(uid.to_string());
        if self.fail {
            return Err(IdentityError::Rejected(500));
        }
        Ok(())
    }
}

/// Configuration for tests: no database, no providers.
#[must_use]
pub fn test_config() -> HelpdeskConfig {
    HelpdeskConfig {
        database_url: None,
        host: [127, 0, 0, 1].into(),
        port: 0,
        jwt: JwtConfig {
            secret: SecretString::from(TEST_JWT_SECRET),
            ttl_hours: 1,
        },
        smtp: None,
        twilio: None,
        fallback_contact: FallbackContact {
            email: "desk@powergrid.in".to_string(),
            phone: "+911100000000".to_string(),
        },
        identity_sync: None,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A fully wired application over in-memory state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub sender: Arc<RecordingSender>,
    pub identity: Arc<RecordingIdentity>,
}

/// Decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of the body.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(RecordingSender::default(), RecordingIdentity::default())
    }

    #[must_use]
    pub fn with_parts(sender: RecordingSender, identity: RecordingIdentity) -> Self {
        let store = Arc::new(MemoryStore::default());
        let sender = Arc::new(sender);
        let identity = Arc::new(identity);

        let state = AppState::from_parts(
            test_config(),
            Stores::from_memory(&store),
            NotificationDispatcher::new(sender.clone(), sender.clone()),
            identity.clone(),
        );
        let router = routes::routes().with_state(state.clone());

        Self {
            router,
            state,
            store,
            sender,
            identity,
        }
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, token).await
    }

    /// Register a user and return the response body's `user`.
    pub async fn register(&self, email: &str, password: &str, role: &str) -> Value {
        let response = self
            .post(
                "/api/register",
                serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": password,
                    "employeeId": "PG1000",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["user"].clone()
    }

    /// Register and log in, returning the bearer token.
    pub async fn login_token(&self, email: &str, role: &str) -> String {
        self.register(email, "grid-pass-2024", role).await;
        let response = self
            .post(
                "/api/login",
                serde_json::json!({ "email": email, "password": "grid-pass-2024", "role": role }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
