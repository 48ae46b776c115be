//! HTTP route handlers for the helpdesk API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (store reachable)
//!
//! # Auth (rate limited in the binary)
//! POST /api/register                  - Register with password
//! POST /api/login                     - Role-checked login, returns bearer token
//! POST /api/change-password           - Change password
//!
//! # Users
//! POST /api/logout                    - Stateless logout
//! POST /api/addUser                   - Add a password-less user
//! GET  /api/users                     - List users (bearer token)
//!
//! # Profiles
//! POST /profile/updateProfile         - Upsert profile
//! GET  /profile/getProfile/{uid}      - Fetch profile
//!
//! # Tickets
//! POST /ticket                        - Create ticket
//! GET  /ticket                        - List tickets (bearer token)
//! GET  /ticket/{ticket_id}            - Ticket detail (bearer token)
//! PUT  /ticket/{ticket_id}/in-progress - Notify that work has started
//! PUT  /ticket/{ticket_id}/resolve    - Resolve ticket
//! ```

pub mod auth;
pub mod health;
pub mod profiles;
pub mod tickets;
pub mod users;

use axum::{
    Router,
    extract::{FromRequest, rejection::JsonRejection},
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API's error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Routes that accept credentials.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/change-password", post(auth::change_password))
}

/// Everything else.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/logout", post(auth::logout))
        .route("/api/addUser", post(users::add_user))
        .route("/api/users", get(users::list))
        .route("/profile/updateProfile", post(profiles::update))
        .route("/profile/getProfile/{uid}", get(profiles::show))
        .route("/ticket", post(tickets::create).get(tickets::index))
        .route("/ticket/{ticket_id}", get(tickets::show))
        .route("/ticket/{ticket_id}/in-progress", put(tickets::in_progress))
        .route("/ticket/{ticket_id}/resolve", put(tickets::resolve))
}

/// Create all routes, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(api_routes())
}
