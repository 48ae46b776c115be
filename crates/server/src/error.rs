//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry and logged; the client gets `{ "message": ... }` with a
//! generic text instead of provider details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::profiles::ProfileError;
use crate::services::tickets::TicketError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the helpdesk API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Ticket operation failed.
    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::MissingFields(_)
                | AuthError::InvalidEmail(_)
                | AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::RoleMismatch => StatusCode::FORBIDDEN,
                AuthError::InvalidCredentials | AuthError::IncorrectPassword => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Repository(_) | AuthError::Token(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Ticket(err) => match err {
                TicketError::MissingFields(_) | TicketError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                TicketError::NotFound => StatusCode::NOT_FOUND,
                TicketError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Profile(err) => match err {
                ProfileError::MissingUid => StatusCode::BAD_REQUEST,
                ProfileError::NotFound => StatusCode::NOT_FOUND,
                ProfileError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the client.
    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            // Don't expose internal error details to clients
            return INTERNAL_MESSAGE.to_string();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::MissingFields(msg) => (*msg).to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::UserAlreadyExists => "User already exists".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::RoleMismatch => "Access denied for this role".to_string(),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::IncorrectPassword => "Current password is incorrect".to_string(),
                _ => INTERNAL_MESSAGE.to_string(),
            },
            Self::Ticket(err) => match err {
                TicketError::MissingFields(msg) => (*msg).to_string(),
                TicketError::InvalidEmail(_) => "Invalid employee email".to_string(),
                TicketError::NotFound => "Ticket not found".to_string(),
                TicketError::Repository(_) => INTERNAL_MESSAGE.to_string(),
            },
            Self::Profile(err) => match err {
                ProfileError::MissingUid => "UID is required".to_string(),
                ProfileError::NotFound => "Profile not found".to_string(),
                ProfileError::Repository(_) => INTERNAL_MESSAGE.to_string(),
            },
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::db::RepositoryError;

    async fn body_message(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, value["message"].as_str().unwrap().to_string())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::from(AuthError::UserAlreadyExists).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::RoleMismatch).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::UserNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(AuthError::IncorrectPassword).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(TicketError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ProfileError::MissingUid).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = AppError::from(TicketError::Repository(RepositoryError::DataCorruption(
            "row 7".to_string(),
        )));
        let (status, message) = body_message(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_client_error_body() {
        let (status, message) = body_message(AppError::from(TicketError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Ticket not found");
    }
}
