//! Registration, login, logout and password change.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::models::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub employee_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub id: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
    pub redirect: &'static str,
}

fn service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        state.stores().users.as_ref(),
        state.identity(),
        state.tokens(),
    )
}

/// Register with email and password.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = service(&state)
        .register(Registration {
            name: req.name.as_deref(),
            email: req.email.as_deref(),
            password: req.password.as_deref(),
            employee_id: req.employee_id.as_deref(),
            role: req.role.as_deref(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// Log in as a specific role.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = service(&state)
        .login(
            req.email.as_deref(),
            req.password.as_deref(),
            req.role.as_deref(),
        )
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user: outcome.user,
        token: outcome.token,
        redirect: outcome.redirect,
    }))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "Logged out successfully" }))
}

/// Change password after verifying the current one.
#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse> {
    service(&state)
        .change_password(
            req.id.as_deref(),
            req.current_password.as_deref(),
            req.new_password.as_deref(),
        )
        .await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
