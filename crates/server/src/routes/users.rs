//! User directory.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use helpdesk_core::UserId;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddUserResponse {
    pub id: UserId,
    pub message: &'static str,
}

/// Add a user without a password.
#[instrument(skip_all)]
pub async fn add_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddUserRequest>,
) -> Result<Json<AddUserResponse>> {
    let user = AuthService::new(
        state.stores().users.as_ref(),
        state.identity(),
        state.tokens(),
    )
    .add_user(req.name.as_deref(), req.email.as_deref())
    .await?;

    Ok(Json(AddUserResponse {
        id: user.id,
        message: "User added successfully",
    }))
}

/// List all users. Requires a bearer token.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<Vec<User>>> {
    tracing::debug!(caller = %claims.sub, role = %claims.role, "Listing users");
    let users = AuthService::new(
        state.stores().users.as_ref(),
        state.identity(),
        state.tokens(),
    )
    .list_users()
    .await?;

    Ok(Json(users))
}
