//! Profile documents.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::models::Profile;
use crate::services::profiles::{ProfileInput, ProfileService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub uid: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub profile: Profile,
}

/// Create a profile or update the fields present in the body.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let profile = ProfileService::new(state.stores().profiles.as_ref())
        .update(ProfileInput {
            uid: req.uid.as_deref(),
            name: req.name.as_deref(),
            phone: req.phone.as_deref(),
            department: req.department.as_deref(),
            role: req.role.as_deref(),
        })
        .await?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully",
        profile,
    }))
}

/// Fetch a profile by uid.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(uid): Path<String>) -> Result<Json<Profile>> {
    let profile = ProfileService::new(state.stores().profiles.as_ref())
        .get(&uid)
        .await?;
    Ok(Json(profile))
}
