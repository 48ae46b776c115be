//! Profile domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Contact and department metadata kept apart from the login record.
///
/// Keyed by the caller-supplied `uid`, which is not checked against the
/// user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload. On update, `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub uid: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}
