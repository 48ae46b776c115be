//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use helpdesk_core::{Email, UserId, UserRole};

/// A helpdesk user (domain type).
///
/// Never carries the password hash; repositories hand the hash out
/// separately so it cannot leak into a response by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized login email.
    pub email: Email,
    /// Corporate employee number, if provided.
    pub employee_id: Option<String>,
    /// Access role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub employee_id: Option<String>,
    pub role: UserRole,
    /// Argon2 PHC string; `None` for directory-only users created by `addUser`.
    pub password_hash: Option<String>,
}
