//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was missing or blank.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] helpdesk_core::EmailError),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Stored role differs from the role the client logged in as.
    #[error("role mismatch")]
    RoleMismatch,

    /// Wrong password, or the account has no password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Current password did not verify during a password change.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Token signing error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
