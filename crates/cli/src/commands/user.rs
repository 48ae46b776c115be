//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin
//! HELPDESK_INITIAL_PASSWORD=... helpdesk-cli user create \
//!     -e it.head@powergrid.in -n "IT Head" -r admin
//!
//! # Create a support agent with an employee number
//! helpdesk-cli user create -e agent@powergrid.in -n "Agent" -r support \
//!     --employee-id PG0042 --password '...'
//! ```
//!
//! Without a password the user is created like `addUser` does: present in the
//! directory but unable to log in.

use thiserror::Error;

use helpdesk_core::{Email, EmailError, UserId, UserRole};
use helpdesk_server::db::postgres::PgUserRepository;
use helpdesk_server::db::{RepositoryError, UserRepository, create_pool};
use helpdesk_server::models::NewUser;
use helpdesk_server::services::auth::{AuthError, hash_password};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: HELPDESK_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Invalid role: {0}. Valid roles: admin, support, employee")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),
}

/// Options for `user create`.
pub struct CreateUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub employee_id: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Create a user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create(opts: CreateUser<'_>) -> Result<UserId, UserError> {
    // Strict here, unlike registration which falls back to `employee`
    let role: UserRole = opts
        .role
        .parse()
        .map_err(|_| UserError::InvalidRole(opts.role.to_owned()))?;
    let email = Email::parse(opts.email)?;

    let password_hash = opts.password.map(hash_password).transpose()?;

    let database_url = super::database_url().ok_or(UserError::MissingDatabaseUrl)?;
    tracing::info!("Connecting to helpdesk database...");
    let pool = create_pool(&database_url).await?;
    let users = PgUserRepository::new(pool);

    tracing::info!("Creating user: {} ({})", email, role);
    let has_password = password_hash.is_some();
    let user = users
        .create(NewUser {
            name: opts.name.trim().to_owned(),
            email,
            employee_id: opts.employee_id.map(str::to_owned),
            role,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(opts.email.to_owned()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    if !has_password {
        tracing::warn!("User has no password and cannot log in until one is set.");
    }

    Ok(user.id)
}
