//! Persistence for helpdesk users, profiles and tickets.
//!
//! # Tables (`helpdesk` schema)
//!
//! - `user` - Login records (one row per user, unique email)
//! - `profile` - Contact/department metadata keyed by caller-supplied uid
//! - `ticket` - Support tickets and their lifecycle status
//!
//! Every operation touches a single row; there are no cross-row
//! transactions. Concurrent writers to one row race with last-write-wins.
//!
//! # Backends
//!
//! - [`postgres`] - `PostgreSQL` via sqlx (production)
//! - [`memory`] - Process-local maps (development without a database, tests)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p helpdesk-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use helpdesk_core::{Email, TicketId, TicketStatus, UserId};

use crate::models::{NewTicket, NewUser, Profile, ProfileUpdate, Ticket, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// User storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Get a user together with their password hash, looked up by email.
    async fn get_with_password_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError>;

    /// Get a user together with their password hash, looked up by ID.
    async fn get_with_password_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError>;

    /// Replace a user's password hash.
    ///
    /// Returns `false` if the user does not exist.
    async fn update_password(&self, id: UserId, password_hash: &str)
    -> Result<bool, RepositoryError>;

    /// List all users, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Profile storage.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create the profile if absent, otherwise set the fields that are `Some`.
    async fn upsert(&self, update: ProfileUpdate) -> Result<Profile, RepositoryError>;

    /// Get a profile by uid.
    async fn get(&self, uid: &str) -> Result<Option<Profile>, RepositoryError>;
}

/// Ticket storage.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a new ticket with status `open`.
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError>;

    /// Get a ticket by ID.
    async fn get(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError>;

    /// List tickets newest first, optionally filtered by status.
    async fn list(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>, RepositoryError>;

    /// Overwrite a ticket's status and resolution timestamp.
    ///
    /// No transition rules apply. Returns `None` if the ticket does not exist.
    async fn set_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, RepositoryError>;
}

/// The repositories backing one running service.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pool: Option<PgPool>,
}

impl Stores {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            profiles: Arc::new(postgres::PgProfileRepository::new(pool.clone())),
            tickets: Arc::new(postgres::PgTicketRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories backed by a shared in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(&Arc::new(memory::MemoryStore::default()))
    }

    /// Repositories sharing an existing in-memory store, so callers can
    /// inspect what handlers wrote.
    #[must_use]
    pub fn from_memory(store: &Arc<memory::MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            profiles: store.clone(),
            tickets: store.clone(),
            pool: None,
        }
    }

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-violation into `Conflict`, everything else into `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
