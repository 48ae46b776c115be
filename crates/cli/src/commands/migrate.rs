//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! helpdesk-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `HELPDESK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/server/migrations/` and are embedded at
//! compile time.

use thiserror::Error;

use helpdesk_server::db::create_pool;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: HELPDESK_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending helpdesk migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to helpdesk database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running helpdesk migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Helpdesk migrations complete!");
    Ok(())
}
