//! `PostgreSQL` repositories.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use helpdesk_core::{Email, TicketId, TicketStatus, UserId, UserRole};

use super::{
    ProfileRepository, RepositoryError, TicketRepository, UserRepository, map_unique_violation,
};
use crate::models::{NewTicket, NewUser, Profile, ProfileUpdate, Ticket, User};

const USER_COLUMNS: &str =
    "id, name, email, employee_id, role, password_hash, created_at, updated_at";
const TICKET_COLUMNS: &str = "id, employee_email, employee_phone, subject, description, status, \
                              created_at, resolved_at";

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Email,
    employee_id: Option<String>,
    role: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_parts(self) -> Result<(User, Option<String>), RepositoryError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("user {}: {e}", self.id)))?;

        Ok((
            User {
                id: self.id,
                name: self.name,
                email: self.email,
                employee_id: self.employee_id,
                role,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.password_hash,
        ))
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        self.into_parts().map(|(user, _)| user)
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    uid: String,
    name: Option<String>,
    phone: Option<String>,
    department: Option<String>,
    role: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            uid: row.uid,
            name: row.name,
            phone: row.phone,
            department: row.department,
            role: row.role,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: TicketId,
    employee_email: Email,
    employee_phone: Option<String>,
    subject: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status: TicketStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("ticket {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            employee_email: row.employee_email,
            employee_phone: row.employee_phone,
            subject: row.subject,
            description: row.description,
            status,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

// =============================================================================
// Users
// =============================================================================

/// Repository for `helpdesk.user`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: UserId) -> Result<Option<UserRow>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM helpdesk.user WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_by_email(&self, email: &Email) -> Result<Option<UserRow>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM helpdesk.user WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO helpdesk.user (id, name, email, employee_id, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(UserId::new())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.employee_id)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "email"))?;

        row.into_user()
    }

    async fn get_with_password_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        self.fetch_by_email(email)
            .await?
            .map(UserRow::into_parts)
            .transpose()
    }

    async fn get_with_password_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        self.fetch_by_id(id)
            .await?
            .map(UserRow::into_parts)
            .transpose()
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE helpdesk.user SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM helpdesk.user ORDER BY created_at");
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(UserRow::into_user)
            .collect()
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// Repository for `helpdesk.profile`.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn upsert(&self, update: ProfileUpdate) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO helpdesk.profile (uid, name, phone, department, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uid) DO UPDATE
               SET name = COALESCE(EXCLUDED.name, helpdesk.profile.name),
                   phone = COALESCE(EXCLUDED.phone, helpdesk.profile.phone),
                   department = COALESCE(EXCLUDED.department, helpdesk.profile.department),
                   role = COALESCE(EXCLUDED.role, helpdesk.profile.role),
                   updated_at = now()
            RETURNING uid, name, phone, department, role, updated_at
            ",
        )
        .bind(&update.uid)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.department)
        .bind(&update.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, uid: &str) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT uid, name, phone, department, role, updated_at \
             FROM helpdesk.profile WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }
}

// =============================================================================
// Tickets
// =============================================================================

/// Repository for `helpdesk.ticket`.
#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    /// Create a new ticket repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError> {
        let sql = format!(
            "INSERT INTO helpdesk.ticket \
                 (id, employee_email, employee_phone, subject, description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TICKET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(TicketId::new())
            .bind(&ticket.employee_email)
            .bind(&ticket.employee_phone)
            .bind(&ticket.subject)
            .bind(&ticket.description)
            .bind(TicketStatus::Open.as_str())
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM helpdesk.ticket WHERE id = $1");
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Ticket::try_from)
            .transpose()
    }

    async fn list(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>, RepositoryError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM helpdesk.ticket \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(status.map(TicketStatus::as_str))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Ticket::try_from)
            .collect()
    }

    async fn set_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, RepositoryError> {
        let sql = format!(
            "UPDATE helpdesk.ticket SET status = $2, resolved_at = $3 \
             WHERE id = $1 \
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(resolved_at)
            .fetch_optional(&self.pool)
            .await?
            .map(Ticket::try_from)
            .transpose()
    }
}
