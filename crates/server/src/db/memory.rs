//! In-memory repositories.
//!
//! Used when no database URL is configured and by the test suites. Each map
//! sits behind its own lock; no lock is held across an `.await`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use helpdesk_core::{Email, TicketId, TicketStatus, UserId};

use super::{ProfileRepository, RepositoryError, TicketRepository, UserRepository};
use crate::models::{NewTicket, NewUser, Profile, ProfileUpdate, Ticket, User};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: Option<String>,
}

/// Process-local store implementing every repository trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, StoredUser>>,
    profiles: RwLock<HashMap<String, Profile>>,
    tickets: RwLock<HashMap<TicketId, Ticket>>,
}

impl MemoryStore {
    /// Number of stored users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Stored password hash for a user, if any.
    #[must_use]
    pub fn password_hash(&self, id: UserId) -> Option<String> {
        self.users
            .read()
            .get(&id)
            .and_then(|stored| stored.password_hash.clone())
    }

    /// Snapshot of a stored ticket.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.tickets.read().get(&id).cloned()
    }

    fn find_by_email(&self, email: &Email) -> Option<StoredUser> {
        self.users
            .read()
            .values()
            .find(|stored| &stored.user.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write();
        if users.values().any(|stored| stored.user.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            employee_id: user.employee_id,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(
            created.id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );

        Ok(created)
    }

    async fn get_with_password_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        Ok(self
            .find_by_email(email)
            .map(|stored| (stored.user, stored.password_hash)))
    }

    async fn get_with_password_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        Ok(self
            .users
            .read()
            .get(&id)
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut users = self.users.write();
        let Some(stored) = users.get_mut(&id) else {
            return Ok(false);
        };
        stored.password_hash = Some(password_hash.to_owned());
        stored.user.updated_at = Utc::now();
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .values()
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn upsert(&self, update: ProfileUpdate) -> Result<Profile, RepositoryError> {
        let mut profiles = self.profiles.write();
        let now = Utc::now();

        if let Some(stored) = profiles.get_mut(&update.uid) {
            merge(&mut stored.name, update.name);
            merge(&mut stored.phone, update.phone);
            merge(&mut stored.department, update.department);
            merge(&mut stored.role, update.role);
            stored.updated_at = now;
            return Ok(stored.clone());
        }

        let profile = Profile {
            uid: update.uid,
            name: update.name,
            phone: update.phone,
            department: update.department,
            role: update.role,
            updated_at: now,
        };
        profiles.insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }

    async fn get(&self, uid: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.read().get(uid).cloned())
    }
}

fn merge(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError> {
        let created = Ticket {
            id: TicketId::new(),
            employee_email: ticket.employee_email,
            employee_phone: ticket.employee_phone,
            subject: ticket.subject,
            description: ticket.description,
            status: TicketStatus::Open,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.tickets.write().insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        Ok(self.ticket(id))
    }

    async fn list(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>, RepositoryError> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .read()
            .values()
            .filter(|ticket| status.is_none_or(|s| ticket.status == s))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn set_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, RepositoryError> {
        let mut tickets = self.tickets.write();
        let Some(ticket) = tickets.get_mut(&id) else {
            return Ok(None);
        };
        ticket.status = status;
        ticket.resolved_at = resolved_at;
        Ok(Some(ticket.clone()))
    }
}
