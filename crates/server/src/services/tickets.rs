//! Ticket lifecycle.
//!
//! Create, mark in progress, resolve. Each operation makes at most one store
//! call and then hands one notification to the dispatcher.
//!
//! Marking a ticket in progress does not touch the store. The notification
//! goes to the configured support desk contact rather than the ticket's own
//! contact details.

use chrono::Utc;
use thiserror::Error;

use helpdesk_core::{Email, EmailError, NotifyType, TicketId, TicketStatus};

use crate::config::FallbackContact;
use crate::db::{RepositoryError, TicketRepository};
use crate::models::{NewTicket, Ticket};
use crate::services::notify::{
    Notification, NotificationDispatcher, NotificationOutcome, Recipient,
};

/// Ticket operation errors.
#[derive(Debug, Error)]
pub enum TicketError {
    /// A required field was missing or blank.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Employee email is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No ticket with this ID.
    #[error("ticket not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Ticket fields as received from the client.
#[derive(Debug, Default)]
pub struct TicketInput<'a> {
    pub employee_email: Option<&'a str>,
    pub employee_phone: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub description: Option<&'a str>,
    pub notify_type: NotifyType,
}

/// Ticket lifecycle service.
pub struct TicketService<'a> {
    tickets: &'a dyn TicketRepository,
    notifier: &'a NotificationDispatcher,
    fallback: &'a FallbackContact,
}

impl<'a> TicketService<'a> {
    #[must_use]
    pub const fn new(
        tickets: &'a dyn TicketRepository,
        notifier: &'a NotificationDispatcher,
        fallback: &'a FallbackContact,
    ) -> Self {
        Self {
            tickets,
            notifier,
            fallback,
        }
    }

    /// Open a new ticket and notify the employee.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::MissingFields` if email, subject or description is
    /// blank, `TicketError::InvalidEmail` if the email is malformed.
    pub async fn create(
        &self,
        input: TicketInput<'_>,
    ) -> Result<(Ticket, NotificationOutcome), TicketError> {
        let (Some(email), Some(subject), Some(description)) = (
            present(input.employee_email),
            present(input.subject),
            present(input.description),
        ) else {
            return Err(TicketError::MissingFields(
                "Employee email, subject and description are required",
            ));
        };

        let ticket = self
            .tickets
            .create(NewTicket {
                employee_email: Email::parse(email)?,
                employee_phone: present(input.employee_phone).map(|p| p.trim().to_owned()),
                subject: subject.trim().to_owned(),
                description: description.to_owned(),
            })
            .await?;
        tracing::info!(ticket_id = %ticket.id, "Ticket created");

        let notification = Notification {
            subject: format!("Ticket Created: {}", ticket.subject),
            body: format!(
                "Your ticket \"{}\" has been created. Ticket ID: {}",
                ticket.subject, ticket.id
            ),
        };
        let outcome = self
            .notifier
            .dispatch(input.notify_type, recipient_of(&ticket), &notification)
            .await;

        Ok((ticket, outcome))
    }

    /// Notify the support desk that a ticket is being worked on.
    ///
    /// The ticket is neither looked up nor updated, so any ID is accepted.
    pub async fn mark_in_progress(
        &self,
        ticket_id: &str,
        notify_type: NotifyType,
    ) -> NotificationOutcome {
        tracing::info!(ticket_id = %ticket_id, "Ticket marked in progress");

        let notification = Notification {
            subject: "Ticket In Progress".to_owned(),
            body: format!("Ticket {ticket_id} is now in progress."),
        };
        let recipient = Recipient {
            email: Some(&self.fallback.email),
            phone: Some(&self.fallback.phone),
        };
        self.notifier
            .dispatch(notify_type, recipient, &notification)
            .await
    }

    /// Resolve a ticket and notify its employee.
    ///
    /// Resolving an already resolved ticket overwrites `resolved_at`.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::NotFound` without notifying anyone if the ticket
    /// does not exist.
    pub async fn resolve(
        &self,
        ticket_id: &str,
        notify_type: NotifyType,
    ) -> Result<(Ticket, NotificationOutcome), TicketError> {
        let id = parse_id(ticket_id)?;
        let ticket = self
            .tickets
            .set_status(id, TicketStatus::Resolved, Some(Utc::now()))
            .await?
            .ok_or(TicketError::NotFound)?;
        tracing::info!(ticket_id = %ticket.id, "Ticket resolved");

        let notification = Notification {
            subject: format!("Ticket Resolved: {}", ticket.subject),
            body: format!(
                "Your ticket \"{}\" (ID: {}) has been resolved.",
                ticket.subject, ticket.id
            ),
        };
        let outcome = self
            .notifier
            .dispatch(notify_type, recipient_of(&ticket), &notification)
            .await;

        Ok((ticket, outcome))
    }

    /// # Errors
    ///
    /// Returns `TicketError::NotFound` if the ticket does not exist.
    pub async fn get(&self, ticket_id: &str) -> Result<Ticket, TicketError> {
        self.tickets
            .get(parse_id(ticket_id)?)
            .await?
            .ok_or(TicketError::NotFound)
    }

    /// Tickets newest first, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Repository` if the store fails.
    pub async fn list(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>, TicketError> {
        Ok(self.tickets.list(status).await?)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// An ID that is not a UUID cannot name a stored ticket.
fn parse_id(ticket_id: &str) -> Result<TicketId, TicketError> {
    ticket_id.trim().parse().map_err(|_| TicketError::NotFound)
}

fn recipient_of(ticket: &Ticket) -> Recipient<'_> {
    Recipient {
        email: Some(ticket.employee_email.as_str()),
        phone: ticket.employee_phone.as_deref(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn input(notify_type: NotifyType) -> TicketInput<'static> {
        TicketInput {
            employee_email: Some("lineman@powergrid.in"),
            employee_phone: Some("+919811111111"),
            subject: Some("SCADA console frozen"),
            description: Some("HMI stopped refreshing at 10:40"),
            notify_type,
        }
    }

    #[tokio::test]
    async fn test_create_starts_open_and_skips_without_channel() {
        let store = MemoryStore::default();
        let notifier = NotificationDispatcher::disabled();
        let fallback = FallbackContact::default();
        let service = TicketService::new(&store, &notifier, &fallback);

        let (ticket, outcome) = service.create(input(NotifyType::None)).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.resolved_at.is_none());
        assert_eq!(outcome, NotificationOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_create_requires_subject() {
        let store = MemoryStore::default();
        let notifier = NotificationDispatcher::disabled();
        let fallback = FallbackContact::default();
        let service = TicketService::new(&store, &notifier, &fallback);

        let result = service
            .create(TicketInput {
                subject: None,
                ..input(NotifyType::Email)
            })
            .await;
        assert!(matches!(result, Err(TicketError::MissingFields(_))));
    }

    #[tokio::test]
    async fn test_resolve_sets_timestamp() {
        let store = MemoryStore::default();
        let notifier = NotificationDispatcher::disabled();
        let fallback = FallbackContact::default();
        let service = TicketService::new(&store, &notifier, &fallback);
        let (ticket, _) = service.create(input(NotifyType::None)).await.unwrap();

        let (resolved, outcome) = service
            .resolve(&ticket.id.to_string(), NotifyType::Sms)
            .await
            .unwrap();
        assert_eq!(resolved.status, TicketStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        // Twilio is not configured in this dispatcher.
        assert_eq!(outcome, NotificationOutcome::Failed);
    }

    #[tokio::test]
    async fn test_resolve_malformed_id_is_not_found() {
        let store = MemoryStore::default();
        let notifier = NotificationDispatcher::disabled();
        let fallback = FallbackContact::default();
        let service = TicketService::new(&store, &notifier, &fallback);

        let result = service.resolve("abc123", NotifyType::Email).await;
        assert!(matches!(result, Err(TicketError::NotFound)));
    }

    #[tokio::test]
    async fn test_in_progress_leaves_store_untouched() {
        let store = MemoryStore::default();
        let notifier = NotificationDispatcher::disabled();
        let fallback = FallbackContact::default();
        let service = TicketService::new(&store, &notifier, &fallback);
        let (ticket, _) = service.create(input(NotifyType::None)).await.unwrap();

        service
            .mark_in_progress(&ticket.id.to_string(), NotifyType::None)
            .await;

        assert_eq!(store.ticket(ticket.id).unwrap().status, TicketStatus::Open);
    }
}
