//! Ticket domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use helpdesk_core::{Email, TicketId, TicketStatus};

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub employee_email: Email,
    pub employee_phone: Option<String>,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for creating a ticket. New tickets always start `open`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub employee_email: Email,
    pub employee_phone: Option<String>,
    pub subject: String,
    pub description: String,
}
