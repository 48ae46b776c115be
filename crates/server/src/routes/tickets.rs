//! Ticket lifecycle routes.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use helpdesk_core::{NotifyType, TicketId, TicketStatus};

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Ticket;
use crate::services::notify::NotificationOutcome;
use crate::services::tickets::{TicketInput, TicketService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub employee_email: Option<String>,
    pub employee_phone: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub notify_type: Option<NotifyType>,
}

/// Body of the status-change endpoints. May be empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub notify_type: Option<NotifyType>,
}

impl NotifyRequest {
    fn from_body(body: &Bytes) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: TicketId,
    pub message: &'static str,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub notification: NotificationOutcome,
}

fn service(state: &AppState) -> TicketService<'_> {
    TicketService::new(
        state.stores().tickets.as_ref(),
        state.notifier(),
        &state.config().fallback_contact,
    )
}

/// Open a ticket.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTicketRequest>,
) -> Result<Json<CreatedResponse>> {
    let (ticket, notification) = service(&state)
        .create(TicketInput {
            employee_email: req.employee_email.as_deref(),
            employee_phone: req.employee_phone.as_deref(),
            subject: req.subject.as_deref(),
            description: req.description.as_deref(),
            notify_type: req.notify_type.unwrap_or_default(),
        })
        .await?;

    Ok(Json(CreatedResponse {
        id: ticket.id,
        message: "Ticket created successfully",
        notification,
    }))
}

/// List tickets, newest first. Requires a bearer token.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Ticket>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TicketStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    Ok(Json(service(&state).list(status).await?))
}

/// Ticket detail. Requires a bearer token.
#[instrument(skip(state, _claims))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_claims): RequireAuth,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>> {
    Ok(Json(service(&state).get(&ticket_id).await?))
}

/// Announce that work on a ticket has started.
#[instrument(skip(state, body))]
pub async fn in_progress(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    body: Bytes,
) -> Result<Json<StatusResponse>> {
    let req = NotifyRequest::from_body(&body)?;
    let notification = service(&state)
        .mark_in_progress(&ticket_id, req.notify_type.unwrap_or_default())
        .await;

    Ok(Json(StatusResponse {
        message: "Ticket marked as in progress",
        notification,
    }))
}

/// Resolve a ticket.
#[instrument(skip(state, body))]
pub async fn resolve(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    body: Bytes,
) -> Result<Json<StatusResponse>> {
    let req = NotifyRequest::from_body(&body)?;
    let (_, notification) = service(&state)
        .resolve(&ticket_id, req.notify_type.unwrap_or_default())
        .await?;

    Ok(Json(StatusResponse {
        message: "Ticket resolved successfully",
        notification,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_body_may_be_empty() {
        let req = NotifyRequest::from_body(&Bytes::from_static(b"  ")).unwrap();
        assert!(req.notify_type.is_none());
    }

    #[test]
    fn test_notify_body_unknown_channel() {
        let req = NotifyRequest::from_body(&Bytes::from_static(br#"{"notifyType":"fax"}"#))
            .unwrap();
        assert_eq!(req.notify_type, Some(NotifyType::None));
    }

    #[test]
    fn test_notify_body_malformed() {
        assert!(NotifyRequest::from_body(&Bytes::from_static(b"{notifyType")).is_err());
    }
}
