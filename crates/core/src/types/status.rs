//! Role and status enums shared by the server and CLI.

use serde::{Deserialize, Serialize};

/// Helpdesk user role.
///
/// Stored as lower-case text. Registration normalizes free-form input with
/// [`UserRole::normalize`]; login compares roles case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access including the user listing.
    Admin,
    /// Support agent working the ticket queue.
    Support,
    /// Regular employee raising tickets.
    #[default]
    Employee,
}

impl UserRole {
    /// Map free-form input onto the allow-list, defaulting to `Employee`.
    #[must_use]
    pub fn normalize(input: Option<&str>) -> Self {
        input
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Lower-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Support => "support",
            Self::Employee => "employee",
        }
    }

    /// Client route the UI should land on after login.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin-dashboard",
            Self::Support => "/support-dashboard",
            Self::Employee => "/employee-dashboard",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "support" | "agent" => Ok(Self::Support),
            "employee" => Ok(Self::Employee),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Ticket lifecycle status.
///
/// Transitions are plain overwrites; nothing enforces an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    /// Wire name (`open`, `in-progress`, `resolved`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("invalid ticket status: {s}")),
        }
    }
}

/// Notification channel requested by the client for a ticket operation.
///
/// Unknown values deserialize to [`NotifyType::None`] so a typo never fails
/// the ticket write; it just means nobody gets notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyType {
    Email,
    Sms,
    #[default]
    #[serde(other)]
    None,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalize() {
        assert_eq!(UserRole::normalize(Some("Admin")), UserRole::Admin);
        assert_eq!(UserRole::normalize(Some(" SUPPORT ")), UserRole::Support);
        assert_eq!(UserRole::normalize(Some("agent")), UserRole::Support);
        assert_eq!(UserRole::normalize(Some("superuser")), UserRole::Employee);
        assert_eq!(UserRole::normalize(None), UserRole::Employee);
    }

    #[test]
    fn test_role_dashboard_path() {
        assert_eq!(UserRole::Admin.dashboard_path(), "/admin-dashboard");
        assert_eq!(UserRole::Employee.dashboard_path(), "/employee-dashboard");
    }

    #[test]
    fn test_ticket_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            "resolved".parse::<TicketStatus>().unwrap(),
            TicketStatus::Resolved
        );
        assert!("closed".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_notify_type_unknown_is_none() {
        let parsed: NotifyType = serde_json::from_str("\"pigeon\"").unwrap();
        assert_eq!(parsed, NotifyType::None);
        let parsed: NotifyType = serde_json::from_str("\"sms\"").unwrap();
        assert_eq!(parsed, NotifyType::Sms);
    }
}
