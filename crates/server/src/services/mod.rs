//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, password change, user directory
//! - `identity` - Best-effort password mirror to the identity provider
//! - `notify` - Email and SMS ticket notifications
//! - `profiles` - Per-user profile documents
//! - `tickets` - Ticket lifecycle

pub mod auth;
pub mod identity;
pub mod notify;
pub mod profiles;
pub mod tickets;
