//! Domain models for the helpdesk.
//!
//! These are validated domain objects, separate from database row types.
//! They serialize with camelCase field names, matching what the web client
//! sends and expects.

pub mod profile;
pub mod ticket;
pub mod user;

pub use profile::{Profile, ProfileUpdate};
pub use ticket::{NewTicket, Ticket};
pub use user::{NewUser, User};
