//! POWERGRID IT helpdesk API library.
//!
//! This crate provides the server functionality as a library, allowing it
//! to be driven by the binary, the CLI and the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
