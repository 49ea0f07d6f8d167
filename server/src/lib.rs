//! Quiz statistics server library.
//!
//! Exposes the credential store, HTTP handlers and server factory so the
//! binary and the integration tests share one implementation.

pub mod config;
pub mod db;
pub mod handlers;
pub mod server;
pub mod state;
