//! Night Shift API server library.
//!
//! Exposes config, state, error handling, handlers, and routes so the
//! binary entrypoint and integration tests share the same building blocks.

pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
