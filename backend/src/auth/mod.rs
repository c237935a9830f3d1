//! Authentication module for user accounts, credentials and bearer tokens.
//!
//! This module provides registration, login, profile management, the token
//! lifecycle (issue, validate, refresh, revoke) and the middleware that guards
//! account routes.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod revocation;
pub mod routes;
pub mod service;
pub mod state;
pub mod token_service;
