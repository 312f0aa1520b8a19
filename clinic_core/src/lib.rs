#![forbid(unsafe_code)]

//! Session-authenticated resource access layer for a clinic scheduling
//! backend.
//!
//! This crate provides:
//! - Domain types (doctors, patients, schedules) and their REST bindings
//! - Session token storage (durable, single key)
//! - A generic authenticated HTTP client with a fixed outcome taxonomy
//! - Route guarding from session state
//! - List controllers implementing the mutation-then-refresh discipline
//!
//! Presentation (forms, rendering, navigation mechanics) lives outside this
//! crate and only calls the contracts exposed here.

pub mod auth;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod logging;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use auth::{AuthFlow, LoginOutcome, RegisterOutcome};
pub use client::{ApiClient, ApiOutcome, GENERIC_ERROR};
pub use config::Config;
pub use controller::{Flow, ListController, Notice, Severity};
pub use error::{Error, Result};
pub use guard::{AuthState, Route, RouteGuard};
pub use session::SessionStore;
pub use types::*;
