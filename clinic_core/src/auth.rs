//! Login and registration flows.
//!
//! Credentials pass through to the backend and are never retained; the only
//! thing kept from a successful login is the opaque session token.

use crate::client::{ApiClient, ApiOutcome};
use crate::guard::RouteGuard;
use crate::types::{Credentials, Registration};
use crate::Result;
use std::sync::Arc;

/// Result of a login attempt
#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    /// Token stored; the guard now resolves protected routes
    LoggedIn,
    /// Server-provided (or generic) message for the user
    Rejected(String),
}

/// Result of a registration attempt
#[derive(Clone, Debug, PartialEq)]
pub enum RegisterOutcome {
    /// Account created; the user can proceed to the login view
    Registered,
    Rejected(String),
}

/// Orchestrates authentication against the backend and the session store.
pub struct AuthFlow {
    client: Arc<ApiClient>,
    guard: RouteGuard,
}

impl AuthFlow {
    pub fn new(client: Arc<ApiClient>, guard: RouteGuard) -> Self {
        Self { client, guard }
    }

    /// Attempt a login; on success the token is persisted and the guard
    /// transitions to `Authenticated`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        match self.client.login(credentials).await {
            ApiOutcome::Success(token) => {
                self.guard.store_login(token)?;
                tracing::info!("Login successful for {}", credentials.email);
                Ok(LoginOutcome::LoggedIn)
            }
            ApiOutcome::Unauthorized => {
                Ok(LoginOutcome::Rejected(
                    "Invalid credentials, please try again.".into(),
                ))
            }
            ApiOutcome::Conflict(message) | ApiOutcome::Failure(message) => {
                Ok(LoginOutcome::Rejected(message))
            }
        }
    }

    /// Create an account. Success means the backend answered 201; the
    /// presentation layer then points the user at the login view.
    pub async fn register(&self, registration: &Registration) -> RegisterOutcome {
        match self.client.register(registration).await {
            ApiOutcome::Success(()) => {
                tracing::info!("Registered account for {}", registration.email);
                RegisterOutcome::Registered
            }
            ApiOutcome::Unauthorized => {
                RegisterOutcome::Rejected("Failed to register, please try again.".into())
            }
            ApiOutcome::Conflict(message) | ApiOutcome::Failure(message) => {
                RegisterOutcome::Rejected(message)
            }
        }
    }
}
