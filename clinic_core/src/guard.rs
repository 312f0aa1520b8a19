//! Route guarding based on session state.
//!
//! Two states, decided purely by token presence: there is no local validity
//! check, so a stale token is only discovered when a backend call answers
//! `Unauthorized`. Guarding prevents UI rendering, not access; the server
//! independently rejects invalid tokens on every call.

use crate::{Result, SessionStore};
use std::sync::Arc;

/// Views the client can navigate to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Doctors,
    Patients,
    Schedules,
}

impl Route {
    /// Whether a view requires an authenticated session to render
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

/// Session state as the guard sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

/// Per-navigation gate deciding whether a view may render.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Current state, from token presence alone.
    pub fn state(&self) -> AuthState {
        if self.session.token().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Resolve a navigation request: protected views redirect to the login
    /// view when unauthenticated, and nothing of the protected tree renders.
    pub fn resolve(&self, requested: Route) -> Route {
        if requested.is_protected() && self.state() == AuthState::Unauthenticated {
            tracing::info!("Redirecting {:?} to login: no session", requested);
            Route::Login
        } else {
            requested
        }
    }

    /// Transition to `Authenticated` after a successful login.
    pub fn store_login(&self, token: impl Into<String>) -> Result<()> {
        self.session.set(token)
    }

    /// Explicit logout. Idempotent.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    /// Session teardown forced by an `Unauthorized` outcome from any
    /// resource call, regardless of which screen triggered it.
    pub fn force_logout(&self) -> Result<()> {
        tracing::info!("Session rejected by backend, clearing token");
        self.session.clear()
    }

    /// Shared session handle, for components that read the token directly.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}
