//! List controllers: the mutation-then-refresh discipline shared by every
//! resource screen.
//!
//! One `ListController` is instantiated per resource type (doctors,
//! patients, schedules). The snapshot it holds is only ever a verbatim copy
//! of the last successful server read; mutations never touch it locally,
//! they trigger a fresh fetch instead. Each controller serializes its own
//! operations (`&mut self`), so a single instance never has two calls of
//! the same kind in flight.

use crate::client::{ApiClient, ApiOutcome};
use crate::guard::RouteGuard;
use crate::types::Resource;
use reqwest::StatusCode;
use std::sync::Arc;

/// Notification severity for the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A transient user-facing notification, shown once then discarded
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// Navigation demanded by an operation's outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep rendering the current view
    Stay,
    /// The session was rejected; the presentation layer must leave the
    /// current view for the login view
    RedirectToLogin,
}

/// Binds one resource collection to view state.
pub struct ListController<R: Resource> {
    client: Arc<ApiClient>,
    guard: RouteGuard,
    items: Vec<R>,
    loading: bool,
    notice: Option<Notice>,
}

impl<R: Resource> ListController<R> {
    pub fn new(client: Arc<ApiClient>, guard: RouteGuard) -> Self {
        Self {
            client,
            guard,
            items: Vec::new(),
            loading: false,
            notice: None,
        }
    }

    /// Replace the snapshot with a fresh server read.
    ///
    /// On failure the prior snapshot stays untouched; a transient failure
    /// never clears a displayed list. The loading flag is cleared on every
    /// exit path.
    pub async fn load(&mut self) -> Flow {
        self.loading = true;
        let outcome = self.client.list::<R>().await;
        self.loading = false;

        match outcome {
            ApiOutcome::Success(items) => {
                tracing::debug!("Loaded {} {}s", items.len(), R::NAME);
                self.items = items;
                Flow::Stay
            }
            ApiOutcome::Unauthorized => self.teardown(),
            ApiOutcome::Conflict(message) | ApiOutcome::Failure(message) => {
                self.set_notice(Severity::Error, message);
                Flow::Stay
            }
        }
    }

    /// Create a resource, then refetch: the single source of truth after
    /// any write is a fresh read, never a local append.
    pub async fn create(&mut self, draft: &R::Draft) -> Flow {
        match self.client.create::<R>(draft).await {
            ApiOutcome::Success(status) if status == StatusCode::CREATED => {
                let flow = self.load().await;
                self.set_notice(
                    Severity::Success,
                    format!("{} created successfully.", title(R::NAME)),
                );
                flow
            }
            ApiOutcome::Success(status) => {
                tracing::warn!("{} create answered {} instead of 201", R::NAME, status);
                self.set_notice(
                    Severity::Error,
                    format!("Error adding {}. Please try again.", R::NAME),
                );
                Flow::Stay
            }
            ApiOutcome::Unauthorized => self.teardown(),
            // Duplicate: surface the server's message verbatim, list unchanged
            ApiOutcome::Conflict(message) => {
                self.set_notice(Severity::Error, message);
                Flow::Stay
            }
            ApiOutcome::Failure(message) => {
                self.set_notice(Severity::Error, message);
                Flow::Stay
            }
        }
    }

    /// Delete a resource, then refetch.
    ///
    /// Deletion is gated on explicit confirmation from the presentation
    /// layer; unconfirmed calls never reach the network. A failed delete is
    /// never reflected as removed.
    pub async fn remove(&mut self, id: i64, confirmed: bool) -> Flow {
        if !confirmed {
            tracing::debug!("{} {} delete not confirmed, skipping", R::NAME, id);
            return Flow::Stay;
        }

        match self.client.remove::<R>(id).await {
            ApiOutcome::Success(_) => {
                let flow = self.load().await;
                self.set_notice(
                    Severity::Success,
                    format!("{} deleted successfully.", title(R::NAME)),
                );
                flow
            }
            ApiOutcome::Unauthorized => self.teardown(),
            ApiOutcome::Conflict(message) | ApiOutcome::Failure(message) => {
                self.set_notice(Severity::Error, message);
                Flow::Stay
            }
        }
    }

    /// The last successful server snapshot (or the initial empty placeholder).
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Derived view of the snapshot for client-side search. Never triggers
    /// a network call and never mutates the canonical snapshot.
    pub fn filter(&self, term: &str) -> Vec<&R> {
        if term.trim().is_empty() {
            return self.items.iter().collect();
        }
        self.items.iter().filter(|item| item.matches(term)).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Take the pending notice, if any. One-shot: a notice is shown once
    /// and auto-dismissed.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn set_notice(&mut self, severity: Severity, message: impl Into<String>) {
        self.notice = Some(Notice {
            severity,
            message: message.into(),
        });
    }

    fn teardown(&mut self) -> Flow {
        if let Err(e) = self.guard.force_logout() {
            tracing::error!("Failed to clear rejected session: {}", e);
        }
        Flow::RedirectToLogin
    }
}

fn title(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Patient, Resource};
    use crate::SessionStore;

    fn controller_with_items(items: Vec<Patient>) -> (tempfile::TempDir, ListController<Patient>) {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::load(temp_dir.path().join("session.json")));
        let guard = RouteGuard::new(Arc::clone(&session));
        // Port 9 is discard; nothing in these tests performs a request
        let client = Arc::new(ApiClient::new("http://127.0.0.1:9/api/v1", session));
        let mut controller = ListController::new(client, guard);
        controller.items = items;
        (temp_dir, controller)
    }

    fn patient(id: i64, name: &str, email: &str) -> Patient {
        Patient {
            id,
            name: name.into(),
            email: email.into(),
            age: 30,
            phone: "555-0100".into(),
            address: "Rua A".into(),
            medical_history: None,
        }
    }

    #[test]
    fn test_filter_is_a_derived_view() {
        let (_dir, controller) = controller_with_items(vec![
            patient(1, "Maria Souza", "maria@example.com"),
            patient(2, "Joao Lima", "joao@example.com"),
        ]);

        let filtered = controller.filter("maria");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);

        // Canonical snapshot untouched
        assert_eq!(controller.items().len(), 2);
    }

    #[test]
    fn test_filter_empty_term_returns_full_snapshot() {
        let (_dir, controller) = controller_with_items(vec![
            patient(1, "Maria", "m@example.com"),
            patient(2, "Joao", "j@example.com"),
        ]);

        assert_eq!(controller.filter("").len(), 2);
        assert_eq!(controller.filter("   ").len(), 2);
    }

    #[test]
    fn test_notice_is_one_shot() {
        let (_dir, mut controller) = controller_with_items(vec![]);
        controller.set_notice(Severity::Success, "Patient created successfully.");

        let notice = controller.take_notice().unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert!(controller.take_notice().is_none());
    }

    #[tokio::test]
    async fn test_unconfirmed_remove_issues_no_call() {
        let (_dir, mut controller) =
            controller_with_items(vec![patient(1, "Maria", "m@example.com")]);

        // An issued call against the unreachable client would leave a
        // failure notice behind
        let flow = controller.remove(1, false).await;
        assert_eq!(flow, Flow::Stay);
        assert!(controller.take_notice().is_none());
        assert_eq!(controller.items().len(), 1);
    }

    #[test]
    fn test_title_labels() {
        assert_eq!(title(Patient::NAME), "Patient");
        assert_eq!(title(""), "");
    }
}
