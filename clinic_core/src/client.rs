//! Authenticated HTTP client for the clinic scheduling backend.
//!
//! Every resource operation reduces its HTTP outcome to one of four
//! [`ApiOutcome`] kinds so callers handle failures uniformly instead of
//! re-deriving status-code meaning per screen. The client itself never
//! mutates the session; callers route `Unauthorized` outcomes into a
//! session teardown.

use crate::types::{Credentials, ErrorResponse, LoginResponse, Registration, Resource};
use crate::SessionStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;

/// User-facing message for failures without a better server-provided one
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

/// Classified result of one backend call.
///
/// One attempt per call: no retries, no timeout override beyond the
/// transport default.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiOutcome<T> {
    /// 2xx; payload is the parsed body for reads, or the raw status for
    /// writes (callers check 201 on create themselves)
    Success(T),
    /// The session is invalid or expired; callers must clear the session
    /// and redirect to the login view
    Unauthorized,
    /// Duplicate resource on create; carries the server's message verbatim
    Conflict(String),
    /// Anything else: network error, unexpected status, malformed response
    Failure(String),
}

/// Generic authenticated-request executor shared by every resource screen.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client for the given API base URL.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Request builder with the JSON content type and, when a session
    /// exists, the raw token in the `Authorization` header (this backend
    /// takes the bare token, no `Bearer` prefix).
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            request = request.header(AUTHORIZATION, token);
        }
        request
    }

    /// Authenticate with email/password; returns the session token on 200.
    ///
    /// Login does not require a session, so a 401 here means rejected
    /// credentials, not a teardown: the server's `error` field is surfaced
    /// as a plain failure message.
    pub async fn login(&self, credentials: &Credentials) -> ApiOutcome<String> {
        let response = match self
            .http
            .post(self.url("login"))
            .header(CONTENT_TYPE, "application/json")
            .json(credentials)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Login request failed: {}", e);
                return ApiOutcome::Failure(GENERIC_ERROR.into());
            }
        };

        if response.status() == StatusCode::OK {
            match response.json::<LoginResponse>().await {
                Ok(body) => ApiOutcome::Success(body.token),
                Err(e) => {
                    tracing::error!("Malformed login response: {}", e);
                    ApiOutcome::Failure(GENERIC_ERROR.into())
                }
            }
        } else {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Invalid credentials, please try again.".into());
            ApiOutcome::Failure(message)
        }
    }

    /// Create an account; the backend signals success with 201 and no
    /// structured body is assumed otherwise.
    pub async fn register(&self, registration: &Registration) -> ApiOutcome<()> {
        let response = match self
            .http
            .post(self.url("register"))
            .header(CONTENT_TYPE, "application/json")
            .json(registration)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Register request failed: {}", e);
                return ApiOutcome::Failure(GENERIC_ERROR.into());
            }
        };

        if response.status() == StatusCode::CREATED {
            ApiOutcome::Success(())
        } else {
            tracing::warn!("Register rejected with status {}", response.status());
            ApiOutcome::Failure("Failed to register, please try again.".into())
        }
    }

    /// Fetch the full collection for a resource.
    pub async fn list<R: Resource>(&self) -> ApiOutcome<Vec<R>> {
        let response = match self.request(Method::GET, R::list_path()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to fetch {}s: {}", R::NAME, e);
                return ApiOutcome::Failure(GENERIC_ERROR.into());
            }
        };

        let status = response.status();

        // The backend answers protected reads with either 401 or a bare
        // 500 when the token is invalid; both mean "re-authenticate".
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::info!("{} list returned {}, session rejected", R::NAME, status);
            return ApiOutcome::Unauthorized;
        }

        if !status.is_success() {
            tracing::warn!("{} list failed with status {}", R::NAME, status);
            return ApiOutcome::Failure(GENERIC_ERROR.into());
        }

        match response.json::<Vec<R>>().await {
            Ok(items) => ApiOutcome::Success(items),
            Err(e) => {
                tracing::error!("Malformed {} list response: {}", R::NAME, e);
                ApiOutcome::Failure(GENERIC_ERROR.into())
            }
        }
    }

    /// Create a resource. A 2xx status is returned as-is so callers can
    /// distinguish 201 from other successes; 409 carries the server's
    /// duplicate message verbatim.
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> ApiOutcome<StatusCode> {
        let response = match self
            .request(Method::POST, R::collection_path())
            .json(draft)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to create {}: {}", R::NAME, e);
                return ApiOutcome::Failure(GENERIC_ERROR.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            ApiOutcome::Success(status)
        } else if status == StatusCode::UNAUTHORIZED {
            ApiOutcome::Unauthorized
        } else if status == StatusCode::CONFLICT {
            let message = response.text().await.unwrap_or_default();
            ApiOutcome::Conflict(message)
        } else {
            tracing::warn!("{} create failed with status {}", R::NAME, status);
            ApiOutcome::Failure(GENERIC_ERROR.into())
        }
    }

    /// Delete a resource by id. Patients signal success with 204, doctors
    /// and schedules with any 2xx; the raw status is handed back.
    pub async fn remove<R: Resource>(&self, id: i64) -> ApiOutcome<StatusCode> {
        let path = format!("{}/{}", R::collection_path(), id);
        let response = match self.request(Method::DELETE, &path).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to delete {} {}: {}", R::NAME, id, e);
                return ApiOutcome::Failure(GENERIC_ERROR.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            ApiOutcome::Success(status)
        } else if status == StatusCode::UNAUTHORIZED {
            ApiOutcome::Unauthorized
        } else {
            tracing::warn!("{} delete failed with status {}", R::NAME, status);
            ApiOutcome::Failure(GENERIC_ERROR.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Doctor;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::load(temp_dir.path().join("session.json")));

        let client = ApiClient::new("http://localhost:8080/api/v1/", session);
        assert_eq!(
            client.url(Doctor::collection_path()),
            "http://localhost:8080/api/v1/doctors"
        );
        assert_eq!(client.url("doctors/5"), "http://localhost:8080/api/v1/doctors/5");
    }
}
