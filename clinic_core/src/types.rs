//! Domain types for the clinic scheduling client.
//!
//! This module defines the wire-format records exchanged with the backend:
//! - Doctors, patients and schedules, plus their creation payloads
//! - Login/registration request bodies
//! - The `Resource` trait binding each collection to its REST paths
//!
//! Records are verbatim snapshots of server state; the client never invents
//! or patches fields locally.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Login credentials, used only as the `/login` request body
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Account registration payload for `/register`
#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login response body
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error body returned by the backend on failed login
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// A server-owned collection the client reads and mutates.
///
/// Implementations bind a record type to its REST paths and to the payload
/// type used when creating new entries. `list_path` defaults to the
/// collection path; schedules override it because the backend only exposes
/// a today's-appointments read.
pub trait Resource: DeserializeOwned + Clone {
    /// Creation payload posted to the collection path
    type Draft: Serialize;

    /// Lowercase label used in user-facing notices (e.g. "doctor")
    const NAME: &'static str;

    /// Path of the collection relative to the API base URL
    fn collection_path() -> &'static str;

    /// Path used for list reads (defaults to the collection path)
    fn list_path() -> &'static str {
        Self::collection_path()
    }

    /// Server-assigned identifier
    fn id(&self) -> i64;

    /// Client-side search predicate over the last snapshot.
    ///
    /// Operates purely on held data; filtering never triggers a network
    /// call and never mutates the snapshot itself.
    fn matches(&self, term: &str) -> bool;
}

// ============================================================================
// Doctors
// ============================================================================

/// A doctor as returned by the backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub specialty: String,
    /// Medical license id; unique server-side together with email
    pub crm: String,
    pub phone: String,
}

/// Payload for creating a doctor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub crm: String,
    pub phone: String,
}

impl Resource for Doctor {
    type Draft = NewDoctor;

    const NAME: &'static str = "doctor";

    fn collection_path() -> &'static str {
        "doctors"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.specialty.to_lowercase().contains(&term)
    }
}

// ============================================================================
// Patients
// ============================================================================

/// A patient as returned by the backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub phone: String,
    pub address: String,
    /// Optional free-text history; omitted from the wire when empty
    #[serde(
        rename = "medicalHistory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub medical_history: Option<String>,
}

/// Payload for creating a patient
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub phone: String,
    pub address: String,
    #[serde(
        rename = "medicalHistory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub medical_history: Option<String>,
}

impl Resource for Patient {
    type Draft = NewPatient;

    const NAME: &'static str = "patient";

    fn collection_path() -> &'static str {
        "patients"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, term: &str) -> bool {
        let lower = term.to_lowercase();
        self.name.to_lowercase().contains(&lower)
            || self.email.to_lowercase().contains(&lower)
            || self.phone.contains(term)
    }
}

// ============================================================================
// Schedules
// ============================================================================

/// Embedded doctor/patient summary inside an appointment.
///
/// Weak reference: the client only displays it, never owns or cascades the
/// referenced entity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// An appointment as returned by the today's-appointments read.
///
/// The backend embeds doctor/patient summaries in the read model; every
/// non-identifying field is optional because the payload omits what was
/// never filled in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: i64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub doctor: Option<PersonRef>,
    #[serde(default)]
    pub patient: Option<PersonRef>,
}

/// Payload for creating a schedule; references doctor/patient by id
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewSchedule {
    pub doctor_id: i64,
    pub patient_id: i64,
    pub date: String,
    pub time: String,
    pub description: String,
    pub status: String,
}

impl NewSchedule {
    /// Default status for freshly created schedules
    pub const DEFAULT_STATUS: &'static str = "pending";
}

impl Resource for Schedule {
    type Draft = NewSchedule;

    const NAME: &'static str = "schedule";

    fn collection_path() -> &'static str {
        "schedules"
    }

    // The backend only exposes today's appointments as a read.
    fn list_path() -> &'static str {
        "schedules/today"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, term: &str) -> bool {
        let lower = term.to_lowercase();
        let name_matches = |p: &Option<PersonRef>| {
            p.as_ref()
                .map(|r| r.name.to_lowercase().contains(&lower))
                .unwrap_or(false)
        };
        name_matches(&self.doctor)
            || name_matches(&self.patient)
            || self
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&lower))
                .unwrap_or(false)
    }
}
