//! Contract for the external diagnostic backend.
//!
//! The backend is an opaque REST collaborator: it runs the diagnostic
//! model, renders PDFs and builds facility search links. This module only
//! defines the seam; `medsage-api` provides the HTTP implementation and a
//! scripted mock.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConversationTurn, SummaryPayload};

/// Failures reported by any collaborator call. Nothing here is fatal:
/// callers surface these as dismissible errors and the user re-triggers
/// the action (no automatic retry).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("backend reported failure: {0}")]
    Rejected(String),
}

/// Kind of facility to search for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FacilityType {
    All,
    Hospital,
    Clinic,
    Nursing,
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FacilityType::All => "all",
            FacilityType::Hospital => "hospital",
            FacilityType::Clinic => "clinic",
            FacilityType::Nursing => "nursing",
        };
        write!(f, "{s}")
    }
}

/// One facility search link produced by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacilityLink {
    /// Display name, e.g. "Nearest Hospitals"
    pub name: String,
    /// Maps search URL
    pub maps_url: String,
    /// Plain web search URL
    pub search_url: String,
    /// The human-readable query behind the links
    pub display_text: String,
    /// Facility kind ("hospitals", "clinics", ...)
    pub kind: String,
}

/// The REST collaborator consumed by the client core.
pub trait DiagnosticBackend {
    /// One diagnostic exchange: the new query plus the full prior
    /// history; returns the assistant's next reply.
    fn chat(&self, query: &str, history: &[ConversationTurn]) -> Result<String, BackendError>;

    /// Render the summary payload into PDF bytes.
    fn generate_report(&self, payload: &SummaryPayload) -> Result<Vec<u8>, BackendError>;

    /// Best-effort specialist inference over the conversation. `None`
    /// when the backend finds nothing.
    fn extract_specialist(
        &self,
        turns: &[ConversationTurn],
    ) -> Result<Option<String>, BackendError>;

    /// Facility search links for a pincode. The pincode is validated by
    /// the caller; see [`crate::summary::find_facilities`].
    fn find_facilities(
        &self,
        pincode: &str,
        specialist: &str,
        facility_type: FacilityType,
    ) -> Result<Vec<FacilityLink>, BackendError>;
}
