//! Summary assembly and the facility-search sub-flow.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::backend::{BackendError, DiagnosticBackend, FacilityLink, FacilityType};
use crate::models::{ConversationTurn, PatientRecord, PatientText, SummaryPayload};

/// Summary-screen errors.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("invalid pincode: must be exactly 6 digits")]
    InvalidPincode,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type SummaryResult<T> = Result<T, SummaryError>;

/// Combine the patient record and chat history into the payload for the
/// external report collaborator.
///
/// Every patient field is normalized to text — absent values become empty
/// strings, never null — and a trailing pending turn is dropped.
pub fn build_payload(patient: &PatientRecord, turns: &[ConversationTurn]) -> SummaryPayload {
    let turns = turns
        .iter()
        .filter(|t| !t.is_pending())
        .cloned()
        .collect();
    SummaryPayload {
        patient: PatientText {
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth.to_string(),
            gender: patient.gender.to_string(),
            age: patient.age.to_string(),
            symptoms: patient.symptoms.clone().unwrap_or_default(),
        },
        turns,
    }
}

/// Is this a valid facility-search pincode (exactly 6 ASCII digits)?
pub fn valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

/// Validate the pincode locally, then delegate the facility lookup.
pub fn find_facilities(
    backend: &dyn DiagnosticBackend,
    pincode: &str,
    specialist: &str,
    facility_type: FacilityType,
) -> SummaryResult<Vec<FacilityLink>> {
    if !valid_pincode(pincode) {
        return Err(SummaryError::InvalidPincode);
    }
    Ok(backend.find_facilities(pincode, specialist, facility_type)?)
}

/// Caches the recommended specialist per chat-history snapshot.
///
/// Extraction runs at most once per snapshot: the history is
/// fingerprinted and the backend is only re-asked when the fingerprint
/// changes. A failed extraction is logged, leaves the recommendation
/// absent and is not retried for the same snapshot (the rest of the
/// summary stays usable). The cache lives in memory only.
#[derive(Default)]
pub struct SummaryAssembler {
    specialist: Option<String>,
    fingerprint: Option<String>,
}

impl SummaryAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recommended specialist for this history, asking the backend
    /// only when the history changed since the last call.
    pub fn request_specialist(
        &mut self,
        backend: &dyn DiagnosticBackend,
        turns: &[ConversationTurn],
    ) -> Option<String> {
        let fingerprint = history_fingerprint(turns);
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return self.specialist.clone();
        }
        self.fingerprint = Some(fingerprint);

        match backend.extract_specialist(turns) {
            Ok(specialist) => self.specialist = specialist,
            Err(e) => {
                tracing::warn!(error = %e, "specialist extraction failed");
                self.specialist = None;
            }
        }
        self.specialist.clone()
    }

    /// Cached recommendation without touching the backend.
    pub fn specialist(&self) -> Option<&str> {
        self.specialist.as_deref()
    }
}

fn history_fingerprint(turns: &[ConversationTurn]) -> String {
    let json = serde_json::to_string(turns).unwrap_or_default();
    hex::encode(Sha256::digest(json.as_bytes()))
}
