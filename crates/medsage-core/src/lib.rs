//! MedSage Client Core Library
//!
//! Local-first client core for a guided diagnosis flow: patient intake,
//! a diagnostic chat with a backend assistant, then a summary with report
//! download and nearby-facility search.
//!
//! # Architecture
//!
//! ```text
//! Intake form ──validate──▶ PatientRecord ──▶ [session storage]
//!                                                    │
//!                                   gate: record required to enter chat
//!                                                    │
//!                                                    ▼
//!                   append_human ──▶ pending turn ──▶ backend /chat
//!                        ▲                                  │
//!                        │          complete_last ◀── reply │ failure ──▶ fail_last
//!                        │                │                             (full rollback)
//!                        │   completion markers latch "diagnosis complete"
//!                        │                │
//!                        └── gate: completion + explicit handoff to Summary
//!                                         │
//!                                         ▼
//!                         SummaryPayload ──▶ report PDF / specialist /
//!                                            facility search links
//! ```
//!
//! All intelligence lives behind the REST collaborator (see
//! [`backend::DiagnosticBackend`], implemented in `medsage-api`); this
//! crate owns the state, its invariants, and their persistence.
//!
//! # Modules
//!
//! - [`store`]: key/value persistence adapter (session + durable scopes)
//! - [`models`]: domain types (PatientRecord, ConversationTurn, ...)
//! - [`intake`]: patient form validation and submission
//! - [`conversation`]: chat state machine with completion detection
//! - [`summary`]: summary payload assembly and facility sub-flow
//! - [`gate`]: per-screen navigation guards
//! - [`render`]: sanitize-then-render transform for assistant text
//! - [`backend`]: contract for the external REST collaborator

pub mod backend;
pub mod conversation;
pub mod gate;
pub mod intake;
pub mod models;
pub mod render;
pub mod store;
pub mod summary;

// Re-export commonly used types
pub use backend::{BackendError, DiagnosticBackend, FacilityLink, FacilityType};
pub use conversation::{ConversationError, ConversationSession, COMPLETION_MARKERS};
pub use gate::{ConversationGate, SummaryGate, REDIRECT_DELAY};
pub use models::{ConversationTurn, Gender, PatientFields, PatientRecord, SummaryPayload};
pub use store::{MemoryStore, SessionVault, SqliteStore, Storage, Store, StoreError};
pub use summary::SummaryAssembler;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedsageError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conversation error: {0}")]
    ConversationError(String),

    #[error("Missing state: {0}")]
    MissingState(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for MedsageError {
    fn from(e: StoreError) -> Self {
        MedsageError::StorageError(e.to_string())
    }
}

impl From<intake::IntakeError> for MedsageError {
    fn from(e: intake::IntakeError) -> Self {
        match e {
            intake::IntakeError::Store(inner) => MedsageError::StorageError(inner.to_string()),
            other => MedsageError::ValidationError(other.to_string()),
        }
    }
}

impl From<ConversationError> for MedsageError {
    fn from(e: ConversationError) -> Self {
        MedsageError::ConversationError(e.to_string())
    }
}

impl From<serde_json::Error> for MedsageError {
    fn from(e: serde_json::Error) -> Self {
        MedsageError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedsageError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedsageError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the core with a durable store at the given path. Session state
/// lives in memory and dies with the process, like tab-scoped storage.
#[uniffi::export]
pub fn open_core(path: String) -> Result<Arc<MedsageCore>, MedsageError> {
    let durable = Storage::new(Arc::new(SqliteStore::open(&path)?));
    Ok(MedsageCore::with_storage(durable))
}

/// Open the core fully in memory (for testing).
#[uniffi::export]
pub fn open_core_in_memory() -> Result<Arc<MedsageCore>, MedsageError> {
    let durable = Storage::new(Arc::new(SqliteStore::open_in_memory()?));
    Ok(MedsageCore::with_storage(durable))
}

// =========================================================================
// Free Functions (exported to FFI)
// =========================================================================

/// Render assistant text as safe HTML (escape first, then the closed
/// allow-list of tags).
#[uniffi::export]
pub fn render_assistant_html(text: String) -> String {
    render::to_safe_html(&text)
}

/// Client-side pincode check used by the facility search form.
#[uniffi::export]
pub fn valid_pincode(pincode: String) -> bool {
    summary::valid_pincode(&pincode)
}

// =========================================================================
// Main API Object
// =========================================================================

struct CoreInner {
    session: Storage,
    conversation: ConversationSession,
    vault: SessionVault,
}

/// Thread-safe core wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedsageCore {
    inner: Mutex<CoreInner>,
}

impl MedsageCore {
    fn with_storage(durable: Storage) -> Arc<Self> {
        let session = Storage::new(Arc::new(MemoryStore::new()));
        Arc::new(Self {
            inner: Mutex::new(CoreInner {
                session: session.clone(),
                conversation: ConversationSession::new(session),
                vault: SessionVault::new(durable),
            }),
        })
    }
}

#[uniffi::export]
impl MedsageCore {
    // =====================================================================
    // Intake Operations
    // =====================================================================

    /// Validate the form, derive the age and persist the patient record.
    pub fn submit_patient(
        &self,
        fields: FfiPatientFields,
    ) -> Result<FfiPatientRecord, MedsageError> {
        let inner = self.inner.lock()?;
        let record = intake::submit(&fields.into(), &inner.session)?;
        Ok(record.into())
    }

    /// The persisted patient record, if intake has run.
    pub fn load_patient(&self) -> Result<Option<FfiPatientRecord>, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner
            .session
            .load::<PatientRecord>(store::keys::PATIENT)
            .map(Into::into))
    }

    // =====================================================================
    // Navigation Gates
    // =====================================================================

    /// May the chat screen render?
    pub fn chat_gate(&self) -> Result<FfiGateDecision, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(match gate::conversation_gate(&inner.session) {
            ConversationGate::Proceed(record) => FfiGateDecision::Proceed {
                patient: record.into(),
            },
            ConversationGate::RedirectToIntake { delay } => FfiGateDecision::RedirectToIntake {
                delay_ms: delay.as_millis() as u64,
            },
        })
    }

    /// May the summary screen render with the current handoff state?
    pub fn summary_gate_open(&self) -> Result<bool, MedsageError> {
        let inner = self.inner.lock()?;
        let patient = inner.session.load::<PatientRecord>(store::keys::PATIENT);
        let decision = gate::summary_gate(patient.as_ref(), inner.conversation.completed_turns());
        Ok(decision == SummaryGate::Proceed)
    }

    // =====================================================================
    // Conversation Operations
    // =====================================================================

    /// Hydrate the conversation from storage (idempotent) and return the
    /// restored history.
    pub fn restore_conversation(&self) -> Result<Vec<FfiTurn>, MedsageError> {
        let mut inner = self.inner.lock()?;
        inner.conversation.restore();
        Ok(inner.conversation.turns().iter().map(Into::into).collect())
    }

    /// Append the human side of a new turn. The host performs the backend
    /// exchange and resolves it via `complete_last` or `fail_last`.
    pub fn append_human(&self, text: String) -> Result<(), MedsageError> {
        let mut inner = self.inner.lock()?;
        inner.conversation.append_human(&text)?;
        Ok(())
    }

    /// Fill the pending turn with the backend reply; returns the latched
    /// completion flag.
    pub fn complete_last(&self, ai_text: String) -> Result<bool, MedsageError> {
        let mut inner = self.inner.lock()?;
        Ok(inner.conversation.complete_last(&ai_text)?)
    }

    /// Roll back the pending turn after a failed exchange; returns the
    /// discarded turn for the error banner.
    pub fn fail_last(&self, error: String) -> Result<FfiTurn, MedsageError> {
        let mut inner = self.inner.lock()?;
        let discarded = inner.conversation.fail_last(&error)?;
        Ok((&discarded).into())
    }

    /// Full history, including a pending turn if one exists.
    pub fn conversation_turns(&self) -> Result<Vec<FfiTurn>, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.conversation.turns().iter().map(Into::into).collect())
    }

    /// Is a request currently in flight?
    pub fn request_in_flight(&self) -> Result<bool, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.conversation.has_pending())
    }

    /// Has a completion marker been seen in any reply?
    pub fn diagnosis_complete(&self) -> Result<bool, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.conversation.is_complete())
    }

    /// Drop the conversation history and its persisted entry.
    pub fn clear_conversation(&self) -> Result<(), MedsageError> {
        let mut inner = self.inner.lock()?;
        inner.conversation.clear();
        Ok(())
    }

    /// Start a fresh diagnosis flow: conversation and patient record are
    /// both discarded.
    pub fn start_new_diagnosis(&self) -> Result<(), MedsageError> {
        let mut inner = self.inner.lock()?;
        inner.conversation.clear();
        inner.session.clear(store::keys::PATIENT)?;
        Ok(())
    }

    // =====================================================================
    // Summary Operations
    // =====================================================================

    /// Assemble the report payload as JSON for the host to hand to the
    /// backend. Fails with `MissingState` when the summary gate is shut.
    pub fn summary_payload_json(&self) -> Result<String, MedsageError> {
        let inner = self.inner.lock()?;
        let patient = inner
            .session
            .load::<PatientRecord>(store::keys::PATIENT)
            .ok_or_else(|| MedsageError::MissingState("no patient record".into()))?;
        let turns = inner.conversation.completed_turns();
        if turns.is_empty() {
            return Err(MedsageError::MissingState("no conversation history".into()));
        }
        let payload = summary::build_payload(&patient, turns);
        Ok(serde_json::to_string(&payload)?)
    }

    // =====================================================================
    // Session Blob Operations
    // =====================================================================

    /// Save a named JSON blob in durable storage.
    pub fn save_session(&self, name: String, json: String) -> Result<(), MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.vault.save(&name, &json)?)
    }

    /// Load a named JSON blob, if present.
    pub fn load_session(&self, name: String) -> Result<Option<String>, MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.vault.load(&name))
    }

    /// Remove a named JSON blob.
    pub fn clear_session(&self, name: String) -> Result<(), MedsageError> {
        let inner = self.inner.lock()?;
        Ok(inner.vault.clear(&name)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe intake form input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientFields {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub symptoms: Option<String>,
}

impl From<FfiPatientFields> for PatientFields {
    fn from(fields: FfiPatientFields) -> Self {
        PatientFields {
            name: fields.name,
            date_of_birth: fields.date_of_birth,
            gender: fields.gender,
            symptoms: fields.symptoms,
        }
    }
}

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub record_id: String,
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub age: u32,
    pub symptoms: Option<String>,
    pub created_at: String,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            record_id: record.record_id,
            name: record.name,
            date_of_birth: record.date_of_birth.to_string(),
            gender: record.gender.to_string(),
            age: record.age,
            symptoms: record.symptoms,
            created_at: record.created_at,
        }
    }
}

/// FFI-safe conversation turn.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTurn {
    pub human: String,
    pub ai: String,
}

impl From<&ConversationTurn> for FfiTurn {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            human: turn.human.clone(),
            ai: turn.ai.clone(),
        }
    }
}

/// FFI-safe chat-screen gate decision.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiGateDecision {
    Proceed { patient: FfiPatientRecord },
    RedirectToIntake { delay_ms: u64 },
}
