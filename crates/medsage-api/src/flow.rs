//! End-to-end sequencing of one diagnostic session against a backend.

use medsage_core::backend::{BackendError, DiagnosticBackend, FacilityLink, FacilityType};
use medsage_core::conversation::{ConversationError, ConversationSession};
use medsage_core::models::PatientRecord;
use medsage_core::summary::{self, SummaryAssembler, SummaryError};
use thiserror::Error;

/// Flow errors.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Pairs a [`ConversationSession`] with a [`DiagnosticBackend`] and keeps
/// the exchange protocol honest: optimistic append, at most one request
/// outstanding, reply filled in place, full rollback on failure.
pub struct DiagnosticFlow<B: DiagnosticBackend> {
    session: ConversationSession,
    backend: B,
    assembler: SummaryAssembler,
}

impl<B: DiagnosticBackend> DiagnosticFlow<B> {
    pub fn new(session: ConversationSession, backend: B) -> Self {
        Self {
            session,
            backend,
            assembler: SummaryAssembler::new(),
        }
    }

    /// One chat exchange: append the human message, send it with the
    /// prior history, and resolve the pending turn with the reply.
    ///
    /// On backend failure the pending turn is rolled back before the
    /// error is returned, so the history never holds an unanswered
    /// message. The caller re-triggers if the user wants to retry.
    pub fn send(&mut self, text: &str) -> FlowResult<String> {
        let text = text.trim();
        self.session.append_human(text)?;

        // History sent to the backend excludes the turn just appended.
        let history = self.session.completed_turns().to_vec();
        match self.backend.chat(text, &history) {
            Ok(ai_response) => {
                self.session.complete_last(&ai_response)?;
                Ok(ai_response)
            }
            Err(e) => {
                let _ = self.session.fail_last(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Download the PDF report for the current history.
    pub fn download_report(&self, patient: &PatientRecord) -> FlowResult<Vec<u8>> {
        let payload = summary::build_payload(patient, self.session.turns());
        Ok(self.backend.generate_report(&payload)?)
    }

    /// The recommended specialist, extracted at most once per history
    /// snapshot. `None` both when nothing was found and when the
    /// extraction failed (non-fatal).
    pub fn recommended_specialist(&mut self) -> Option<String> {
        self.assembler
            .request_specialist(&self.backend, self.session.completed_turns())
    }

    /// Facility search links for a pincode, using the cached specialist
    /// recommendation when one exists.
    pub fn find_facilities(
        &mut self,
        pincode: &str,
        facility_type: FacilityType,
    ) -> FlowResult<Vec<FacilityLink>> {
        let specialist = self.recommended_specialist().unwrap_or_default();
        Ok(summary::find_facilities(
            &self.backend,
            pincode,
            &specialist,
            facility_type,
        )?)
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConversationSession {
        &mut self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
