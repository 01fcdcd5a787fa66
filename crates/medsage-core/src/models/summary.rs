//! Summary payload handed to the external report collaborator.

use serde::{Deserialize, Serialize};

use super::ConversationTurn;

/// Patient details normalized to plain text for the external boundary.
///
/// Every field is a `String`, never null: absent values become empty text.
/// The report collaborator must never see a missing field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientText {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub age: String,
    pub symptoms: String,
}

/// Derived payload for report generation and specialist extraction.
///
/// Assembled on demand from the persisted patient record plus the chat
/// history; never itself persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryPayload {
    pub patient: PatientText,
    pub turns: Vec<ConversationTurn>,
}
