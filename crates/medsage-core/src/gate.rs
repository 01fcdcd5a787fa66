//! Navigation gates.
//!
//! Each screen declares the upstream state it needs before it may render.
//! The chat screen needs a persisted patient record; the summary screen
//! needs the record plus a non-empty history handed over explicitly by
//! the chat screen's exit transition (not re-read from storage).

use std::time::Duration;

use crate::models::{ConversationTurn, PatientRecord};
use crate::store::{keys, Storage};

/// How long the "missing patient details" state is shown before the
/// redirect to intake fires.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Decision for entering the chat screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationGate {
    /// A patient record exists; proceed with it.
    Proceed(PatientRecord),
    /// No record: show a transient error, then redirect to intake.
    RedirectToIntake { delay: Duration },
}

/// Decision for entering the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryGate {
    Proceed,
    /// Missing record or empty history: show "no data" with a manual way
    /// back to Home.
    NoData,
}

/// Gate the chat screen on a persisted patient record.
pub fn conversation_gate(storage: &Storage) -> ConversationGate {
    match storage.load::<PatientRecord>(keys::PATIENT) {
        Some(record) => ConversationGate::Proceed(record),
        None => ConversationGate::RedirectToIntake {
            delay: REDIRECT_DELAY,
        },
    }
}

/// Gate the summary screen on the explicitly handed-over state.
pub fn summary_gate(
    patient: Option<&PatientRecord>,
    turns: &[ConversationTurn],
) -> SummaryGate {
    if patient.is_some() && !turns.is_empty() {
        SummaryGate::Proceed
    } else {
        SummaryGate::NoData
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::Gender;
    use crate::store::MemoryStore;

    fn record() -> PatientRecord {
        PatientRecord::new(
            "Jane".into(),
            NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            Gender::Female,
            34,
            None,
        )
    }

    #[test]
    fn test_conversation_gate_without_record_redirects() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        assert_eq!(
            conversation_gate(&storage),
            ConversationGate::RedirectToIntake {
                delay: REDIRECT_DELAY
            }
        );
    }

    #[test]
    fn test_conversation_gate_with_record_proceeds() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        let record = record();
        storage.save(keys::PATIENT, &record).unwrap();

        assert_eq!(conversation_gate(&storage), ConversationGate::Proceed(record));
    }

    #[test]
    fn test_conversation_gate_with_malformed_record_redirects() {
        let store = Arc::new(MemoryStore::new());
        use crate::store::Store;
        store.put("medsage:patient_record", "{garbage").unwrap();

        let storage = Storage::new(store);
        assert!(matches!(
            conversation_gate(&storage),
            ConversationGate::RedirectToIntake { .. }
        ));
    }

    #[test]
    fn test_summary_gate_requires_both_inputs() {
        let record = record();
        let turns = vec![ConversationTurn {
            human: "a".into(),
            ai: "b".into(),
        }];

        assert_eq!(summary_gate(Some(&record), &turns), SummaryGate::Proceed);
        assert_eq!(summary_gate(None, &turns), SummaryGate::NoData);
        assert_eq!(summary_gate(Some(&record), &[]), SummaryGate::NoData);
    }
}
