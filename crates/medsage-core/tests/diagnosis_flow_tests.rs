//! End-to-end scenarios across intake, gates, conversation and summary.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use medsage_core::conversation::ConversationSession;
use medsage_core::gate::{self, ConversationGate, SummaryGate, REDIRECT_DELAY};
use medsage_core::intake;
use medsage_core::models::{PatientFields, PatientRecord};
use medsage_core::store::{keys, MemoryStore, SqliteStore, Storage};
use medsage_core::summary;

fn jane() -> PatientFields {
    PatientFields {
        name: "Jane".into(),
        date_of_birth: "1990-05-01".into(),
        gender: "Female".into(),
        symptoms: Some("chest pain".into()),
    }
}

#[test]
fn intake_then_chat_then_summary() -> Result<()> {
    let storage = Storage::new(Arc::new(MemoryStore::new()));

    // Intake writes the record the chat gate requires.
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let record = intake::submit_at(&jane(), &storage, today)?;
    assert_eq!(record.age, 34);

    let ConversationGate::Proceed(gated) = gate::conversation_gate(&storage) else {
        panic!("gate should open after intake");
    };
    assert_eq!(gated, record);

    // The conversation accumulates turns and flips the completion flag.
    let mut session = ConversationSession::new(storage.clone());
    session.restore();
    session.append_human("I have chest pain when climbing stairs")?;
    session.complete_last("How long have you had this?")?;
    session.append_human("About a week")?;
    session.complete_last(
        "**Final Diagnosis:** possible angina\n**Recommended Specialist:** Cardiologist",
    )?;
    assert!(session.is_complete());

    // Explicit handoff opens the summary gate.
    assert_eq!(
        gate::summary_gate(Some(&record), session.completed_turns()),
        SummaryGate::Proceed
    );

    let payload = summary::build_payload(&record, session.turns());
    assert_eq!(payload.turns.len(), 2);
    assert_eq!(payload.patient.name, "Jane");
    assert_eq!(payload.patient.symptoms, "chest pain");
    Ok(())
}

#[test]
fn chat_screen_without_record_redirects_to_intake() {
    let storage = Storage::new(Arc::new(MemoryStore::new()));

    match gate::conversation_gate(&storage) {
        ConversationGate::RedirectToIntake { delay } => assert_eq!(delay, REDIRECT_DELAY),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn summary_without_handoff_shows_no_data() {
    let storage = Storage::new(Arc::new(MemoryStore::new()));
    let record = intake::submit(&jane(), &storage).unwrap();

    // Record exists but the chat screen handed nothing over.
    assert_eq!(gate::summary_gate(Some(&record), &[]), SummaryGate::NoData);
    assert_eq!(gate::summary_gate(None, &[]), SummaryGate::NoData);
}

#[test]
fn conversation_survives_reload_on_durable_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("medsage.db");

    {
        let storage = Storage::new(Arc::new(SqliteStore::open(&path)?));
        let mut session = ConversationSession::new(storage);
        session.restore();
        session.append_human("hello")?;
        session.complete_last("Severity Level: low")?;
    }

    // Same store, fresh process: history and flag come back.
    let storage = Storage::new(Arc::new(SqliteStore::open(&path)?));
    let mut session = ConversationSession::new(storage);
    session.restore();
    assert_eq!(session.turns().len(), 1);
    assert!(session.is_complete());
    Ok(())
}

#[test]
fn malformed_persisted_history_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    use medsage_core::store::Store;
    store
        .put("medsage:conversation_turns", "[{\"human\": 42}]")
        .unwrap();

    let mut session = ConversationSession::new(Storage::new(store));
    session.restore();
    assert!(session.turns().is_empty());
    assert!(!session.is_complete());
}

#[test]
fn cleared_flow_leaves_no_trace_in_storage() -> Result<()> {
    let storage = Storage::new(Arc::new(MemoryStore::new()));
    intake::submit(&jane(), &storage)?;

    let mut session = ConversationSession::new(storage.clone());
    session.append_human("hi")?;
    session.complete_last("final diagnosis: fine")?;
    session.clear();

    assert_eq!(
        storage.load::<Vec<medsage_core::models::ConversationTurn>>(keys::CONVERSATION),
        None
    );
    // The patient record is untouched by a conversation clear.
    assert!(storage.load::<PatientRecord>(keys::PATIENT).is_some());
    Ok(())
}
