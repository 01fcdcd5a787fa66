//! Property tests for the conversation state machine.
//!
//! These check the structural invariants of the chat history under
//! arbitrary operation sequences: at most one pending turn (always last),
//! completed round-trips match the number of successful exchanges, and
//! the completion flag only ever latches.

use std::sync::Arc;

use medsage_core::conversation::{detects_completion, ConversationSession};
use medsage_core::store::{MemoryStore, Storage};
use proptest::prelude::*;

fn session() -> ConversationSession {
    ConversationSession::new(Storage::new(Arc::new(MemoryStore::new())))
}

/// One scripted operation against the state machine.
#[derive(Debug, Clone)]
enum Op {
    Append(String),
    Complete(String),
    Fail,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,12}".prop_map(Op::Append),
        prop_oneof![
            Just("noted, go on".to_string()),
            Just("Final Diagnosis: rest".to_string()),
            "[a-z ]{0,20}".prop_map(String::from),
        ]
        .prop_map(Op::Complete),
        Just(Op::Fail),
        Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn completed_round_trips_are_counted(
        exchanges in proptest::collection::vec(("[a-z]{1,12}", "[a-z]{1,12}"), 1..8)
    ) {
        let mut s = session();
        for (human, ai) in &exchanges {
            s.append_human(human).unwrap();
            s.complete_last(ai).unwrap();
        }

        prop_assert_eq!(s.turns().len(), exchanges.len());
        for turn in s.turns() {
            prop_assert!(!turn.human.is_empty());
            prop_assert!(!turn.ai.is_empty());
        }
    }

    #[test]
    fn at_most_one_pending_and_always_last(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut s = session();
        let mut expect_complete = false;

        for op in ops {
            match op {
                Op::Append(text) => {
                    let _ = s.append_human(&text);
                }
                Op::Complete(ai) => {
                    if s.complete_last(&ai).is_ok() && detects_completion(&ai) {
                        expect_complete = true;
                    }
                }
                Op::Fail => {
                    let _ = s.fail_last("backend down");
                }
                Op::Clear => {
                    s.clear();
                    expect_complete = false;
                }
            }

            let pending = s.turns().iter().filter(|t| t.is_pending()).count();
            prop_assert!(pending <= 1);
            if pending == 1 {
                prop_assert!(s.turns().last().unwrap().is_pending());
            }
            // The flag only latches; it never clears except via clear().
            prop_assert_eq!(s.is_complete(), expect_complete);
        }
    }

    #[test]
    fn rejected_append_never_mutates(first in "[a-z]{1,12}", second in "[a-z]{1,12}") {
        let mut s = session();
        s.append_human(&first).unwrap();
        let before = s.turns().to_vec();

        prop_assert!(s.append_human(&second).is_err());
        prop_assert_eq!(s.turns(), before.as_slice());
    }

    #[test]
    fn failed_exchange_is_a_full_rollback(
        exchanges in proptest::collection::vec(("[a-z]{1,12}", "[a-z]{1,12}"), 0..5),
        lost in "[a-z]{1,12}"
    ) {
        let mut s = session();
        for (human, ai) in &exchanges {
            s.append_human(human).unwrap();
            s.complete_last(ai).unwrap();
        }
        let before = s.turns().to_vec();

        s.append_human(&lost).unwrap();
        s.fail_last("503").unwrap();

        prop_assert_eq!(s.turns(), before.as_slice());
    }
}
