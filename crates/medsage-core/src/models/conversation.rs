//! Conversation turn model.

use serde::{Deserialize, Serialize};

/// One turn of the diagnostic chat: a human message paired with the
/// assistant reply.
///
/// `human` is set at creation and immutable afterward. `ai` starts empty
/// and is filled exactly once when the backend reply arrives; while it is
/// empty the turn is the pending request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub human: String,
    pub ai: String,
}

impl ConversationTurn {
    /// Create a pending turn awaiting its backend reply.
    pub fn pending(human: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: String::new(),
        }
    }

    /// A turn is pending until its reply has been filled in.
    pub fn is_pending(&self) -> bool {
        self.ai.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_turn() {
        let turn = ConversationTurn::pending("I have a headache");
        assert!(turn.is_pending());
        assert_eq!(turn.human, "I have a headache");
        assert!(turn.ai.is_empty());
    }

    #[test]
    fn test_filled_turn_not_pending() {
        let turn = ConversationTurn {
            human: "hi".into(),
            ai: "Tell me more.".into(),
        };
        assert!(!turn.is_pending());
    }
}
