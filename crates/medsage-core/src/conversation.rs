//! Conversation state machine.
//!
//! Owns the chat history for one diagnostic conversation: optimistic
//! append of the human message, in-place fill of the backend reply,
//! rollback on backend failure, and completion detection over reply text.
//!
//! Invariants:
//! - at most one turn is pending (empty `ai`), and it is always the last;
//! - the history is append-only apart from that single fill, the rollback
//!   of a failed exchange, and a full clear;
//! - the completion flag only moves false → true until `clear`.
//!
//! The history is persisted after every mutation so a reload can restore
//! it; persistence failures are logged and do not interrupt the
//! conversation.

use thiserror::Error;

use crate::models::ConversationTurn;
use crate::store::{keys, Storage};

/// Marker phrases that flip a conversation to "diagnosis complete" when
/// they appear in an assistant reply (case-insensitive substring match).
/// Best-effort heuristic over natural language: false positives and false
/// negatives are accepted.
pub const COMPLETION_MARKERS: [&str; 3] =
    ["final diagnosis", "recommended specialist", "severity level"];

/// Conversation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConversationError {
    #[error("message is empty")]
    EmptyInput,

    #[error("a request is already in flight")]
    RequestInFlight,

    #[error("no pending request to resolve")]
    NoPendingTurn,
}

pub type ConversationResult<T> = Result<T, ConversationError>;

/// Does this assistant reply contain a completion marker?
pub fn detects_completion(ai_text: &str) -> bool {
    let lower = ai_text.to_lowercase();
    COMPLETION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// State machine for one diagnostic conversation.
pub struct ConversationSession {
    storage: Storage,
    turns: Vec<ConversationTurn>,
    complete: bool,
    restored: bool,
}

impl ConversationSession {
    /// Create an empty session over the given storage scope.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            turns: Vec::new(),
            complete: false,
            restored: false,
        }
    }

    /// Hydrate the history from storage. Idempotent: only the first call
    /// reads; later calls are no-ops. Absent or malformed data starts an
    /// empty conversation.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        let Some(mut turns) = self.storage.load::<Vec<ConversationTurn>>(keys::CONVERSATION)
        else {
            return;
        };
        // A request cannot survive a reload; drop a persisted pending turn
        // rather than resurrect a reply that will never arrive.
        if turns.last().is_some_and(ConversationTurn::is_pending) {
            turns.pop();
        }
        self.complete = turns.iter().any(|t| detects_completion(&t.ai));
        self.turns = turns;
    }

    /// Append the human side of a new turn and mark it pending.
    ///
    /// Rejected without mutating the history when the text trims to empty
    /// or while a request is in flight; there is no queueing of messages.
    pub fn append_human(&mut self, text: &str) -> ConversationResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        if self.has_pending() {
            return Err(ConversationError::RequestInFlight);
        }
        self.turns.push(ConversationTurn::pending(text));
        self.persist();
        Ok(())
    }

    /// Fill the pending turn with the backend reply and run completion
    /// detection. Returns the (latched) completion flag.
    pub fn complete_last(&mut self, ai_text: &str) -> ConversationResult<bool> {
        let Some(last) = self.turns.last_mut().filter(|t| t.is_pending()) else {
            return Err(ConversationError::NoPendingTurn);
        };
        last.ai = ai_text.to_string();
        if detects_completion(ai_text) {
            self.complete = true;
        }
        self.persist();
        Ok(self.complete)
    }

    /// Roll back a failed exchange: the pending turn is removed entirely
    /// so no human message dangles without a reply. Returns the discarded
    /// turn for the caller's error surface.
    pub fn fail_last(&mut self, error: &str) -> ConversationResult<ConversationTurn> {
        if !self.has_pending() {
            return Err(ConversationError::NoPendingTurn);
        }
        let discarded = self.turns.pop().ok_or(ConversationError::NoPendingTurn)?;
        tracing::warn!(error = %error, "chat exchange failed, rolled back pending turn");
        self.persist();
        Ok(discarded)
    }

    /// Drop the whole conversation: history, completion flag and the
    /// persisted entry.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.complete = false;
        if let Err(e) = self.storage.clear(keys::CONVERSATION) {
            tracing::warn!(error = %e, "failed to clear persisted conversation");
        }
    }

    /// Full history, including a pending turn if one exists.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// History without a trailing pending turn.
    pub fn completed_turns(&self) -> &[ConversationTurn] {
        if self.has_pending() {
            &self.turns[..self.turns.len() - 1]
        } else {
            &self.turns
        }
    }

    /// Is a request currently in flight?
    pub fn has_pending(&self) -> bool {
        self.turns.last().is_some_and(ConversationTurn::is_pending)
    }

    /// Has a completion marker been seen? Latched until [`clear`].
    ///
    /// [`clear`]: ConversationSession::clear
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(keys::CONVERSATION, &self.turns) {
            tracing::warn!(error = %e, "failed to persist conversation");
        }
    }
}
