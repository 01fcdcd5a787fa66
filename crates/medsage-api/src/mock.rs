//! Scripted backend for tests and offline development.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use medsage_core::backend::{BackendError, DiagnosticBackend, FacilityLink, FacilityType};
use medsage_core::models::{ConversationTurn, SummaryPayload};

/// In-memory [`DiagnosticBackend`] with scripted replies and a
/// switchable failure mode. Call counters let tests assert how often
/// each collaborator endpoint was actually hit.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<String>>,
    specialist: Mutex<Option<String>>,
    links: Mutex<Vec<FacilityLink>>,
    failing: AtomicBool,
    chat_calls: AtomicUsize,
    extract_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next chat reply. Without a queued reply the mock sends
    /// a generic follow-up question.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .expect("mock lock")
            .push_back(reply.into());
    }

    pub fn set_specialist(&self, specialist: Option<&str>) {
        *self.specialist.lock().expect("mock lock") = specialist.map(String::from);
    }

    pub fn set_links(&self, links: Vec<FacilityLink>) {
        *self.links.lock().expect("mock lock") = links;
    }

    /// When failing, every call returns a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("mock backend offline".into()));
        }
        Ok(())
    }
}

impl DiagnosticBackend for MockBackend {
    fn chat(&self, _query: &str, _history: &[ConversationTurn]) -> Result<String, BackendError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self
            .replies
            .lock()
            .expect("mock lock")
            .pop_front()
            .unwrap_or_else(|| "Can you tell me more about your symptoms?".into()))
    }

    fn generate_report(&self, _payload: &SummaryPayload) -> Result<Vec<u8>, BackendError> {
        self.check_available()?;
        Ok(b"%PDF-1.4 mock report".to_vec())
    }

    fn extract_specialist(
        &self,
        _turns: &[ConversationTurn],
    ) -> Result<Option<String>, BackendError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.specialist.lock().expect("mock lock").clone())
    }

    fn find_facilities(
        &self,
        _pincode: &str,
        _specialist: &str,
        _facility_type: FacilityType,
    ) -> Result<Vec<FacilityLink>, BackendError> {
        self.check_available()?;
        Ok(self.links.lock().expect("mock lock").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replies_in_order() {
        let mock = MockBackend::new();
        mock.push_reply("first");
        mock.push_reply("second");

        assert_eq!(mock.chat("a", &[]).unwrap(), "first");
        assert_eq!(mock.chat("b", &[]).unwrap(), "second");
        // Queue exhausted: generic follow-up.
        assert!(mock.chat("c", &[]).unwrap().contains("symptoms"));
        assert_eq!(mock.chat_calls(), 3);
    }

    #[test]
    fn test_failure_mode() {
        let mock = MockBackend::new();
        mock.set_failing(true);
        assert!(mock.chat("a", &[]).is_err());
        assert!(mock.extract_specialist(&[]).is_err());

        mock.set_failing(false);
        assert!(mock.chat("a", &[]).is_ok());
    }
}
