//! Blocking HTTP client for the diagnostic backend.

use std::time::Duration;

use medsage_core::backend::{BackendError, DiagnosticBackend, FacilityLink, FacilityType};
use medsage_core::models::{ConversationTurn, SummaryPayload};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{
    ChatRequest, ChatResponse, ExtractSpecialistRequest, ExtractSpecialistResponse,
    FacilitiesRequest, FacilitiesResponse, ReportRequest,
};

/// Default per-request timeout. A timeout surfaces as an ordinary
/// transport failure; there is no retry at this layer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP implementation of [`DiagnosticBackend`].
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Client against a base URL (e.g. `http://localhost:8000/api`) with
    /// the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Client with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "backend request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        tracing::debug!(url = %url, "backend request ok");
        Ok(response)
    }

    fn post_json<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<R, BackendError> {
        self.post(path, body)?
            .json::<R>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl DiagnosticBackend for HttpBackend {
    fn chat(&self, query: &str, history: &[ConversationTurn]) -> Result<String, BackendError> {
        let request = ChatRequest {
            query: query.to_string(),
            history: history.iter().map(Into::into).collect(),
        };
        let response: ChatResponse = self.post_json("/chat", &request)?;
        Ok(response.ai_response)
    }

    fn generate_report(&self, payload: &SummaryPayload) -> Result<Vec<u8>, BackendError> {
        let request = ReportRequest::from(payload);
        let response = self.post("/generate_report", &request)?;
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    fn extract_specialist(
        &self,
        turns: &[ConversationTurn],
    ) -> Result<Option<String>, BackendError> {
        let request = ExtractSpecialistRequest {
            chat_history: turns.iter().map(Into::into).collect(),
        };
        let response: ExtractSpecialistResponse =
            self.post_json("/extract_specialist", &request)?;
        if !response.success {
            tracing::debug!(message = ?response.message, "specialist extraction unsuccessful");
            return Ok(None);
        }
        Ok(Some(response.specialist).filter(|s| !s.is_empty()))
    }

    fn find_facilities(
        &self,
        pincode: &str,
        specialist: &str,
        facility_type: FacilityType,
    ) -> Result<Vec<FacilityLink>, BackendError> {
        let request = FacilitiesRequest {
            pincode: pincode.to_string(),
            specialist: specialist.to_string(),
            facility_type: facility_type.to_string(),
        };
        let response: FacilitiesResponse = self.post_json("/get_nearest_facilities", &request)?;
        if !response.success {
            return Err(BackendError::Rejected(
                response.error.unwrap_or_else(|| "facility lookup failed".into()),
            ));
        }
        Ok(response.into_links())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let backend = HttpBackend::new("http://localhost:8000/api/").unwrap();
        assert_eq!(backend.url("/chat"), "http://localhost:8000/api/chat");
    }

    #[test]
    fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on this port; the connect fails fast.
        let backend =
            HttpBackend::with_timeout("http://127.0.0.1:1/api", Duration::from_millis(300))
                .unwrap();
        let result = backend.chat("hello", &[]);
        assert!(matches!(result, Err(BackendError::Transport(_))));
    }
}
