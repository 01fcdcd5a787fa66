//! Wire types for the backend's JSON API.
//!
//! Field names follow the backend contract exactly; conversions to and
//! from the core's domain types live here so the rest of the crate never
//! touches raw JSON shapes.

use std::collections::BTreeMap;

use medsage_core::backend::FacilityLink;
use medsage_core::models::{ConversationTurn, SummaryPayload};
use serde::{Deserialize, Serialize};

/// One wire-level chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub human: String,
    pub ai: String,
}

impl From<&ConversationTurn> for Turn {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            human: turn.human.clone(),
            ai: turn.ai.clone(),
        }
    }
}

/// `POST /chat` request: the new query plus the full prior history.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub history: Vec<Turn>,
}

/// `POST /chat` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub ai_response: String,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub retrieved_context: Option<String>,
}

/// Patient details section of a report request. The backend treats every
/// field as optional text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub known_conditions: Option<String>,
}

/// `POST /generate_report` request.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub user_details: UserDetails,
    pub chat_history: Vec<Turn>,
}

impl From<&SummaryPayload> for ReportRequest {
    fn from(payload: &SummaryPayload) -> Self {
        Self {
            user_details: UserDetails {
                name: Some(payload.patient.name.clone()),
                dob: Some(payload.patient.date_of_birth.clone()),
                gender: Some(payload.patient.gender.clone()),
                age: Some(payload.patient.age.clone()),
                known_conditions: Some(payload.patient.symptoms.clone()),
            },
            chat_history: payload.turns.iter().map(Into::into).collect(),
        }
    }
}

/// `POST /extract_specialist` request.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractSpecialistRequest {
    pub chat_history: Vec<Turn>,
}

/// `POST /extract_specialist` response. `success: false` or an empty
/// specialist both mean "nothing found".
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractSpecialistResponse {
    pub success: bool,
    #[serde(default)]
    pub specialist: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /get_nearest_facilities` request.
#[derive(Debug, Clone, Serialize)]
pub struct FacilitiesRequest {
    pub pincode: String,
    pub specialist: String,
    pub facility_type: String,
}

/// One search link as the backend sends it: a keyed object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireFacilityLink {
    pub name: String,
    pub google_maps: String,
    pub google_search: String,
    pub display_text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `POST /get_nearest_facilities` response. `search_links` is keyed by
/// link id ("nearest_hospitals", ...); a `BTreeMap` keeps the flattened
/// order deterministic.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilitiesResponse {
    pub success: bool,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub search_links: Option<BTreeMap<String, WireFacilityLink>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FacilitiesResponse {
    /// Flatten the keyed link map into the core's link list.
    pub fn into_links(self) -> Vec<FacilityLink> {
        self.search_links
            .unwrap_or_default()
            .into_values()
            .map(|link| FacilityLink {
                name: link.name,
                maps_url: link.google_maps,
                search_url: link.google_search,
                display_text: link.display_text,
                kind: link.kind,
            })
            .collect()
    }
}
