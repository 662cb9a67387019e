use serde::{Deserialize, Serialize};

use crate::history::Exchange;

/// Request body for `POST /api/process-url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessUrlRequest {
    pub url: String,
    pub is_sitemap: bool,
    pub persist_embeddings: bool,
}

/// Response from `POST /api/process-url`
///
/// The backend creates a fresh ingestion session for every processed URL and
/// returns its id so the client can clean the session up on page unload.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessUrlResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Response from `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Request body for `POST /api/end-session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: String,
    pub persist: bool,
}

/// Request body for `POST /api/clear-history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearHistoryRequest {
    pub session_id: String,
}

/// Response from `GET /api/history`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub history: Vec<Exchange>,
}
