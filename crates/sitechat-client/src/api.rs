use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{
    ChatRequest, ChatResponse, ClearHistoryRequest, EndSessionRequest, HistoryResponse,
    ProcessUrlRequest, ProcessUrlResponse,
};

/// Session id used when local storage holds none
pub const DEFAULT_SESSION_ID: &str = "default";

/// Transport-level failures: the request never produced a usable payload
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

/// HTTP backend for the chat API
///
/// Browser futures are not `Send`, so the trait is `?Send`; everything runs
/// on the single-threaded event loop anyway.
#[async_trait(?Send)]
pub trait ChatApi {
    async fn process_url(&self, request: &ProcessUrlRequest) -> Result<ProcessUrlResponse, ApiError>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
    async fn end_session(&self, request: &EndSessionRequest) -> Result<(), ApiError>;
    async fn clear_history(&self, request: &ClearHistoryRequest) -> Result<(), ApiError>;
    async fn fetch_history(&self, session_id: &str) -> Result<HistoryResponse, ApiError>;
}

/// Source of the persisted session identifier, read once at construction
pub trait SessionStore {
    fn load_session_id(&self) -> Option<String>;
}
