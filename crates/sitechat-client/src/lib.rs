//! Session/chat client core for sitechat
//!
//! This crate holds everything about the chat client that does not need a
//! browser: the wire types for the backend API, the bounded conversation
//! history, markdown rendering, and the `SessionClient` that drives the four
//! backend operations through injected HTTP and storage dependencies.

pub mod api;
pub mod history;
pub mod markdown;
pub mod protocol;
pub mod session;

pub use api::{ApiError, ChatApi, SessionStore, DEFAULT_SESSION_ID};
pub use history::{Exchange, MessageHistory, MAX_EXCHANGES};
pub use protocol::{
    ChatRequest, ChatResponse, ClearHistoryRequest, EndSessionRequest, HistoryResponse,
    ProcessUrlRequest, ProcessUrlResponse,
};
pub use session::{IngestOutcome, SendOutcome, SessionClient};
