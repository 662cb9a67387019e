use std::cell::{Ref, RefCell};

use crate::api::{ApiError, ChatApi, SessionStore, DEFAULT_SESSION_ID};
use crate::history::{Exchange, MessageHistory};
use crate::protocol::{ChatRequest, ClearHistoryRequest, EndSessionRequest, ProcessUrlRequest};

/// Fixed notice shown when a chat request fails at the transport level
pub const SEND_FAILURE_NOTICE: &str = "Error: Failed to send message. Please try again.";

/// Status line reported after a successful ingestion
pub const INGEST_SUCCESS_STATUS: &str = "Processing completed successfully";

/// Confirmation appended to the transcript after clearing history
pub const CLEAR_CONFIRMATION: &str = "Conversation history has been cleared.";

/// Result of a chat send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The trimmed input was empty; no request was issued
    Ignored,
    /// Assistant content to append to the transcript (markdown)
    Reply(String),
}

/// Result of a URL ingestion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub status: String,
}

/// The session/chat client
///
/// Constructed once per page with an injected HTTP backend and session-id
/// store. Mutable state sits behind `RefCell` so concurrent in-flight actions
/// can share one client without holding a borrow across an await; the wasm
/// event loop never preempts the short synchronous sections that touch it.
pub struct SessionClient<A: ChatApi> {
    api: A,
    session_id: String,
    ingest_session_id: RefCell<Option<String>>,
    history: RefCell<MessageHistory>,
}

impl<A: ChatApi> SessionClient<A> {
    pub fn new(api: A, store: &dyn SessionStore) -> Self {
        let session_id = store
            .load_session_id()
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

        Self {
            api,
            session_id,
            ingest_session_id: RefCell::new(None),
            history: RefCell::new(MessageHistory::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn history(&self) -> Ref<'_, MessageHistory> {
        self.history.borrow()
    }

    /// Ingestion session created by the most recent successful URL processing
    pub fn ingest_session_id(&self) -> Option<String> {
        self.ingest_session_id.borrow().clone()
    }

    /// Send one chat message; a whitespace-only input is ignored outright
    ///
    /// The exchange is recorded in the bounded history only when the server
    /// reports success. Server-side failures surface verbatim with an
    /// `Error: ` prefix; transport failures collapse to a fixed notice.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
        };

        match self.api.chat(&request).await {
            Ok(response) if response.success => {
                let reply = response.response.unwrap_or_default();
                self.history.borrow_mut().push(Exchange {
                    user: message.to_string(),
                    assistant: reply.clone(),
                });
                SendOutcome::Reply(reply)
            }
            Ok(response) => {
                SendOutcome::Reply(format!("Error: {}", response.error.unwrap_or_default()))
            }
            Err(e) => {
                log::error!("chat request failed: {}", e);
                SendOutcome::Reply(SEND_FAILURE_NOTICE.to_string())
            }
        }
    }

    /// Submit a URL (or sitemap) for ingestion; single attempt, no retry
    pub async fn process_url(
        &self,
        url: &str,
        is_sitemap: bool,
        persist_embeddings: bool,
    ) -> IngestOutcome {
        let request = ProcessUrlRequest {
            url: url.to_string(),
            is_sitemap,
            persist_embeddings,
        };

        match self.api.process_url(&request).await {
            Ok(response) if response.success => {
                if let Some(id) = response.session_id {
                    *self.ingest_session_id.borrow_mut() = Some(id);
                }
                IngestOutcome {
                    status: INGEST_SUCCESS_STATUS.to_string(),
                }
            }
            Ok(response) => IngestOutcome {
                status: format!("Error: {}", response.error.unwrap_or_default()),
            },
            Err(e) => IngestOutcome {
                status: format!("Error: {}", e),
            },
        }
    }

    /// Clear server-side and in-memory history
    ///
    /// On transport failure nothing is cleared; the caller logs and moves on.
    pub async fn clear_history(&self) -> Result<&'static str, ApiError> {
        let request = ClearHistoryRequest {
            session_id: self.session_id.clone(),
        };
        self.api.clear_history(&request).await?;

        self.history.borrow_mut().clear();
        Ok(CLEAR_CONFIRMATION)
    }

    /// Fire-and-forget session teardown, issued on page unload
    ///
    /// Only meaningful once an ingestion session exists; the response is
    /// ignored because the page may already be tearing down.
    pub async fn end_session(&self, persist: bool) {
        let session_id = match self.ingest_session_id() {
            Some(id) => id,
            None => return,
        };

        let request = EndSessionRequest {
            session_id,
            persist,
        };
        if let Err(e) = self.api.end_session(&request).await {
            log::debug!("end-session request failed: {}", e);
        }
    }

    /// Seed the in-memory history from the server's copy
    ///
    /// Returns the fetched exchanges for transcript rendering; failures leave
    /// the history untouched and return nothing.
    pub async fn load_history(&self) -> Vec<Exchange> {
        match self.api.fetch_history(&self.session_id).await {
            Ok(response) if response.success => {
                let mut history = self.history.borrow_mut();
                history.clear();
                for exchange in &response.history {
                    history.push(exchange.clone());
                }
                response.history
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                log::debug!("history fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_EXCHANGES;
    use crate::protocol::{ChatResponse, HistoryResponse, ProcessUrlResponse};
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockApi {
        chat_replies: RefCell<VecDeque<Result<ChatResponse, ApiError>>>,
        process_replies: RefCell<VecDeque<Result<ProcessUrlResponse, ApiError>>>,
        clear_reply: RefCell<Option<Result<(), ApiError>>>,
        history_reply: RefCell<Option<Result<HistoryResponse, ApiError>>>,
        chat_requests: RefCell<Vec<ChatRequest>>,
        process_requests: RefCell<Vec<ProcessUrlRequest>>,
        end_requests: RefCell<Vec<EndSessionRequest>>,
        clear_requests: RefCell<Vec<ClearHistoryRequest>>,
    }

    #[async_trait(?Send)]
    impl ChatApi for MockApi {
        async fn process_url(
            &self,
            request: &ProcessUrlRequest,
        ) -> Result<ProcessUrlResponse, ApiError> {
            self.process_requests.borrow_mut().push(request.clone());
            self.process_replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ProcessUrlResponse::default()))
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
            self.chat_requests.borrow_mut().push(request.clone());
            self.chat_replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ChatResponse::default()))
        }

        async fn end_session(&self, request: &EndSessionRequest) -> Result<(), ApiError> {
            self.end_requests.borrow_mut().push(request.clone());
            Ok(())
        }

        async fn clear_history(&self, request: &ClearHistoryRequest) -> Result<(), ApiError> {
            self.clear_requests.borrow_mut().push(request.clone());
            self.clear_reply.borrow_mut().take().unwrap_or(Ok(()))
        }

        async fn fetch_history(&self, _session_id: &str) -> Result<HistoryResponse, ApiError> {
            self.history_reply
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok(HistoryResponse::default()))
        }
    }

    struct FixedStore(Option<&'static str>);

    impl SessionStore for FixedStore {
        fn load_session_id(&self) -> Option<String> {
            self.0.map(|s| s.to_string())
        }
    }

    fn success_reply(text: &str) -> Result<ChatResponse, ApiError> {
        Ok(ChatResponse {
            success: true,
            response: Some(text.to_string()),
            error: None,
        })
    }

    #[test]
    fn test_session_id_defaults_when_store_empty() {
        let client = SessionClient::new(MockApi::default(), &FixedStore(None));
        assert_eq!(client.session_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn test_session_id_from_store() {
        let client = SessionClient::new(MockApi::default(), &FixedStore(Some("tab-42")));
        assert_eq!(client.session_id(), "tab-42");
    }

    #[tokio::test]
    async fn test_whitespace_message_is_ignored() {
        let client = SessionClient::new(MockApi::default(), &FixedStore(None));

        assert_eq!(client.send_message("   \n\t").await, SendOutcome::Ignored);
        assert!(client.api.chat_requests.borrow().is_empty());
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_successful_send_records_exchange() {
        let api = MockApi::default();
        api.chat_replies.borrow_mut().push_back(success_reply("**Hi!**"));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.send_message("Hello").await;
        assert_eq!(outcome, SendOutcome::Reply("**Hi!**".to_string()));

        let history: Vec<Exchange> = client.history().iter().cloned().collect();
        assert_eq!(
            history,
            vec![Exchange {
                user: "Hello".to_string(),
                assistant: "**Hi!**".to_string(),
            }]
        );

        let requests = client.api.chat_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "Hello");
        assert_eq!(requests[0].session_id, DEFAULT_SESSION_ID);
    }

    #[tokio::test]
    async fn test_send_trims_before_sending() {
        let api = MockApi::default();
        api.chat_replies.borrow_mut().push_back(success_reply("ok"));
        let client = SessionClient::new(api, &FixedStore(None));

        client.send_message("  Hello  ").await;
        assert_eq!(client.api.chat_requests.borrow()[0].message, "Hello");
    }

    #[tokio::test]
    async fn test_history_caps_at_five() {
        let api = MockApi::default();
        for n in 0..7 {
            api.chat_replies
                .borrow_mut()
                .push_back(success_reply(&format!("reply {}", n)));
        }
        let client = SessionClient::new(api, &FixedStore(None));

        for n in 0..7 {
            client.send_message(&format!("message {}", n)).await;
        }

        assert_eq!(client.history().len(), MAX_EXCHANGES);
        let users: Vec<String> = client.history().iter().map(|e| e.user.clone()).collect();
        assert_eq!(
            users,
            vec!["message 2", "message 3", "message 4", "message 5", "message 6"]
        );
    }

    #[tokio::test]
    async fn test_server_failure_surfaces_error_verbatim() {
        let api = MockApi::default();
        api.chat_replies.borrow_mut().push_back(Ok(ChatResponse {
            success: false,
            response: None,
            error: Some("no embeddings loaded".to_string()),
        }));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.send_message("Hello").await;
        assert_eq!(
            outcome,
            SendOutcome::Reply("Error: no embeddings loaded".to_string())
        );
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_fixed_notice() {
        let api = MockApi::default();
        api.chat_replies
            .borrow_mut()
            .push_back(Err(ApiError::Transport("connection refused".to_string())));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.send_message("Hello").await;
        assert_eq!(outcome, SendOutcome::Reply(SEND_FAILURE_NOTICE.to_string()));
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_process_url_success_captures_session() {
        let api = MockApi::default();
        api.process_replies.borrow_mut().push_back(Ok(ProcessUrlResponse {
            success: true,
            session_id: Some("ingest-7".to_string()),
            message: Some("Processing completed successfully".to_string()),
            error: None,
        }));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.process_url("https://example.com", false, true).await;
        assert_eq!(outcome.status, INGEST_SUCCESS_STATUS);
        assert_eq!(client.ingest_session_id(), Some("ingest-7".to_string()));

        let requests = client.api.process_requests.borrow();
        assert_eq!(requests[0].url, "https://example.com");
        assert!(!requests[0].is_sitemap);
        assert!(requests[0].persist_embeddings);
    }

    #[tokio::test]
    async fn test_process_url_server_failure() {
        let api = MockApi::default();
        api.process_replies.borrow_mut().push_back(Ok(ProcessUrlResponse {
            success: false,
            session_id: None,
            message: None,
            error: Some("crawl failed".to_string()),
        }));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.process_url("https://example.com", true, false).await;
        assert_eq!(outcome.status, "Error: crawl failed");
        assert_eq!(client.ingest_session_id(), None);
    }

    #[tokio::test]
    async fn test_process_url_transport_failure() {
        let api = MockApi::default();
        api.process_replies
            .borrow_mut()
            .push_back(Err(ApiError::Decode("not json".to_string())));
        let client = SessionClient::new(api, &FixedStore(None));

        let outcome = client.process_url("https://example.com", false, false).await;
        assert_eq!(outcome.status, "Error: invalid response: not json");
    }

    #[tokio::test]
    async fn test_clear_history_resets_state() {
        let api = MockApi::default();
        api.chat_replies.borrow_mut().push_back(success_reply("ok"));
        let client = SessionClient::new(api, &FixedStore(None));

        client.send_message("Hello").await;
        let confirmation = client.clear_history().await.unwrap();

        assert_eq!(confirmation, CLEAR_CONFIRMATION);
        assert!(client.history().is_empty());
        assert_eq!(client.api.clear_requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history_transport_failure_keeps_state() {
        let api = MockApi::default();
        api.chat_replies.borrow_mut().push_back(success_reply("ok"));
        *api.clear_reply.borrow_mut() =
            Some(Err(ApiError::Transport("connection reset".to_string())));
        let client = SessionClient::new(api, &FixedStore(None));

        client.send_message("Hello").await;
        assert!(client.clear_history().await.is_err());
        assert_eq!(client.history().len(), 1);
    }

    #[tokio::test]
    async fn test_end_session_noop_without_ingest_session() {
        let client = SessionClient::new(MockApi::default(), &FixedStore(None));
        client.end_session(true).await;
        assert!(client.api.end_requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_end_session_carries_persist_flag() {
        let api = MockApi::default();
        api.process_replies.borrow_mut().push_back(Ok(ProcessUrlResponse {
            success: true,
            session_id: Some("ingest-9".to_string()),
            message: None,
            error: None,
        }));
        let client = SessionClient::new(api, &FixedStore(None));

        client.process_url("https://example.com", false, false).await;
        client.end_session(true).await;

        let requests = client.api.end_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session_id, "ingest-9");
        assert!(requests[0].persist);
    }

    #[tokio::test]
    async fn test_load_history_seeds_bounded_memory() {
        let api = MockApi::default();
        let fetched: Vec<Exchange> = (0..7)
            .map(|n| Exchange {
                user: format!("question {}", n),
                assistant: format!("answer {}", n),
            })
            .collect();
        *api.history_reply.borrow_mut() = Some(Ok(HistoryResponse {
            success: true,
            history: fetched.clone(),
        }));
        let client = SessionClient::new(api, &FixedStore(None));

        let rendered = client.load_history().await;
        assert_eq!(rendered, fetched);
        assert_eq!(client.history().len(), MAX_EXCHANGES);
    }

    #[tokio::test]
    async fn test_load_history_failure_is_silent() {
        let api = MockApi::default();
        *api.history_reply.borrow_mut() =
            Some(Err(ApiError::Transport("offline".to_string())));
        let client = SessionClient::new(api, &FixedStore(None));

        assert!(client.load_history().await.is_empty());
        assert!(client.history().is_empty());
    }
}
