use async_trait::async_trait;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sitechat_client::{
    ApiError, ChatApi, ChatRequest, ChatResponse, ClearHistoryRequest, EndSessionRequest,
    HistoryResponse, ProcessUrlRequest, ProcessUrlResponse,
};

/// HTTP backend over `gloo_net`, talking to the same-origin API
pub struct GlooApi;

fn transport(e: gloo_net::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

impl GlooApi {
    /// POST a JSON body and decode the JSON reply
    ///
    /// The backend answers application-level failures with a JSON body too
    /// (even on 5xx), so the status code is not inspected here; only a
    /// network error or an undecodable body counts as a transport failure.
    async fn post_json<B, R>(url: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = Request::post(url)
            .json(body)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;

        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body, ignoring whatever comes back
    async fn post_json_ignore_body<B: Serialize>(url: &str, body: &B) -> Result<(), ApiError> {
        Request::post(url)
            .json(body)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl ChatApi for GlooApi {
    async fn process_url(&self, request: &ProcessUrlRequest) -> Result<ProcessUrlResponse, ApiError> {
        Self::post_json("/api/process-url", request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        Self::post_json("/api/chat", request).await
    }

    async fn end_session(&self, request: &EndSessionRequest) -> Result<(), ApiError> {
        Self::post_json_ignore_body("/api/end-session", request).await
    }

    async fn clear_history(&self, request: &ClearHistoryRequest) -> Result<(), ApiError> {
        Self::post_json_ignore_body("/api/clear-history", request).await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<HistoryResponse, ApiError> {
        let response = Request::get("/api/history")
            .query([("session_id", session_id)])
            .send()
            .await
            .map_err(transport)?;

        response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
