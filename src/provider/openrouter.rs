//! OpenRouter-compatible provider adapter.
//!
//! Targets the OpenAI-style surface OpenRouter exposes; any endpoint with
//! the same shape works by overriding the base URL. The credential travels
//! only as a bearer header on requests to this endpoint and is never
//! logged.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::types::{
    CatalogResponse, ChatClient, ChatCompletionRequest, ChatCompletionResponse, ModelDescriptor,
};
use super::ProviderError;

/// Hosted chat-completion client.
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    /// Create a client for an OpenAI-compatible endpoint.
    ///
    /// No request timeouts are layered on top of the transport; whatever
    /// the HTTP client enforces is inherited as-is.
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn map_transport_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, "issuing chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parsed.first_content().ok_or(ProviderError::EmptyCompletion)
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ProviderError> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(parsed.data.into_iter().map(ModelDescriptor::from).collect())
    }
}

// ──────────────────────────────────────────────
// Mock client
// ──────────────────────────────────────────────

/// Scripted reply for one model id.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Content(String),
    HttpStatus(u16),
    Offline,
}

/// Mock chat client for tests. Replies per model id and records the
/// invocation order.
///
/// Each `with_*` call pushes one reply onto that model's queue. Calls pop
/// the queue until a single reply remains, which then repeats, so a model
/// can answer an OCR call and an analysis call with different content.
pub struct MockChatClient {
    scripted: Mutex<HashMap<String, VecDeque<ScriptedReply>>>,
    catalog: Result<Vec<ModelDescriptor>, String>,
    calls: Mutex<Vec<String>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(HashMap::new()),
            catalog: Ok(vec![]),
            calls: Mutex::new(vec![]),
        }
    }

    fn push(self, model: &str, reply: ScriptedReply) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.entry(model.to_string()).or_default().push_back(reply);
        }
        self
    }

    /// Script a successful completion for a model.
    pub fn with_content(self, model: &str, content: &str) -> Self {
        self.push(model, ScriptedReply::Content(content.to_string()))
    }

    /// Script an HTTP error status for a model.
    pub fn with_http_error(self, model: &str, status: u16) -> Self {
        self.push(model, ScriptedReply::HttpStatus(status))
    }

    /// Script a transport failure for a model.
    pub fn with_offline(self, model: &str) -> Self {
        self.push(model, ScriptedReply::Offline)
    }

    /// Script the model catalog.
    pub fn with_catalog(mut self, models: Vec<ModelDescriptor>) -> Self {
        self.catalog = Ok(models);
        self
    }

    /// Make the catalog fetch fail.
    pub fn with_catalog_error(mut self, reason: &str) -> Self {
        self.catalog = Err(reason.to_string());
        self
    }

    /// Model ids in the order they were invoked.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn next_reply(&self, model: &str) -> Option<ScriptedReply> {
        let mut scripted = self.scripted.lock().ok()?;
        let queue = scripted.get_mut(model)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.model.clone());
        }
        match self.next_reply(&request.model) {
            Some(ScriptedReply::Content(text)) => Ok(text),
            Some(ScriptedReply::HttpStatus(status)) => Err(ProviderError::Api {
                status,
                body: "scripted error".into(),
            }),
            Some(ScriptedReply::Offline) => {
                Err(ProviderError::Network("scripted transport failure".into()))
            }
            None => Err(ProviderError::Api {
                status: 404,
                body: format!("no scripted reply for {}", request.model),
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ProviderError> {
        match &self.catalog {
            Ok(models) => Ok(models.clone()),
            Err(reason) => Err(ProviderError::Network(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::ChatMessage;

    fn request(model: &str) -> ChatCompletionRequest {
        ChatCompletionRequest::new(model, vec![ChatMessage::user_text("Extract all text.")])
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hemoglobin: 13.5"}}]}"#)
            .create_async()
            .await;

        let client = OpenRouterClient::new("test-key", &server.url());
        let text = client.complete(&request("openai/gpt-4o")).await.unwrap();

        assert_eq!(text, "Hemoglobin: 13.5");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_maps_http_error_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = OpenRouterClient::new("k", &server.url());
        let err = client.complete(&request("m")).await.unwrap_err();

        match err {
            ProviderError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_flags_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = OpenRouterClient::new("k", &server.url());
        let err = client.complete(&request("m")).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn complete_flags_missing_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenRouterClient::new("k", &server.url());
        let err = client.complete(&request("m")).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyCompletion));
    }

    #[tokio::test]
    async fn list_models_normalizes_catalog() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models")
            .with_status(200)
            .with_body(
                r#"{"data":[
                    {"id":"openai/gpt-4o","context_length":128000,
                     "architecture":{"input_modalities":["text","image"]}},
                    {"id":"meta-llama/llama-3.1-8b-instruct","context_length":131072,
                     "architecture":{"input_modalities":["text"]}}
                ]}"#,
            )
            .create_async()
            .await;

        let client = OpenRouterClient::new("k", &server.url());
        let models = client.list_models().await.unwrap();

        assert_eq!(models.len(), 2);
        assert!(models[0].supports_vision);
        assert!(!models[1].supports_vision);
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OpenRouterClient::new("k", "https://openrouter.ai/api/v1/");
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
    }

    #[tokio::test]
    async fn mock_replies_per_model_and_records_order() {
        let mock = MockChatClient::new()
            .with_content("a", "alpha")
            .with_http_error("b", 500);

        assert_eq!(mock.complete(&request("a")).await.unwrap(), "alpha");
        assert!(mock.complete(&request("b")).await.is_err());
        assert!(mock.complete(&request("c")).await.is_err());
        assert_eq!(mock.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn mock_pops_queued_replies_then_repeats_the_last() {
        let mock = MockChatClient::new()
            .with_content("a", "first")
            .with_content("a", "second");

        assert_eq!(mock.complete(&request("a")).await.unwrap(), "first");
        assert_eq!(mock.complete(&request("a")).await.unwrap(), "second");
        assert_eq!(mock.complete(&request("a")).await.unwrap(), "second");
    }
}
