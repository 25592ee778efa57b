//! Wire types for the OpenAI-compatible chat-completion surface.
//!
//! Providers differ in the details of their JSON; everything past this
//! module sees only the normalized forms (plain completion text,
//! `ModelDescriptor`). Unknown response fields are ignored on purpose.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Sampling temperature for document extraction.
/// Low for reproducible output on identical inputs.
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Completion budget for a full-page transcription or analysis.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// ──────────────────────────────────────────────
// Client seam
// ──────────────────────────────────────────────

/// One hosted chat-completion provider.
///
/// Implementations normalize the provider's response shape: `complete`
/// yields the first choice's text content or a typed error, never a raw
/// body. Trait-based so pipelines take `Arc<dyn ChatClient>` and tests
/// substitute mocks.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Issue one chat completion and return the first choice's text.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ProviderError>;

    /// Fetch the provider's model catalog, normalized to descriptors.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ProviderError>;
}

// ──────────────────────────────────────────────
// Request shapes
// ──────────────────────────────────────────────

/// OpenAI-compatible chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: EXTRACTION_TEMPERATURE,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

/// A single chat message. Content is either plain text or multimodal
/// parts (text plus embedded images as data URLs).
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message carrying an instruction and one embedded document.
    pub fn user_with_image(text: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One element of a multimodal message body.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

// ──────────────────────────────────────────────
// Response shapes
// ──────────────────────────────────────────────

/// OpenAI-compatible chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// The first choice's text, or `None` when the provider sent an empty
    /// or structurally deviant completion.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

// ──────────────────────────────────────────────
// Model catalog shapes
// ──────────────────────────────────────────────

/// Raw model catalog response (`GET /models`).
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub data: Vec<CatalogModel>,
}

/// One raw catalog entry. Providers disagree on where capabilities live
/// (an `architecture` object vs. a flat `capabilities` list); both are
/// tolerated.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogModel {
    pub id: String,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub architecture: Option<ModelArchitecture>,
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelArchitecture {
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub input_modalities: Vec<String>,
}

impl CatalogModel {
    /// Whether the entry advertises image input in any of the shapes seen
    /// in the wild.
    pub fn supports_vision(&self) -> bool {
        if let Some(arch) = &self.architecture {
            if arch.input_modalities.iter().any(|m| m == "image") {
                return true;
            }
            if let Some(modality) = &arch.modality {
                if modality.contains("image") {
                    return true;
                }
            }
        }
        if let Some(caps) = &self.capabilities {
            return caps
                .iter()
                .any(|c| c.eq_ignore_ascii_case("vision") || c.eq_ignore_ascii_case("image"));
        }
        false
    }
}

/// Normalized model descriptor used by the selection policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub supports_vision: bool,
    pub context_length: Option<u64>,
}

impl From<CatalogModel> for ModelDescriptor {
    fn from(raw: CatalogModel) -> Self {
        let supports_vision = raw.supports_vision();
        Self {
            id: raw.id,
            supports_vision,
            context_length: raw.context_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multimodal_request_serializes_openai_shape() {
        let request = ChatCompletionRequest::new(
            "openai/gpt-4o",
            vec![ChatMessage::user_with_image(
                "Extract all text.",
                "data:image/png;base64,AAAA",
            )],
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "openai/gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn plain_text_message_serializes_as_string() {
        let message = ChatMessage::user_text("Summarize this.");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"], "Summarize this.");
    }

    #[test]
    fn max_tokens_omitted_when_none() {
        let mut request = ChatCompletionRequest::new("m", vec![ChatMessage::user_text("hi")]);
        request.max_tokens = None;
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn first_content_reads_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Extracted text"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_content().as_deref(), Some("Extracted text"));
    }

    #[test]
    fn first_content_none_for_empty_choices() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.first_content().is_none());

        let response: ChatCompletionResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.first_content().is_none());
    }

    #[test]
    fn first_content_none_for_blank_content() {
        let raw = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(response.first_content().is_none());
    }

    #[test]
    fn catalog_vision_from_input_modalities() {
        let raw = r#"{"id":"openai/gpt-4o","context_length":128000,
            "architecture":{"modality":"text+image->text","input_modalities":["text","image"]}}"#;
        let model: CatalogModel = serde_json::from_str(raw).unwrap();
        assert!(model.supports_vision());

        let descriptor = ModelDescriptor::from(model);
        assert_eq!(descriptor.context_length, Some(128_000));
        assert!(descriptor.supports_vision);
    }

    #[test]
    fn catalog_vision_from_modality_string_only() {
        let raw = r#"{"id":"x","architecture":{"modality":"text+image->text"}}"#;
        let model: CatalogModel = serde_json::from_str(raw).unwrap();
        assert!(model.supports_vision());
    }

    #[test]
    fn catalog_vision_from_capabilities_list() {
        let raw = r#"{"id":"x","capabilities":["chat","VISION"]}"#;
        let model: CatalogModel = serde_json::from_str(raw).unwrap();
        assert!(model.supports_vision());
    }

    #[test]
    fn catalog_text_only_model_is_not_vision() {
        let raw = r#"{"id":"x","context_length":8192,
            "architecture":{"modality":"text->text","input_modalities":["text"]}}"#;
        let model: CatalogModel = serde_json::from_str(raw).unwrap();
        assert!(!model.supports_vision());
    }

    #[test]
    fn catalog_tolerates_unknown_fields() {
        let raw = r#"{"id":"x","pricing":{"prompt":"0.000001"},"created":1720000000}"#;
        let model: CatalogModel = serde_json::from_str(raw).unwrap();
        assert_eq!(model.id, "x");
        assert!(!model.supports_vision());
    }
}
