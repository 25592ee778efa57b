//! Single-model OCR invocation.
//!
//! One chat-completion request per call, carrying the encoded document and
//! the transcription instruction. Failure is a value here: the fan-out layer
//! decides what to do when a model returns nothing.

use tracing::{debug, warn};

use super::progress::{ProgressEvent, ProgressSink};
use super::prompts::OCR_INSTRUCTION;
use crate::models::EncodedDocument;
use crate::provider::{ChatClient, ChatCompletionRequest, ChatMessage};

/// Text recovered from one model, with its length precomputed for the
/// best-result pick.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub model: String,
    pub text: String,
    pub chars: usize,
}

impl ExtractionResult {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            model: model.into(),
            chars: text.chars().count(),
            text,
        }
    }
}

/// Ask one model to transcribe the document.
///
/// Returns `None` for any failure: transport error, non-2xx status, or a
/// completion with no usable text. The outcome is also published to the
/// progress sink either way.
pub async fn extract_text(
    client: &dyn ChatClient,
    model: &str,
    document: &EncodedDocument,
    progress: &dyn ProgressSink,
) -> Option<ExtractionResult> {
    let request = ChatCompletionRequest::new(
        model,
        vec![ChatMessage::user_with_image(
            OCR_INSTRUCTION,
            &document.data_url,
        )],
    );

    match client.complete(&request).await {
        Ok(text) => {
            let result = ExtractionResult::new(model, text);
            debug!(model, chars = result.chars, "model transcribed document");
            progress.publish(ProgressEvent::ModelSucceeded {
                model: model.to_string(),
                chars: result.chars,
            });
            Some(result)
        }
        Err(e) => {
            warn!(model, error = %e, "model failed to transcribe document");
            progress.publish(ProgressEvent::ModelFailed {
                model: model.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use crate::pipeline::progress::RecordingProgress;
    use crate::provider::MockChatClient;

    fn doc() -> EncodedDocument {
        EncodedDocument {
            data_url: "data:application/pdf;base64,JVBERi0xLjQ=".into(),
            media_type: MediaType::Pdf,
            filename: "report.pdf".into(),
        }
    }

    #[tokio::test]
    async fn success_returns_result_and_publishes() {
        let client = MockChatClient::new().with_content("vision/a", "Glucose: 95 mg/dL");
        let progress = RecordingProgress::new();

        let result = extract_text(&client, "vision/a", &doc(), &progress)
            .await
            .unwrap();
        assert_eq!(result.model, "vision/a");
        assert_eq!(result.text, "Glucose: 95 mg/dL");
        assert_eq!(result.chars, result.text.chars().count());

        assert!(matches!(
            progress.events().as_slice(),
            [ProgressEvent::ModelSucceeded { model, .. }] if model == "vision/a"
        ));
    }

    #[tokio::test]
    async fn http_error_becomes_none() {
        let client = MockChatClient::new().with_http_error("vision/a", 500);
        let progress = RecordingProgress::new();

        assert!(extract_text(&client, "vision/a", &doc(), &progress)
            .await
            .is_none());
        assert!(matches!(
            progress.events().as_slice(),
            [ProgressEvent::ModelFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn network_error_becomes_none() {
        let client = MockChatClient::new().with_offline("vision/a");
        assert!(
            extract_text(&client, "vision/a", &doc(), &crate::pipeline::progress::NullProgress)
                .await
                .is_none()
        );
    }

    #[test]
    fn chars_counts_characters_not_bytes() {
        let result = ExtractionResult::new("m", "µmol/L");
        assert_eq!(result.chars, 6);
        assert!(result.text.len() > 6);
    }
}
