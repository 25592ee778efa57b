pub mod openrouter;
pub mod types;

pub use openrouter::{MockChatClient, OpenRouterClient};
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider response carried no completion text")]
    EmptyCompletion,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}
