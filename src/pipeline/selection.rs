//! Decides which model identifiers a run will invoke.
//!
//! Selection never fails: catalog errors and empty filter results fall back
//! to the static default list, and a configured list is used as given. An
//! empty outcome is a value the orchestrator turns into "no usable model".

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::ChatClient;

/// Vision-capable defaults, in invocation order.
pub const DEFAULT_VISION_MODELS: &[&str] = &[
    "openai/gpt-4o",
    "anthropic/claude-3.5-sonnet",
    "google/gemini-flash-1.5",
    "qwen/qwen-2-vl-72b-instruct",
    "meta-llama/llama-3.2-90b-vision-instruct",
];

/// Catalog entries below this context length cannot hold a report plus the
/// structured-output instructions.
pub const MIN_CONTEXT_TOKENS: u64 = 4000;

/// How many catalog entries the dynamic mode keeps.
pub const CATALOG_MODEL_CAP: usize = 5;

/// The three mutually exclusive selection modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Hard-coded vision-capable list.
    StaticDefaults,
    /// Filter the provider catalog; fall back to the static list when the
    /// fetch fails or nothing passes the filter.
    DynamicCatalog,
    /// Explicit user choice.
    Configured {
        primary: String,
        #[serde(default)]
        fallbacks: Vec<String>,
        #[serde(default)]
        use_fallbacks: bool,
    },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::StaticDefaults
    }
}

fn static_defaults() -> Vec<String> {
    DEFAULT_VISION_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Resolve a policy to the ordered model identifiers to invoke.
pub async fn select_models(policy: &SelectionPolicy, client: &dyn ChatClient) -> Vec<String> {
    match policy {
        SelectionPolicy::StaticDefaults => static_defaults(),

        SelectionPolicy::DynamicCatalog => match client.list_models().await {
            Ok(catalog) => {
                let filtered: Vec<String> = catalog
                    .into_iter()
                    .filter(|m| m.supports_vision && m.context_length.unwrap_or(0) >= MIN_CONTEXT_TOKENS)
                    .take(CATALOG_MODEL_CAP)
                    .map(|m| m.id)
                    .collect();
                if filtered.is_empty() {
                    debug!("catalog yielded no usable vision models, using defaults");
                    static_defaults()
                } else {
                    filtered
                }
            }
            Err(e) => {
                warn!(error = %e, "model catalog fetch failed, using defaults");
                static_defaults()
            }
        },

        SelectionPolicy::Configured {
            primary,
            fallbacks,
            use_fallbacks,
        } => {
            let mut models = Vec::with_capacity(1 + fallbacks.len());
            if !primary.trim().is_empty() {
                models.push(primary.trim().to_string());
            }
            if *use_fallbacks {
                for fb in fallbacks {
                    let fb = fb.trim();
                    if !fb.is_empty() && !models.iter().any(|m| m == fb) {
                        models.push(fb.to_string());
                    }
                }
            }
            models
        }
    }
}
