//! Fan-out of the OCR call across the selected models.
//!
//! No timeouts and no cancellation live here: requests run to completion or
//! failure, and whatever the transport enforces is the only clock. Results
//! come back in candidate order, which makes the best-result tie-break
//! deterministic.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ocr::{self, ExtractionResult};
use super::progress::ProgressSink;
use crate::models::EncodedDocument;
use crate::provider::ChatClient;

/// How many models the bounded strategy runs concurrently before spilling
/// over to one-at-a-time attempts.
pub const DEFAULT_BOUND: usize = 2;

fn default_bound() -> usize {
    DEFAULT_BOUND
}

/// Concurrency policy for the OCR stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FanoutStrategy {
    /// Invoke every model concurrently, keep every success.
    Parallel,
    /// Invoke the first `limit` concurrently; if none succeed, try the
    /// rest one at a time and stop at the first success.
    BoundedParallel {
        #[serde(default = "default_bound")]
        limit: usize,
    },
    /// Strict candidate order, stopping at the first success.
    SequentialFallback,
}

impl Default for FanoutStrategy {
    fn default() -> Self {
        FanoutStrategy::Parallel
    }
}

/// Run OCR across `models` under the given strategy.
///
/// An empty return means every attempted model failed; the caller owns the
/// aggregate-failure decision.
pub async fn run_ocr(
    strategy: &FanoutStrategy,
    client: &dyn ChatClient,
    models: &[String],
    document: &EncodedDocument,
    progress: &dyn ProgressSink,
) -> Vec<ExtractionResult> {
    let results = match strategy {
        FanoutStrategy::Parallel => all_parallel(client, models, document, progress).await,
        FanoutStrategy::BoundedParallel { limit } => {
            bounded_parallel(client, models, document, progress, *limit).await
        }
        FanoutStrategy::SequentialFallback => {
            sequential_fallback(client, models, document, progress).await
        }
    };

    info!(
        succeeded = results.len(),
        attempted = models.len(),
        "OCR fan-out finished"
    );
    results
}

async fn all_parallel(
    client: &dyn ChatClient,
    models: &[String],
    document: &EncodedDocument,
    progress: &dyn ProgressSink,
) -> Vec<ExtractionResult> {
    let attempts = models
        .iter()
        .map(|model| ocr::extract_text(client, model, document, progress));
    join_all(attempts).await.into_iter().flatten().collect()
}

async fn bounded_parallel(
    client: &dyn ChatClient,
    models: &[String],
    document: &EncodedDocument,
    progress: &dyn ProgressSink,
    limit: usize,
) -> Vec<ExtractionResult> {
    let bound = limit.max(1).min(models.len());
    let (head, tail) = models.split_at(bound);

    let results = all_parallel(client, head, document, progress).await;
    if !results.is_empty() {
        return results;
    }

    // Spillover: cheapest possible recovery, one candidate at a time.
    for model in tail {
        if let Some(result) = ocr::extract_text(client, model, document, progress).await {
            return vec![result];
        }
    }
    Vec::new()
}

async fn sequential_fallback(
    client: &dyn ChatClient,
    models: &[String],
    document: &EncodedDocument,
    progress: &dyn ProgressSink,
) -> Vec<ExtractionResult> {
    for model in models {
        if let Some(result) = ocr::extract_text(client, model, document, progress).await {
            return vec![result];
        }
    }
    Vec::new()
}

/// Pick the transcription with the most characters; ties keep the earliest.
pub fn best_result(results: &[ExtractionResult]) -> Option<&ExtractionResult> {
    let mut best: Option<&ExtractionResult> = None;
    for result in results {
        match best {
            Some(current) if result.chars <= current.chars => {}
            _ => best = Some(result),
        }
    }
    best
}
