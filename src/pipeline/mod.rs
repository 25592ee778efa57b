//! Report extraction pipeline.
//!
//! Single entry point ([`processor::ReportProcessor`]) that drives the full
//! document flow: intake → model selection → OCR fan-out → best-text pick →
//! structured analysis → reconciliation → stored report.
//!
//! Every stage that talks to the provider treats per-model failure as a
//! value, not an error; only whole-pipeline conditions (bad input, missing
//! credential, every model failing) surface as [`PipelineError`].

pub mod analyzer;
pub mod classify;
pub mod fanout;
pub mod intake;
pub mod json_extract;
pub mod ocr;
pub mod patient_scan;
pub mod processor;
pub mod progress;
pub mod prompts;
pub mod reconcile;
pub mod selection;

pub use fanout::FanoutStrategy;
pub use processor::{build_processor, ProcessingOutcome, ReportProcessor};
pub use progress::{ProgressEvent, ProgressSink, Stage};
pub use selection::SelectionPolicy;

use crate::storage::StorageError;

/// Errors that can stop a document from becoming a stored report.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The declared media type is not PDF, JPEG, or PNG.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// Reading or encoding the document failed before any network use.
    #[error("Could not encode document: {0}")]
    Encoding(#[from] std::io::Error),

    /// Checked before the first request; the credential itself is never
    /// part of the message.
    #[error("No API key is configured")]
    MissingCredential,

    /// Selection produced an empty model set after every fallback.
    #[error("No usable model is available")]
    NoUsableModel,

    /// Every selected model failed OCR. Nothing is stored.
    #[error("All {attempted} model(s) failed to read the document")]
    AllModelsFailed { attempted: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
