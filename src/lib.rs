//! Vitalens: multi-model health-report extraction.
//!
//! Takes one uploaded report document (PDF/JPG/PNG), fans OCR out across
//! hosted vision-capable chat models, structures the best transcription
//! into typed health metrics with a second model pass, reconciles answers
//! across models, and persists the single current report.
//!
//! Entry point: build a [`pipeline::ReportProcessor`] (or use
//! [`pipeline::build_processor`] for production wiring) and feed it
//! documents from [`pipeline::intake`].
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use vitalens::pipeline::{build_processor, intake};
//! use vitalens::storage::SettingsStore;
//!
//! let settings = SettingsStore::default_location().load()?;
//! let processor = build_processor(&settings)?;
//!
//! let document = intake::read_from_path("lab_report.pdf".as_ref()).await?;
//! let outcome = processor.process(document, &settings).await?;
//! println!("stored report {}", outcome.report.id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod storage;

use tracing_subscriber::EnvFilter;

/// Opt-in tracing setup: RUST_LOG when set, the crate default otherwise.
///
/// Library consumers with their own subscriber simply skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
