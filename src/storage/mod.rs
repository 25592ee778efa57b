pub mod report_store;
pub mod settings;

pub use report_store::{FileReportStore, MemoryReportStore};
pub use settings::{PatientOverrides, ProviderSettings, SettingsStore};

use thiserror::Error;

use crate::models::StoredReport;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not replace stored file: {0}")]
    Replace(String),
}

/// Single-slot repository for "the user's current report."
///
/// Exactly one report exists at a time: `put` overwrites wholesale, `get`
/// returns the current record if any, `clear` removes it. The pipeline
/// controller is the only owner; lower components receive report data by
/// parameter.
pub trait ReportStore: Send + Sync {
    fn get(&self) -> Result<Option<StoredReport>, StorageError>;
    fn put(&self, report: &StoredReport) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
