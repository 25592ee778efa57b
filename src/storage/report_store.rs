use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{ReportStore, StorageError};
use crate::config;
use crate::models::StoredReport;

/// Filename of the single report slot.
const REPORT_FILE: &str = "current_report.json";

/// JSON-file-backed report slot under a storage directory.
///
/// Writes go through a temp file in the same directory and replace the
/// slot in one rename, so a crash mid-write never leaves a truncated
/// report behind.
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the application data directory.
    pub fn default_location() -> Self {
        Self::new(config::storage_dir())
    }

    fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }
}

impl ReportStore for FileReportStore {
    fn get(&self) -> Result<Option<StoredReport>, StorageError> {
        let path = self.report_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let report = serde_json::from_slice(&bytes)?;
        Ok(Some(report))
    }

    fn put(&self, report: &StoredReport) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(report)?;

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&json)?;
        staged
            .persist(self.report_path())
            .map_err(|e| StorageError::Replace(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(self.report_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory report slot for tests.
///
/// Clones share the slot, so a test can keep a handle after moving the
/// store into a processor.
#[derive(Default, Clone)]
pub struct MemoryReportStore {
    slot: Arc<Mutex<Option<StoredReport>>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for MemoryReportStore {
    fn get(&self) -> Result<Option<StoredReport>, StorageError> {
        Ok(self.slot.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn put(&self, report: &StoredReport) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(report.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}
