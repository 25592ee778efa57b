use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::config;
use crate::models::PatientInfo;
use crate::pipeline::fanout::FanoutStrategy;
use crate::pipeline::selection::SelectionPolicy;

const SETTINGS_FILE: &str = "settings.json";
const PATIENT_FILE: &str = "patient_overrides.json";

/// Persisted provider configuration.
///
/// Fields default individually so older settings files keep loading after
/// new fields appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API credential. Sent only as a bearer header to the configured
    /// endpoint; absent means the pipeline refuses to start.
    pub api_key: Option<String>,
    /// Endpoint override; the default hosted endpoint when unset.
    pub base_url: Option<String>,
    pub selection: SelectionPolicy,
    pub strategy: FanoutStrategy,
    /// Run analysis across every model whose OCR succeeded and reconcile,
    /// instead of analyzing with a single model.
    pub use_multiple_models: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            selection: SelectionPolicy::StaticDefaults,
            strategy: FanoutStrategy::Parallel,
            use_multiple_models: true,
        }
    }
}

impl ProviderSettings {
    /// The credential, if one is actually usable.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(config::DEFAULT_API_BASE_URL)
    }
}

/// Stored patient identity scalars.
///
/// Cleared at the start of each upload, re-populated by regex extraction,
/// and treated as authoritative over model-supplied name/age/gender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientOverrides {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl PatientOverrides {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.gender.is_none()
    }

    /// Fill empty slots from a scan result. Existing values stick.
    pub fn absorb_scan(&mut self, scanned: &PatientInfo) {
        if self.name.is_none() {
            self.name = scanned.name.clone();
        }
        if self.age.is_none() {
            self.age = scanned.age;
        }
        if self.gender.is_none() {
            self.gender = scanned.gender.clone();
        }
    }
}

/// File-backed settings beside the report slot.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_location() -> Self {
        Self::new(config::storage_dir())
    }

    pub fn load(&self) -> Result<ProviderSettings, StorageError> {
        self.read_or_default(SETTINGS_FILE)
    }

    pub fn save(&self, settings: &ProviderSettings) -> Result<(), StorageError> {
        self.write_json(SETTINGS_FILE, settings)
    }

    pub fn load_patient_overrides(&self) -> Result<PatientOverrides, StorageError> {
        self.read_or_default(PATIENT_FILE)
    }

    pub fn save_patient_overrides(&self, overrides: &PatientOverrides) -> Result<(), StorageError> {
        self.write_json(PATIENT_FILE, overrides)
    }

    pub fn clear_patient_overrides(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(self.dir.join(PATIENT_FILE)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_or_default<T>(&self, filename: &str) -> Result<T, StorageError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let path = self.dir.join(filename);
        if !path.exists() {
            return Ok(T::default());
        }
        let bytes = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(value)?;

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&json)?;
        staged
            .persist(self.dir.join(filename))
            .map_err(|e| StorageError::Replace(e.to_string()))?;
        Ok(())
    }
}
