use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metric::HealthMetric;
use super::patient::PatientInfo;

/// Report categories recognized by the keyword classifier.
///
/// A fixed product set; anything unmatched classifies as `Blood`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Blood,
    Cholesterol,
    Cbc,
    Metabolic,
    Liver,
    Kidney,
    Thyroid,
    Lipid,
    Glucose,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blood => "blood",
            Self::Cholesterol => "cholesterol",
            Self::Cbc => "cbc",
            Self::Metabolic => "metabolic",
            Self::Liver => "liver",
            Self::Kidney => "kidney",
            Self::Thyroid => "thyroid",
            Self::Lipid => "lipid",
            Self::Glucose => "glucose",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of structured analysis over one document.
///
/// Metrics are unique by normalized name once the reconciler has run.
/// `models_used` carries the identifier(s) of whichever model(s)
/// contributed, including the attempted model when analysis fell back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metrics: Vec<HealthMetric>,
    pub recommendations: Vec<String>,
    pub summary: String,
    pub detailed_analysis: String,
    pub categories: Vec<String>,
    pub patient: PatientInfo,
    pub models_used: Vec<String>,
}

/// The persisted envelope for "the user's current report."
///
/// Exactly one exists at a time: each successful pipeline run overwrites
/// the previous record wholesale. Deleted by an explicit clear or
/// implicitly replaced by the next upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub kind: ReportKind,
    pub analysis: AnalysisResult,
    pub raw_text: String,
}
