//! Merging analyzer results from multiple models into one report.
//!
//! A best-effort heuristic merge: metrics are keyed by normalized name and
//! updated in place as later results arrive, the narrative fields come
//! wholesale from whichever result extracted the most metrics, and patient
//! identity recovered earlier in the run outranks anything model-supplied.
//! Near-duplicate names with unanticipated phrasing will not merge; that is
//! an accepted limit of the approach, not a bug to fix here.

use std::collections::HashMap;

use tracing::debug;

use crate::models::metric::{CATEGORY_PLACEHOLDER, RANGE_PLACEHOLDER};
use crate::models::{AnalysisResult, HealthMetric, PatientInfo};
use crate::storage::PatientOverrides;

/// Applied after case folding and punctuation stripping, exact match only.
const NAME_SYNONYMS: &[(&str, &str)] = &[
    ("triglycerides", "triglyceride"),
    ("sodium", "na"),
];

/// Merge identity for a metric name: case folded, punctuation and
/// whitespace stripped, synonyms collapsed.
pub fn normalize_metric_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    for (from, to) in NAME_SYNONYMS {
        if folded == *from {
            return to.to_string();
        }
    }
    folded
}

/// Insertion-ordered metric set keyed by normalized name.
struct WorkingSet {
    metrics: Vec<HealthMetric>,
    index: HashMap<String, usize>,
}

impl WorkingSet {
    fn new() -> Self {
        Self {
            metrics: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a new metric verbatim, or refine the existing entry:
    /// a longer description wins, a real category replaces the "Other"
    /// placeholder, and a more specific reference range replaces a
    /// missing or shorter one.
    fn absorb(&mut self, incoming: HealthMetric) {
        let key = normalize_metric_name(&incoming.name);
        match self.index.get(&key) {
            None => {
                self.index.insert(key, self.metrics.len());
                self.metrics.push(incoming);
            }
            Some(&pos) => {
                let existing = &mut self.metrics[pos];

                if !incoming.description.is_empty()
                    && incoming.description.chars().count()
                        > existing.description.chars().count()
                {
                    existing.description = incoming.description;
                }

                if existing.category == CATEGORY_PLACEHOLDER
                    && incoming.category != CATEGORY_PLACEHOLDER
                {
                    existing.category = incoming.category;
                }

                if better_range(&existing.reference_range, &incoming.reference_range) {
                    existing.reference_range = incoming.reference_range;
                }
            }
        }
    }

    fn into_vec(self) -> Vec<HealthMetric> {
        self.metrics
    }
}

fn is_missing_range(range: &str) -> bool {
    range.trim().is_empty() || range == RANGE_PLACEHOLDER
}

fn better_range(existing: &str, incoming: &str) -> bool {
    if is_missing_range(incoming) {
        return false;
    }
    is_missing_range(existing) || incoming.chars().count() > existing.chars().count()
}

/// Reduce analyzer results (in the order they were obtained) to one.
///
/// Also used for a single result: folding it through the working set
/// enforces name uniqueness, and the stored identity trio still applies.
pub fn merge_results(results: &[AnalysisResult], overrides: &PatientOverrides) -> AnalysisResult {
    let mut set = WorkingSet::new();
    let mut patient = PatientInfo::default();
    let mut categories: Vec<String> = Vec::new();
    let mut models_used: Vec<String> = Vec::new();

    // Narrative donor: the result that extracted the most metrics.
    let mut donor: Option<&AnalysisResult> = None;

    for result in results {
        if donor.map(|d| result.metrics.len() > d.metrics.len()).unwrap_or(true) {
            donor = Some(result);
        }

        for metric in &result.metrics {
            set.absorb(metric.clone());
        }

        patient.absorb(&result.patient);

        for category in &result.categories {
            if !categories.iter().any(|c| c == category) {
                categories.push(category.clone());
            }
        }
        for model in &result.models_used {
            if !models_used.iter().any(|m| m == model) {
                models_used.push(model.clone());
            }
        }
    }

    // Identity recovered from the document or filename is authoritative
    // over anything a model claimed.
    patient.override_identity(
        overrides.name.as_deref(),
        overrides.age,
        overrides.gender.as_deref(),
    );

    let metrics = set.into_vec();
    debug!(
        results = results.len(),
        metrics = metrics.len(),
        "reconciled analyzer results"
    );

    AnalysisResult {
        metrics,
        recommendations: donor.map(|d| d.recommendations.clone()).unwrap_or_default(),
        summary: donor.map(|d| d.summary.clone()).unwrap_or_default(),
        detailed_analysis: donor
            .map(|d| d.detailed_analysis.clone())
            .unwrap_or_default(),
        categories,
        patient,
        models_used,
    }
}
