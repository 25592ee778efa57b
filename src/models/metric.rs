use serde::{Deserialize, Serialize};

/// Placeholder for a metric whose name is empty after normalization.
pub const NAME_PLACEHOLDER: &str = "Unnamed metric";
/// Placeholder reference range when the analyzer supplied none.
pub const RANGE_PLACEHOLDER: &str = "Not specified";
/// Placeholder category when the analyzer supplied none.
pub const CATEGORY_PLACEHOLDER: &str = "Other";

/// Value of a health metric.
///
/// Numeric when the analyzer output can be coerced to a number; free text
/// otherwise. Ratios like "120/80" deliberately stay textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Coerce raw analyzer output into a value.
    ///
    /// Numeric-looking strings become numbers unless they contain a `/`
    /// (ratio/fraction). Non-string, non-number JSON collapses to its
    /// string rendering.
    pub fn coerce(raw: &serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Text(n.to_string()),
            },
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if !trimmed.contains('/') {
                    if let Ok(f) = trimmed.parse::<f64>() {
                        return Self::Number(f);
                    }
                }
                Self::Text(trimmed.to_string())
            }
            serde_json::Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Severity of a metric relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Fold a loosely spelled status string onto the closed set.
    ///
    /// Analyzer models spell status freely ("High", "LOW", "critical",
    /// "ok"); anything unrecognized reads as normal rather than failing
    /// the metric.
    pub fn from_loose(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        match s.as_str() {
            "danger" | "critical" | "severe" | "very high" | "very low" => Self::Danger,
            "warning" | "high" | "low" | "elevated" | "borderline" | "abnormal" | "caution" => {
                Self::Warning
            }
            _ => Self::Normal,
        }
    }
}

/// One dated numeric observation in a metric's history.
///
/// Always empty at creation time — a fresh report carries no historical
/// series — but part of the persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    pub value: f64,
}

/// A single named measurement extracted from a report.
///
/// `name` keeps the provider-supplied terminology verbatim; merge identity
/// is the normalized form computed in `pipeline::reconcile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub name: String,
    pub value: MetricValue,
    pub unit: String,
    pub status: MetricStatus,
    pub reference_range: String,
    pub description: String,
    pub category: String,
    pub history: Vec<HistoryPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_parses_numeric_strings() {
        assert_eq!(MetricValue::coerce(&json!("210")), MetricValue::Number(210.0));
        assert_eq!(
            MetricValue::coerce(&json!(" 5.4 ")),
            MetricValue::Number(5.4)
        );
    }

    #[test]
    fn coerce_keeps_ratios_as_text() {
        assert_eq!(
            MetricValue::coerce(&json!("120/80")),
            MetricValue::Text("120/80".into())
        );
    }

    #[test]
    fn coerce_passes_numbers_through() {
        assert_eq!(MetricValue::coerce(&json!(98.6)), MetricValue::Number(98.6));
        assert_eq!(MetricValue::coerce(&json!(7)), MetricValue::Number(7.0));
    }

    #[test]
    fn coerce_keeps_free_text() {
        assert_eq!(
            MetricValue::coerce(&json!("Positive")),
            MetricValue::Text("Positive".into())
        );
    }

    #[test]
    fn coerce_null_becomes_empty_text() {
        assert_eq!(
            MetricValue::coerce(&serde_json::Value::Null),
            MetricValue::Text(String::new())
        );
    }

    #[test]
    fn status_folds_loose_spellings() {
        assert_eq!(MetricStatus::from_loose("High"), MetricStatus::Warning);
        assert_eq!(MetricStatus::from_loose("LOW"), MetricStatus::Warning);
        assert_eq!(MetricStatus::from_loose("critical"), MetricStatus::Danger);
        assert_eq!(MetricStatus::from_loose("ok"), MetricStatus::Normal);
        assert_eq!(MetricStatus::from_loose("normal"), MetricStatus::Normal);
        assert_eq!(MetricStatus::from_loose("danger"), MetricStatus::Danger);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MetricStatus::Danger).unwrap(),
            "\"danger\""
        );
    }

    #[test]
    fn value_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&MetricValue::Number(210.0)).unwrap(),
            "210.0"
        );
        assert_eq!(
            serde_json::to_string(&MetricValue::Text("120/80".into())).unwrap(),
            "\"120/80\""
        );
    }
}
