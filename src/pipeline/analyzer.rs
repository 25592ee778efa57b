//! Structured analysis of OCR text.
//!
//! One model call asking for the report as JSON, then a normalization pass
//! that makes no assumptions about how well the model listened. This stage
//! never fails: anything unusable downgrades to a canned fallback result
//! that keeps the raw text visible to the user.

use serde_json::Value;
use tracing::{debug, warn};

use super::json_extract;
use super::progress::{ProgressEvent, ProgressSink};
use super::prompts;
use super::reconcile;
use crate::models::metric::{CATEGORY_PLACEHOLDER, NAME_PLACEHOLDER, RANGE_PLACEHOLDER};
use crate::models::{AnalysisResult, HealthMetric, MetricStatus, MetricValue, PatientInfo};
use crate::provider::{ChatClient, ChatCompletionRequest, ChatMessage};

/// What one model made of the text.
#[derive(Debug, Clone)]
pub struct ModelAnalysis {
    pub result: AnalysisResult,
    /// True when the reply was unusable and `result` is the canned
    /// fallback.
    pub fell_back: bool,
}

/// Ask one model to structure the OCR text.
///
/// Transport errors, unparseable replies, and replies without a metrics
/// array all produce the fallback result tagged with this model's id.
pub async fn analyze(
    client: &dyn ChatClient,
    model: &str,
    ocr_text: &str,
    progress: &dyn ProgressSink,
) -> ModelAnalysis {
    let request = ChatCompletionRequest::new(
        model,
        vec![ChatMessage::user_text(prompts::build_analysis_prompt(
            ocr_text,
        ))],
    );

    let reply = match client.complete(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(model, error = %e, "analysis request failed");
            progress.publish(ProgressEvent::ModelFailed {
                model: model.to_string(),
                reason: e.to_string(),
            });
            return ModelAnalysis {
                result: fallback_result(model, ocr_text),
                fell_back: true,
            };
        }
    };

    match json_extract::extract_object(&reply).and_then(|v| parse_analysis(v, model)) {
        Some(result) => {
            debug!(model, metrics = result.metrics.len(), "analysis parsed");
            progress.publish(ProgressEvent::ModelSucceeded {
                model: model.to_string(),
                chars: reply.chars().count(),
            });
            ModelAnalysis {
                result,
                fell_back: false,
            }
        }
        None => {
            warn!(model, "analysis reply had no usable JSON, using fallback");
            progress.publish(ProgressEvent::ModelFailed {
                model: model.to_string(),
                reason: "reply had no usable structured data".to_string(),
            });
            ModelAnalysis {
                result: fallback_result(model, ocr_text),
                fell_back: true,
            }
        }
    }
}

/// The result substituted when structured extraction fails.
///
/// The raw transcription goes into `detailed_analysis` so the user keeps
/// whatever the OCR pass recovered.
pub fn fallback_result(model: &str, raw_text: &str) -> AnalysisResult {
    AnalysisResult {
        metrics: Vec::new(),
        recommendations: vec![
            "Structured extraction failed for this document. Re-upload a clearer \
             copy or try a different report."
                .to_string(),
        ],
        summary: "The analysis model could not extract structured health data from this report."
            .to_string(),
        detailed_analysis: raw_text.to_string(),
        categories: Vec::new(),
        patient: PatientInfo::default(),
        models_used: vec![model.to_string()],
    }
}

/// Turn an extracted JSON object into a normalized result.
///
/// A missing metrics array disqualifies the whole reply (the model ignored
/// the shape it was given); everything else is defaulted field by field.
fn parse_analysis(value: Value, model: &str) -> Option<AnalysisResult> {
    let metrics_raw = value.get("metrics")?.as_array()?;
    let metrics: Vec<HealthMetric> = metrics_raw.iter().map(normalize_metric).collect();

    Some(AnalysisResult {
        metrics,
        recommendations: string_array(value.get("recommendations")),
        summary: string_field(&value, "summary").unwrap_or_default(),
        detailed_analysis: string_field(&value, "detailed_analysis").unwrap_or_default(),
        categories: string_array(value.get("categories")),
        patient: parse_patient(value.get("patient")),
        models_used: vec![model.to_string()],
    })
}

/// Normalize one raw metric object. Total: any shape of input yields a
/// well-formed metric, with placeholders standing in for what is missing.
fn normalize_metric(raw: &Value) -> HealthMetric {
    // A name that normalizes to nothing (punctuation-only, whitespace)
    // would collapse distinct junk entries onto one merge key.
    let name = string_field(raw, "name")
        .filter(|n| !reconcile::normalize_metric_name(n).is_empty())
        .unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .map(MetricStatus::from_loose)
        .unwrap_or_default();

    HealthMetric {
        name,
        value: MetricValue::coerce(raw.get("value").unwrap_or(&Value::Null)),
        unit: string_field(raw, "unit").unwrap_or_default(),
        status,
        reference_range: string_field(raw, "reference_range")
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| RANGE_PLACEHOLDER.to_string()),
        description: string_field(raw, "description").unwrap_or_default(),
        category: string_field(raw, "category")
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| CATEGORY_PLACEHOLDER.to_string()),
        // No historical series exists when a report is first created.
        history: Vec::new(),
    }
}

fn parse_patient(raw: Option<&Value>) -> PatientInfo {
    let Some(raw) = raw else {
        return PatientInfo::default();
    };

    PatientInfo {
        name: string_field(raw, "name"),
        age: age_field(raw),
        gender: string_field(raw, "gender"),
        date_of_birth: string_field(raw, "date_of_birth"),
        patient_id: string_field(raw, "patient_id"),
        collection_date: string_field(raw, "collection_date"),
        report_date: string_field(raw, "report_date"),
        doctor_name: string_field(raw, "doctor_name"),
        hospital_name: string_field(raw, "hospital_name"),
    }
}

/// Age arrives as a number from some models and as a string from others.
fn age_field(raw: &Value) -> Option<u32> {
    match raw.get("age") {
        Some(Value::Number(n)) => n.as_u64().and_then(|a| u32::try_from(a).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Trimmed string field; empty and literal-"null" values read as absent.
fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

fn string_array(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
