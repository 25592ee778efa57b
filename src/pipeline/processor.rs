//! Top-level pipeline controller.
//!
//! Single entry point that drives one upload end to end:
//! validate → encode → select models → OCR fan-out → best text →
//! structured analysis → reconcile → finalize → store.
//!
//! The processor is the only component that touches persisted state; every
//! stage below it receives data by parameter. Trait-based DI throughout so
//! the whole flow runs against mocks.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::analyzer::{self, ModelAnalysis};
use super::classify::classify_report;
use super::fanout;
use super::intake;
use super::patient_scan;
use super::progress::{ProgressEvent, ProgressSink, Stage};
use super::reconcile;
use super::selection;
use super::PipelineError;
use crate::models::{StoredReport, UploadedDocument};
use crate::provider::{ChatClient, OpenRouterClient};
use crate::storage::{
    FileReportStore, PatientOverrides, ProviderSettings, ReportStore, SettingsStore,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    /// The report as persisted; replaces whatever was stored before.
    pub report: StoredReport,
    pub ocr_succeeded: usize,
    pub ocr_attempted: usize,
    /// How many analyzer results went into the merge.
    pub analyses_merged: usize,
    /// True when every analyzer reply was unusable and the stored report
    /// carries the canned fallback analysis.
    pub used_fallback_analysis: bool,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives uploads through the pipeline and owns the persisted state.
pub struct ReportProcessor {
    client: Arc<dyn ChatClient>,
    reports: Box<dyn ReportStore>,
    settings: SettingsStore,
    progress: Arc<dyn ProgressSink>,
}

impl ReportProcessor {
    pub fn new(
        client: Arc<dyn ChatClient>,
        reports: Box<dyn ReportStore>,
        settings: SettingsStore,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            client,
            reports,
            settings,
            progress,
        }
    }

    /// Process one upload under the given settings.
    ///
    /// On success the stored report has been replaced; on error nothing was
    /// written. A `RunFailed` progress event mirrors every error return.
    pub async fn process(
        &self,
        document: UploadedDocument,
        settings: &ProviderSettings,
    ) -> Result<ProcessingOutcome, PipelineError> {
        self.progress.publish(ProgressEvent::RunStarted {
            filename: document.filename.clone(),
        });

        match self.run(document, settings).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.progress.publish(ProgressEvent::RunFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        document: UploadedDocument,
        settings: &ProviderSettings,
    ) -> Result<ProcessingOutcome, PipelineError> {
        // Everything here must fail before the first request does.
        intake::validate(&document)?;
        if settings.credential().is_none() {
            return Err(PipelineError::MissingCredential);
        }

        // A new upload starts from a clean identity slate.
        self.settings.clear_patient_overrides()?;

        self.progress.publish(ProgressEvent::StageStarted {
            stage: Stage::Encoding,
        });
        let encoded = intake::encode(&document);

        let models = selection::select_models(&settings.selection, self.client.as_ref()).await;
        if models.is_empty() {
            return Err(PipelineError::NoUsableModel);
        }

        // OCR fan-out.
        self.progress.publish(ProgressEvent::StageStarted {
            stage: Stage::Ocr,
        });
        let extractions = fanout::run_ocr(
            &settings.strategy,
            self.client.as_ref(),
            &models,
            &encoded,
            self.progress.as_ref(),
        )
        .await;
        self.progress.publish(ProgressEvent::StageCompleted {
            stage: Stage::Ocr,
            succeeded: extractions.len(),
            attempted: models.len(),
        });

        let Some(best) = fanout::best_result(&extractions) else {
            return Err(PipelineError::AllModelsFailed {
                attempted: models.len(),
            });
        };
        let raw_text = best.text.clone();

        // Identity recovered from the document outranks model output later;
        // persist it so the stored scalars survive the run.
        let mut overrides = PatientOverrides::default();
        overrides.absorb_scan(&patient_scan::scan(&raw_text, &document.filename));
        self.settings.save_patient_overrides(&overrides)?;

        // Structured analysis: every model whose OCR succeeded in
        // multi-model mode, the best transcriber alone otherwise.
        self.progress.publish(ProgressEvent::StageStarted {
            stage: Stage::Analysis,
        });
        let analysis_models: Vec<String> =
            if settings.use_multiple_models && extractions.len() > 1 {
                extractions.iter().map(|e| e.model.clone()).collect()
            } else {
                vec![best.model.clone()]
            };

        let analyses = futures_util::future::join_all(analysis_models.iter().map(|model| {
            analyzer::analyze(
                self.client.as_ref(),
                model,
                &raw_text,
                self.progress.as_ref(),
            )
        }))
        .await;

        let usable: Vec<&ModelAnalysis> = analyses.iter().filter(|a| !a.fell_back).collect();
        self.progress.publish(ProgressEvent::StageCompleted {
            stage: Stage::Analysis,
            succeeded: usable.len(),
            attempted: analysis_models.len(),
        });

        // Parse failure is degraded output, not a dead end: when no model
        // produced usable JSON the first fallback result is stored so the
        // user still gets the transcription.
        let used_fallback_analysis = usable.is_empty();
        let results: Vec<_> = if used_fallback_analysis {
            warn!("no analyzer produced structured data, storing fallback");
            analyses.iter().take(1).map(|a| a.result.clone()).collect()
        } else {
            usable.into_iter().map(|a| a.result.clone()).collect()
        };
        let analyses_merged = results.len();

        let analysis = reconcile::merge_results(&results, &overrides);

        // Finalize and overwrite the slot.
        self.progress.publish(ProgressEvent::StageStarted {
            stage: Stage::Storing,
        });
        let report = finalize(&document.filename, &raw_text, analysis);
        self.reports.put(&report)?;
        self.progress.publish(ProgressEvent::ReportStored {
            report_id: report.id,
        });

        info!(
            report_id = %report.id,
            kind = %report.kind,
            metrics = report.analysis.metrics.len(),
            "stored report replaced"
        );

        Ok(ProcessingOutcome {
            report,
            ocr_succeeded: extractions.len(),
            ocr_attempted: models.len(),
            analyses_merged,
            used_fallback_analysis,
        })
    }

    /// The currently stored report, if any.
    pub fn current_report(&self) -> Result<Option<StoredReport>, PipelineError> {
        Ok(self.reports.get()?)
    }

    /// Explicit "clear data": drops the report and the identity scalars.
    pub fn clear_data(&self) -> Result<(), PipelineError> {
        self.reports.clear()?;
        self.settings.clear_patient_overrides()?;
        Ok(())
    }
}

/// Assemble the persisted envelope for one successful run.
fn finalize(
    filename: &str,
    raw_text: &str,
    analysis: crate::models::AnalysisResult,
) -> StoredReport {
    let title = analysis
        .patient
        .name
        .clone()
        .unwrap_or_else(|| intake::sanitize_filename(filename));

    // Filename and text both feed classification; "lipid_panel.pdf" should
    // classify even when the transcription missed the heading.
    let kind = classify_report(&format!("{filename}\n{raw_text}"));

    StoredReport {
        id: Uuid::new_v4(),
        title,
        created_at: Utc::now(),
        kind,
        analysis,
        raw_text: raw_text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build a processor with production wiring from persisted settings.
///
/// Fails fast when no credential is configured; nothing network-facing is
/// constructed in that case.
pub fn build_processor(settings: &ProviderSettings) -> Result<ReportProcessor, PipelineError> {
    let api_key = settings
        .credential()
        .ok_or(PipelineError::MissingCredential)?;
    let client = OpenRouterClient::new(api_key, settings.endpoint());

    Ok(ReportProcessor::new(
        Arc::new(client),
        Box::new(FileReportStore::default_location()),
        SettingsStore::default_location(),
        Arc::new(super::progress::NullProgress),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
