//! Progress events published while a document moves through the pipeline.
//!
//! Publishing is fire-and-forget: sinks must not block, and nothing in the
//! pipeline changes based on whether anyone is listening.

use uuid::Uuid;

/// Pipeline stages, in the order a run passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encoding,
    Ocr,
    Analysis,
    Storing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Encoding => "encoding",
            Stage::Ocr => "ocr",
            Stage::Analysis => "analysis",
            Stage::Storing => "storing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    RunStarted { filename: String },
    StageStarted { stage: Stage },
    /// One model produced usable output for the current stage.
    ModelSucceeded { model: String, chars: usize },
    /// One model failed; the run continues with the rest.
    ModelFailed { model: String, reason: String },
    StageCompleted { stage: Stage, succeeded: usize, attempted: usize },
    ReportStored { report_id: Uuid },
    RunFailed { reason: String },
}

/// Receiver for [`ProgressEvent`]s.
///
/// Implementations must return quickly; the pipeline calls this inline.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Default sink: drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Test sink that records everything it is given.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn publish(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingProgress::new();
        sink.publish(ProgressEvent::StageStarted { stage: Stage::Ocr });
        sink.publish(ProgressEvent::ModelSucceeded {
            model: "m1".into(),
            chars: 120,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ProgressEvent::StageStarted { stage: Stage::Ocr });
    }

    #[test]
    fn null_sink_accepts_anything() {
        NullProgress.publish(ProgressEvent::RunFailed {
            reason: "whatever".into(),
        });
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Ocr.as_str(), "ocr");
        assert_eq!(Stage::Analysis.as_str(), "analysis");
    }
}
