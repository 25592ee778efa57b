pub mod document;
pub mod metric;
pub mod patient;
pub mod report;

pub use document::{EncodedDocument, MediaType, UploadedDocument};
pub use metric::{HealthMetric, HistoryPoint, MetricStatus, MetricValue};
pub use patient::PatientInfo;
pub use report::{AnalysisResult, ReportKind, StoredReport};
