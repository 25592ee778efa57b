//! Keyword classification of report type.
//!
//! A replaceable lookup table, scanned in order: panel names first, then
//! distinctive analyte words. Nothing matching means a generic blood report.

use crate::models::ReportKind;

/// First matching keyword wins, so panel names must sort above the analyte
/// words they contain ("lipid panel" above "cholesterol").
const KIND_KEYWORDS: &[(&str, ReportKind)] = &[
    ("complete blood count", ReportKind::Cbc),
    ("full blood count", ReportKind::Cbc),
    ("cbc", ReportKind::Cbc),
    ("hemogram", ReportKind::Cbc),
    ("lipid profile", ReportKind::Lipid),
    ("lipid panel", ReportKind::Lipid),
    ("metabolic panel", ReportKind::Metabolic),
    ("electrolyte", ReportKind::Metabolic),
    ("liver function", ReportKind::Liver),
    ("hepatic panel", ReportKind::Liver),
    ("liver panel", ReportKind::Liver),
    ("kidney function", ReportKind::Kidney),
    ("renal function", ReportKind::Kidney),
    ("renal panel", ReportKind::Kidney),
    ("thyroid", ReportKind::Thyroid),
    ("tsh", ReportKind::Thyroid),
    ("cholesterol", ReportKind::Cholesterol),
    ("triglyceride", ReportKind::Lipid),
    ("hba1c", ReportKind::Glucose),
    ("glycated hemoglobin", ReportKind::Glucose),
    ("glucose", ReportKind::Glucose),
];

/// Classify a report from its OCR text. Case-insensitive substring scan.
pub fn classify_report(text: &str) -> ReportKind {
    let lower = text.to_lowercase();
    for (keyword, kind) in KIND_KEYWORDS {
        if lower.contains(keyword) {
            return *kind;
        }
    }
    ReportKind::Blood
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cbc() {
        assert_eq!(
            classify_report("COMPLETE BLOOD COUNT\nHemoglobin 13.5 g/dL"),
            ReportKind::Cbc
        );
    }

    #[test]
    fn classifies_lipid_panel() {
        assert_eq!(
            classify_report("Lipid Panel: Total Cholesterol 210 mg/dL"),
            ReportKind::Lipid
        );
    }

    #[test]
    fn panel_name_outranks_analyte_word() {
        // "glucose" also appears, but the panel heading decides
        assert_eq!(
            classify_report("Comprehensive Metabolic Panel\nGlucose: 95 mg/dL"),
            ReportKind::Metabolic
        );
    }

    #[test]
    fn classifies_thyroid_from_tsh() {
        assert_eq!(classify_report("TSH 2.4 mIU/L, T4 within range"), ReportKind::Thyroid);
    }

    #[test]
    fn bare_cholesterol_mention() {
        assert_eq!(
            classify_report("Cholesterol: 210 mg/dL (125-200)"),
            ReportKind::Cholesterol
        );
    }

    #[test]
    fn unknown_text_defaults_to_blood() {
        assert_eq!(classify_report("Vitamin D 32 ng/mL"), ReportKind::Blood);
    }

    #[test]
    fn empty_text_defaults_to_blood() {
        assert_eq!(classify_report(""), ReportKind::Blood);
    }
}
