//! Prompt text for the two provider round-trips.
//!
//! The OCR instruction rides along with the encoded document; the analysis
//! prompt carries the OCR text and pins down the exact JSON shape the
//! analyzer expects back.

/// Instruction sent with the encoded document for the OCR pass.
pub const OCR_INSTRUCTION: &str = "\
You are a medical document transcriber. Extract ALL text from this health \
report document exactly as written.

RULES:
1. Transcribe every value, unit, reference range, and label verbatim.
2. Preserve the reading order of tables row by row.
3. Include patient details, dates, doctor and facility names if present.
4. Do NOT interpret, summarize, or omit anything.
5. Output plain text only, no commentary about the task.";

/// Build the structuring prompt for extracted report text.
pub fn build_analysis_prompt(ocr_text: &str) -> String {
    format!(
        r#"You are a health data analyst. Convert the lab report text below into
structured JSON. Use ONLY information explicitly present in the text. For any
field not present, use null (or an empty array).

<report>
{ocr_text}
</report>

Respond with a single JSON object in exactly this shape:

```json
{{
  "patient": {{
    "name": "Full name or null",
    "age": 0,
    "gender": "male | female | other or null",
    "date_of_birth": "YYYY-MM-DD or null",
    "patient_id": "identifier or null",
    "collection_date": "date or null",
    "report_date": "date or null",
    "doctor_name": "name or null",
    "hospital_name": "facility or null"
  }},
  "metrics": [
    {{
      "name": "e.g., Hemoglobin",
      "value": 13.5,
      "unit": "e.g., g/dL",
      "status": "normal | warning | danger",
      "reference_range": "e.g., 12-16 g/dL",
      "description": "one plain-language sentence about what this measures",
      "category": "e.g., Blood, Lipids, Liver, Kidney"
    }}
  ],
  "recommendations": ["short actionable suggestion"],
  "summary": "2-3 sentence overview of the report",
  "detailed_analysis": "longer discussion of notable values",
  "categories": ["every category used in metrics"]
}}

RULES:
1. Every metric found in the report MUST appear in the metrics array.
2. status reflects the report's own flags when present; otherwise compare
   the value against its reference range.
3. Values stay numeric where the report is numeric; ratios like "120/80"
   stay text.
4. Output the JSON object and nothing else.
```"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_report_text() {
        let prompt = build_analysis_prompt("Hemoglobin 13.5 g/dL (12-16)");
        assert!(prompt.contains("Hemoglobin 13.5 g/dL (12-16)"));
        assert!(prompt.contains("<report>"));
        assert!(prompt.contains("</report>"));
    }

    #[test]
    fn analysis_prompt_pins_json_shape() {
        let prompt = build_analysis_prompt("text");
        assert!(prompt.contains(r#""metrics""#));
        assert!(prompt.contains(r#""reference_range""#));
        assert!(prompt.contains("normal | warning | danger"));
        assert!(prompt.contains(r#""detailed_analysis""#));
    }

    #[test]
    fn ocr_instruction_forbids_interpretation() {
        assert!(OCR_INSTRUCTION.contains("ALL text"));
        assert!(OCR_INSTRUCTION.contains("Do NOT interpret"));
    }
}
