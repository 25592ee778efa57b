//! Regex recovery of patient identity from OCR text and filenames.
//!
//! These are replaceable heuristics, not normative behavior: each field is
//! scanned independently, most specific pattern first, first plausible match
//! wins. Whatever is found here outranks model-supplied identity later in
//! the run.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PatientInfo;

/// Ages outside this range are treated as pattern noise, not data.
const MIN_AGE: u32 = 1;
const MAX_AGE: u32 = 119;

/// Name captures longer than this are a sign the pattern ate a table row.
const MAX_NAME_LEN: usize = 60;

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Patient Name: John Smith" / "PATIENT'S NAME - JANE DOE"
        Regex::new(r"(?i)\bpatient(?:'s)?\s*name\s*[:\-]\s*([A-Za-z][A-Za-z.'\-]*(?:[ \t][A-Za-z][A-Za-z.'\-]*){0,3})").unwrap(),
        // "Patient: John Smith"
        Regex::new(r"(?i)\bpatient\s*[:\-]\s*([A-Za-z][A-Za-z.'\-]*(?:[ \t][A-Za-z][A-Za-z.'\-]*){0,3})").unwrap(),
        // "Name: John Smith"
        Regex::new(r"(?i)\bname\s*[:\-]\s*([A-Za-z][A-Za-z.'\-]*(?:[ \t][A-Za-z][A-Za-z.'\-]*){0,3})").unwrap(),
        // "Mr. John Smith" in running text
        Regex::new(r"\b(?:Mrs|Mr|Ms|Dr)\.?\s+([A-Z][A-Za-z'\-]+(?:[ \t][A-Z][A-Za-z'\-]+){0,2})").unwrap(),
    ]
});

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Age: 45"
        Regex::new(r"(?i)\bage\s*[:\-]\s*(\d{1,3})").unwrap(),
        // "Age/Sex: 45/M"
        Regex::new(r"(?i)\bage\s*/\s*sex\s*[:\-]?\s*(\d{1,3})").unwrap(),
        // "45 years old" / "45 yrs"
        Regex::new(r"(?i)\b(\d{1,3})\s*(?:years?(?:\s+old)?|yrs?\.?|y\.?o\.?)\b").unwrap(),
        // "Age 45" without punctuation
        Regex::new(r"(?i)\bage\s+(\d{1,3})\b").unwrap(),
    ]
});

static GENDER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Gender: Male" / "Sex - F"
        Regex::new(r"(?i)\b(?:gender|sex)\s*[:\-]\s*(male|female|other|m|f)\b").unwrap(),
        // "45/M" shorthand
        Regex::new(r"(?i)\b\d{1,3}\s*(?:years?|yrs?)?\s*/\s*(m|f)\b").unwrap(),
        // Bare mention, last resort
        Regex::new(r"(?i)\b(male|female)\b").unwrap(),
    ]
});

/// Filename conventions that carry a patient name. Applied to the stem
/// (extension already stripped); the capture holds separator-joined words.
static FILENAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Mr_John_Smith", "Dr-Jane-Doe"
        Regex::new(r"(?i)^(?:mrs|mr|ms|dr)[._\s\-]+([A-Za-z]+(?:[._\s\-][A-Za-z]+){0,3})$").unwrap(),
        // "Report_Jane_Doe"
        Regex::new(r"(?i)^report[._\s\-]+([A-Za-z]+(?:[._\s\-][A-Za-z]+){0,3})$").unwrap(),
        // "12345_Alice_Brown"
        Regex::new(r"^\d+[._\s\-]+([A-Za-z]+(?:[._\s\-][A-Za-z]+){0,3})$").unwrap(),
    ]
});

/// Scan OCR text for the identity trio. Fields the patterns miss stay
/// `None`; everything else in the returned struct is untouched default.
pub fn scan_text(text: &str) -> PatientInfo {
    PatientInfo {
        name: first_capture(&NAME_PATTERNS, text).and_then(clean_name),
        age: first_capture(&AGE_PATTERNS, text)
            .and_then(|c| c.parse::<u32>().ok())
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age)),
        gender: first_capture(&GENDER_PATTERNS, text).map(normalize_gender),
        ..Default::default()
    }
}

/// Try to pull a patient name out of the uploaded filename.
pub fn scan_filename(filename: &str) -> Option<String> {
    let stem = match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[..pos],
        _ => filename,
    };

    for pattern in FILENAME_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(stem) {
            if let Some(words) = caps.get(1) {
                let name = words
                    .as_str()
                    .split(['.', '_', ' ', '-'])
                    .filter(|w| !w.is_empty())
                    .map(title_case)
                    .collect::<Vec<_>>()
                    .join(" ");
                if !name.is_empty() {
                    return Some(name);
                }
            }
        }
    }
    None
}

/// Full scan for one upload: text patterns first, filename as a fallback
/// source for the name only.
pub fn scan(text: &str, filename: &str) -> PatientInfo {
    let mut info = scan_text(text);
    if info.name.is_none() {
        info.name = scan_filename(filename);
    }
    info
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

fn clean_name(raw: String) -> Option<String> {
    let name = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(['.', ',', ':', '-'])
        .to_string();

    if name.is_empty() || name.len() > MAX_NAME_LEN || name.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(name)
}

fn normalize_gender(raw: String) -> String {
    match raw.to_lowercase().as_str() {
        "m" => "male".to_string(),
        "f" => "female".to_string(),
        other => other.to_string(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
