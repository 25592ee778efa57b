//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Models asked for "JSON only" still wrap the object in prose, markdown
//! fences, or both. The ladder here tries the cheapest reading first and
//! gives up quietly; callers decide what a miss means.

use serde_json::Value;

/// Pull the first JSON object out of `text`, if one can be read.
///
/// Order of attempts: the whole string, then a fenced ```json block, then
/// the outermost `{`..`}` span. Only objects count; a bare JSON string or
/// number is not a usable payload here.
pub fn extract_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.is_object() {
            return Some(v);
        }
    }

    if let Some(candidate) = fenced_block(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(candidate) {
            if v.is_object() {
                return Some(v);
            }
        }
    }

    if let Some(candidate) = outermost_braces(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(candidate) {
            if v.is_object() {
                return Some(v);
            }
        }
    }

    None
}

/// Content of the first ```json (or bare ```) fence, if the fence closes.
fn fenced_block(text: &str) -> Option<&str> {
    let start = match text.find("```json") {
        Some(pos) => pos + 7,
        None => text.find("```")? + 3,
    };
    let end = text[start..].find("```")?;
    Some(text[start..start + end].trim())
}

/// The span from the first `{` to the last `}`, inclusive.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
