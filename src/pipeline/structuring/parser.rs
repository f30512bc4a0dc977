use std::sync::LazyLock;

use regex::Regex;

use super::types::ExplanationSections;
use super::InterpretationError;
use crate::models::StructuredMetadata;

/// Parse the completion service's metadata answer.
///
/// Tolerates a surrounding markdown code fence. Anything that is not a JSON
/// object with the expected field shapes is rejected as a whole.
pub fn parse_metadata(response: &str) -> Result<StructuredMetadata, InterpretationError> {
    let body = strip_code_fence(response);
    if body.is_empty() {
        return Err(InterpretationError::MalformedMetadata(
            "empty response".into(),
        ));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| InterpretationError::MalformedMetadata(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(InterpretationError::MalformedMetadata(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| InterpretationError::MalformedMetadata(format!("unexpected field shape: {e}")))
}

/// Remove a leading ```json (or bare ```) fence and its closing fence.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches("json"),
    };
    rest.trim_end().trim_end_matches("```").trim()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ──────────────────────────────────────────────
// Explanation sections
// ──────────────────────────────────────────────

/// One anchored pattern per numbered heading line ("## 3. ..." etc.).
static HEADING_PATTERNS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        Regex::new(&format!(r"(?m)^[ \t]*#{{1,4}}[ \t]*{}\.[^\n]*$", i + 1))
            .expect("static heading regex")
    })
});

/// Split an explanation into its six named slots.
///
/// Each slot is located independently: the content after heading `i` runs up
/// to the first later-numbered heading that follows it, or to the end of the
/// text. A missing heading leaves only its own slot empty.
pub fn parse_explanation_sections(text: &str) -> ExplanationSections {
    ExplanationSections {
        about: section_body(text, 0),
        important_points: section_body(text, 1),
        directions: section_body(text, 2),
        deadlines: section_body(text, 3),
        next_steps: section_body(text, 4),
        disclaimer: section_body(text, 5),
    }
}

fn section_body(text: &str, index: usize) -> String {
    let patterns = &*HEADING_PATTERNS;
    let Some(heading) = patterns[index].find(text) else {
        return String::new();
    };
    let rest = &text[heading.end()..];
    let end = patterns[index + 1..]
        .iter()
        .filter_map(|p| p.find(rest).map(|m| m.start()))
        .min()
        .unwrap_or(rest.len());
    rest[..end].trim().to_string()
}
