//! Turns raw model text into a validated [`EvaluationResult`].

use crate::error::SchemaParseError;
use crate::evaluation::EvaluationResult;

const FENCE: &str = "```";

/// Removes a surrounding Markdown code fence (with or without a language
/// tag) and surrounding whitespace. Text without a fence comes back trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

/// Strips fences, parses the JSON into the typed schema and validates it.
/// Any deviation, including a parseable document of the wrong shape, is a
/// [`SchemaParseError`].
pub fn normalize(raw: &str) -> Result<EvaluationResult, SchemaParseError> {
    let body = strip_code_fence(raw);
    let result: EvaluationResult = serde_json::from_str(body)?;
    result.validate()?;
    Ok(result)
}
