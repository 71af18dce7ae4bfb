//! Completion text to JSON object extraction.
//!
//! Providers often wrap the requested JSON in a Markdown fence or surround it with prose.
//! Extraction strips a leading fence, then takes the span from the first `{` to the last
//! `}` found by one linear scan. Input is capped at `MAX_COMPLETION_BYTES`, so the worst
//! case is a single pass over that many bytes followed by one `serde_json` parse (which
//! enforces its own recursion limit). Every failure is a `MalformedResponse`; no input
//! panics.

use crate::error::EngineError;
use crate::provider::response::ParsedResult;
use serde_json::Value;

/// Upper bound on completion text accepted for parsing.
pub const MAX_COMPLETION_BYTES: usize = 256 * 1024;

const FENCE: &str = "```";

/// Remove a Markdown code fence wrapping the whole text, e.g. "```json\n{...}\n```".
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.trim_end();
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

/// Span from the first `{` to the last `}`, when both exist in that order.
pub fn json_object_span(text: &str) -> Option<&str> {
    let mut first_open = None;
    let mut last_close = None;
    for (index, byte) in text.bytes().enumerate() {
        match byte {
            b'{' if first_open.is_none() => first_open = Some(index),
            b'}' => last_close = Some(index),
            _ => {}
        }
    }
    match (first_open, last_close) {
        // Braces are ASCII, so both indices sit on char boundaries.
        (Some(start), Some(end)) if end > start => Some(&text[start..=end]),
        _ => None,
    }
}

/// Parse provider completion text into a `ParsedResult`.
pub fn parse_completion(text: &str) -> Result<ParsedResult, EngineError> {
    if text.len() > MAX_COMPLETION_BYTES {
        return Err(EngineError::MalformedResponse(format!(
            "completion is {} bytes, limit is {}",
            text.len(),
            MAX_COMPLETION_BYTES
        )));
    }

    let unfenced = strip_code_fence(text);
    let candidate = json_object_span(unfenced).unwrap_or(unfenced);

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| EngineError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(EngineError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    Ok(ParsedResult::from_value(&value))
}
