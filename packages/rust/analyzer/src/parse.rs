//! Locating and validating the verdict JSON in a model reply.
//!
//! Location is lenient (bare object, fenced block, or the first balanced
//! `{...}` region). Validation is not: the three fields must be present with
//! exactly the expected types and tier names.

use serde_json::Value;
use tracing::debug;

use scout_shared::{AnalysisError, RelevanceVerdict};

/// Parse a model reply into a verdict.
pub fn parse_verdict(reply: &str) -> Result<RelevanceVerdict, AnalysisError> {
    let value = locate_json(reply).ok_or_else(|| {
        AnalysisError::malformed_response(format!(
            "no JSON object found in model reply ({} chars)",
            reply.len()
        ))
    })?;

    serde_json::from_value::<RelevanceVerdict>(value)
        .map_err(|e| AnalysisError::malformed_response(format!("verdict does not match schema: {e}")))
}

/// The first JSON object found by the location strategies, in order.
fn locate_json(reply: &str) -> Option<Value> {
    let trimmed = reply.trim();

    let candidates = [
        ("whole", Some(trimmed)),
        ("fence", fenced_block(trimmed)),
        ("region", first_object(trimmed)),
    ];

    for (strategy, candidate) in candidates {
        let Some(text) = candidate else { continue };
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
            debug!(strategy, "verdict JSON located");
            return Some(value);
        }
    }
    None
}

/// Contents of the first ``` fenced block (with or without a `json` tag).
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// The first balanced `{...}` region, skipping braces inside strings.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let region = &text[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in region.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&region[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
