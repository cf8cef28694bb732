//! Provider response normalization
//!
//! Both providers are asked for JSON, but what comes back varies: a bare
//! array, an object wrapping the array under some key, and occasionally the
//! whole thing inside a markdown code fence. Everything funnels through
//! [`parse_prompt_list`] so callers only ever see an ordered `Vec<String>`.

use crate::{Error, Result};
use serde_json::Value;

const FENCE: &str = "```";

/// Extract an ordered list of prompt strings from raw provider text.
pub fn parse_prompt_list(raw: &str) -> Result<Vec<String>> {
    let body = strip_code_fence(raw.trim());

    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse JSON response from AI: {}", body);
        Error::Format(format!("invalid JSON: {}", e))
    })?;

    extract_strings(&parsed).ok_or_else(|| {
        tracing::error!("AI response is not a valid array of strings: {}", body);
        Error::Format("response is not a valid array of strings".to_string())
    })
}

/// Remove a surrounding ```` ```lang ... ``` ```` fence if it spans the whole text.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    else {
        return text;
    };

    // Optional language hint directly after the opening fence.
    let tag_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(inner.len());

    inner[tag_len..].trim()
}

/// Object keys are scanned in document order, numeric-looking keys included.
fn extract_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => string_array(items),
        Value::Object(map) => map.values().find_map(|v| match v {
            Value::Array(items) => string_array(items),
            _ => None,
        }),
        _ => None,
    }
}

fn string_array(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
