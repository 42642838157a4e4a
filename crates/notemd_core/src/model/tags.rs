//! Tag list encoding for the `notes.tags` text column.
//!
//! # Invariants
//! - Encoded form is always a JSON array, `[]` for no tags.
//! - Encoding trims, drops blanks and deduplicates keeping first-seen order.
//! - Decoding never fails: legacy comma-separated text and broken JSON fall
//!   back to comma splitting.

use log::debug;
use serde_json::Value;
use std::collections::HashSet;

/// Trims, drops blank values and deduplicates, preserving first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

/// Encodes tags as a JSON array string.
pub fn encode_tags<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized = normalize_tags(tags);
    // A Vec<String> always serializes.
    serde_json::to_string(&normalized).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a stored tag column value.
pub fn decode_tags(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(values) => {
                return values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Err(err) => {
                debug!("event=tags_decode module=model status=fallback reason=invalid_json error={err}");
            }
        }
    }

    split_comma_separated(trimmed)
}

fn split_comma_separated(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
