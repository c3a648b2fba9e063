// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Declarative extraction of model identifiers from provider JSON.
//!
//! Providers disagree wildly about where the model list lives in their
//! `GET /models`-style responses (`data[*].id` for OpenAI-compatible APIs,
//! `models[*].name` for Gemini-shaped ones, anything at all for
//! self-hosted gateways). Rather than a parser per vendor, the shape is
//! described by two path expressions: where the list is, and which field
//! of each element is the id.
//!
//! Path expressions address nested keys with `.` and array elements with
//! `[idx]`, e.g. `result.models[0].id`.

use serde_json::Value;
use std::collections::BTreeSet;

/// Evaluate a path expression against a JSON document.
///
/// Returns `None` when any step of the path is missing or addresses a
/// value of the wrong type (a key into a non-object, an index into a
/// non-array). An empty path yields the document itself.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }

    let mut current = doc;
    for segment in path.split('.') {
        let (key, indices) = parse_segment(segment)?;
        if !key.is_empty() {
            current = current.as_object()?.get(key)?;
        }
        for idx in indices {
            current = current.as_array()?.get(idx)?;
        }
    }
    Some(current)
}

/// Split one path segment into its key and trailing array indices.
///
/// `models[0][2]` -> `("models", [0, 2])`; a bare `[0]` has an empty key.
fn parse_segment(segment: &str) -> Option<(&str, Vec<usize>)> {
    if segment.is_empty() {
        return None;
    }

    let bracket = segment.find('[');
    let (key, rest) = match bracket {
        Some(pos) => (&segment[..pos], &segment[pos..]),
        None => (segment, ""),
    };

    let mut indices = Vec::new();
    let mut remaining = rest;
    while !remaining.is_empty() {
        if !remaining.starts_with('[') {
            return None;
        }
        let close = remaining.find(']')?;
        let idx: usize = remaining[1..close].parse().ok()?;
        indices.push(idx);
        remaining = &remaining[close + 1..];
    }

    Some((key, indices))
}

/// Pull an ordered, deduplicated set of model ids out of `doc`.
///
/// `list_path` must address a JSON array; if it does not, the result is
/// `None`, which callers report as an unexpected response shape (not a
/// process error). Elements that are not objects, and elements whose
/// `id_field` is missing or not a string, are silently discarded. The
/// surviving ids are deduplicated and sorted ascending so interactive
/// display order is deterministic.
pub fn extract_model_ids(doc: &Value, list_path: &str, id_field: &str) -> Option<Vec<String>> {
    let list = lookup(doc, list_path)?.as_array()?;

    let mut ids = BTreeSet::new();
    for item in list {
        if !item.is_object() {
            continue;
        }
        if let Some(id) = lookup(item, id_field).and_then(Value::as_str) {
            ids.insert(id.to_string());
        }
    }

    Some(ids.into_iter().collect())
}
