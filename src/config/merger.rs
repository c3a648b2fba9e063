// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Deep merging of configuration layers.
//!
//! Layers are ordered lowest to highest priority. Tables merge key-by-key,
//! recursively; scalars and arrays from a higher layer overwrite the lower
//! value wholesale. Top-level section names are lower-cased first so
//! `[DEFAULT]` and `[default]` address the same section.

use toml::{Table, Value};

/// Merge `overlay` into `base`, with `overlay` winning on conflicts.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_table.insert(key, overlay_value);
                    }
                }
            }
        }
        // Scalars and arrays overwrite wholesale; no element-wise merging.
        (base, overlay) => *base = overlay,
    }
}

/// Fold an ordered list of layers (lowest priority first) into one table.
pub fn merge_layers<I>(layers: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let mut merged = Value::Table(Table::new());
    for layer in layers {
        deep_merge(&mut merged, Value::Table(lowercase_top_level(layer)));
    }
    match merged {
        Value::Table(table) => table,
        _ => unreachable!("merge of tables is a table"),
    }
}

/// Lower-case the top-level keys of a layer for case-insensitive section
/// matching. Nested keys are left as written.
pub fn lowercase_top_level(table: Table) -> Table {
    table
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}
