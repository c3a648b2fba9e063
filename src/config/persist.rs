// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Writing configuration back to the user files.
//!
//! Persistence is a read-merge-write cycle against exactly two files:
//! non-secret fields go to `settings.toml`, `api_key` values go to
//! `.secrets.toml`. Both are written under the `[default]` namespace.
//! Merging with the on-disk contents means saving one provider's key never
//! drops the keys already stored for other providers.
//!
//! Not safe for concurrent writers; callers serialize writes.

use std::path::Path;

use toml::{Table, Value};

use super::loader::ConfigPaths;
use super::merger::{deep_merge, lowercase_top_level};
use crate::error::ConfigError;

/// Key that identifies secret values.
const SECRET_KEY: &str = "api_key";

/// Merge the two deltas into their files on disk.
///
/// `settings_delta` and `secrets_delta` are plain (un-namespaced) tables,
/// e.g. `{ model = { provider = "openai", name = "gpt-4o" } }`. Any
/// `api_key` that strays into `settings_delta` is stripped before writing,
/// and `secrets_delta` is reduced to its `api_key`-shaped values, so the
/// secret/non-secret split holds no matter what the caller assembled.
pub fn persist(
    paths: &ConfigPaths,
    settings_delta: Table,
    secrets_delta: Table,
) -> Result<(), ConfigError> {
    let mut settings_delta = Value::Table(settings_delta);
    strip_secret_keys(&mut settings_delta);

    let mut secrets_delta = Value::Table(secrets_delta);
    retain_secret_keys(&mut secrets_delta);

    merge_into_file(&paths.settings_file, settings_delta)?;
    merge_into_file(&paths.secrets_file, secrets_delta)?;
    Ok(())
}

/// Read-merge-write one file, scoping the delta under `[default]`.
fn merge_into_file(path: &Path, delta: Value) -> Result<(), ConfigError> {
    let mut doc = read_raw(path)?;

    if !matches!(doc.get("default"), Some(Value::Table(_))) {
        doc.insert("default".to_string(), Value::Table(Table::new()));
    }
    if let Some(section) = doc.get_mut("default") {
        deep_merge(section, delta);
    }

    let rendered = toml::to_string_pretty(&doc)
        .map_err(|e| ConfigError::Schema(e.to_string()))?;
    std::fs::write(path, rendered).map_err(|e| ConfigError::io(path.display().to_string(), &e))
}

/// Read a file's raw table without unwrapping the `[default]` namespace,
/// since the write must preserve whatever structure is already there.
fn read_raw(path: &Path) -> Result<Table, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::io(path.display().to_string(), &e)),
    };
    let table: Table =
        toml::from_str(&content).map_err(|e| ConfigError::parse(path.display().to_string(), &e))?;
    Ok(lowercase_top_level(table))
}

/// Remove every `api_key` entry, recursively.
fn strip_secret_keys(value: &mut Value) {
    if let Value::Table(table) = value {
        table.remove(SECRET_KEY);
        for (_, nested) in table.iter_mut() {
            strip_secret_keys(nested);
        }
    }
}

/// Drop everything that is not an `api_key` (or a table on the way to
/// one), recursively. Empty subtrees are pruned.
fn retain_secret_keys(value: &mut Value) {
    if let Value::Table(table) = value {
        let entries = std::mem::take(table);
        for (key, mut nested) in entries {
            if key == SECRET_KEY && nested.is_str() {
                table.insert(key, nested);
            } else if nested.is_table() {
                retain_secret_keys(&mut nested);
                if nested.as_table().is_some_and(|t| !t.is_empty()) {
                    table.insert(key, nested);
                }
            }
        }
    }
}
