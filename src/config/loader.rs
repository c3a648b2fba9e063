// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reading configuration layers.
//!
//! Four layers feed the resolver, lowest priority first:
//!
//! 1. built-in defaults, embedded in the binary
//! 2. `~/.mikucast/settings.toml`
//! 3. `~/.mikucast/.secrets.toml`
//! 4. `MIKUCAST_*` environment variables (`__` as nesting delimiter)
//!
//! File layers are namespaced under a top-level `[default]` table; a file
//! without one contributes its root table instead. A missing file is an
//! empty layer; a present file with malformed TOML is a hard error.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::merger::lowercase_top_level;
use crate::error::ConfigError;

/// Config directory name under the user's home.
pub const APP_DIR_NAME: &str = ".mikucast";

/// User-editable settings file name.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Secrets file name. Holds `api_key` values only; keep it out of VCS.
pub const SECRETS_FILE_NAME: &str = ".secrets.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MIKUCAST_";

/// Nesting delimiter inside environment variable names.
pub const ENV_NESTED_DELIMITER: &str = "__";

/// Built-in defaults, shipped with the binary.
const DEFAULT_PROVIDERS: &str = include_str!("default_providers.toml");

/// Locations of the user-facing configuration files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub dir: PathBuf,
    pub settings_file: PathBuf,
    pub secrets_file: PathBuf,
}

impl ConfigPaths {
    /// Paths rooted at an explicit directory (used by tests and by
    /// embedders that keep configuration outside the home directory).
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            settings_file: dir.join(SETTINGS_FILE_NAME),
            secrets_file: dir.join(SECRETS_FILE_NAME),
            dir,
        }
    }

    /// The default `~/.mikucast` layout.
    pub fn default_paths() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::in_dir(home.join(APP_DIR_NAME)))
    }
}

/// Create the config directory and both user files if absent. Idempotent;
/// runs before the first read so the resolver never races file creation.
pub fn ensure_config_files(paths: &ConfigPaths) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&paths.dir)
        .map_err(|e| ConfigError::io(paths.dir.display().to_string(), &e))?;

    for file in [&paths.settings_file, &paths.secrets_file] {
        if !file.exists() {
            std::fs::write(file, "")
                .map_err(|e| ConfigError::io(file.display().to_string(), &e))?;
        }
    }
    Ok(())
}

/// The embedded defaults layer.
pub fn builtin_defaults() -> Result<Table, ConfigError> {
    let table: Table = toml::from_str(DEFAULT_PROVIDERS)
        .map_err(|e| ConfigError::parse("<built-in defaults>", &e))?;
    Ok(scope_default(table))
}

/// Read one file layer. A missing file is an empty layer.
pub fn read_file_layer(path: &Path) -> Result<Table, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Table::new()),
        Err(e) => return Err(ConfigError::io(path.display().to_string(), &e)),
    };

    let table: Table =
        toml::from_str(&content).map_err(|e| ConfigError::parse(path.display().to_string(), &e))?;
    Ok(scope_default(table))
}

/// Unwrap the `[default]` namespace of a file layer.
///
/// When a `default` table is present (matched case-insensitively), only
/// its contents participate; other top-level sections are treated as
/// alternate environments and ignored. A file without the namespace
/// contributes its root table, so hand-written flat files keep working.
fn scope_default(table: Table) -> Table {
    let mut table = lowercase_top_level(table);
    match table.remove("default") {
        Some(Value::Table(inner)) => lowercase_top_level(inner),
        // `default` present but not a table: nothing usable in this layer.
        Some(_) => Table::new(),
        None => table,
    }
}

/// Build the environment layer from an iterator of `(name, value)` pairs.
///
/// Only names starting with [`ENV_PREFIX`] participate. The remainder is
/// split on [`ENV_NESTED_DELIMITER`] into a key path, lower-cased, and the
/// value is coerced bool -> integer -> float -> string. For example
/// `MIKUCAST_MODEL__NAME=gpt-4o` becomes `model.name = "gpt-4o"`.
///
/// The pairs are injected rather than read from the process here, so tests
/// never mutate global environment state.
pub fn env_layer<I>(vars: I) -> Table
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut layer = Value::Table(Table::new());

    for (name, raw) in vars {
        let Some(path) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }

        let segments: Vec<String> = path
            .split(ENV_NESTED_DELIMITER)
            .map(str::to_lowercase)
            .collect();
        if segments.iter().any(String::is_empty) {
            continue;
        }

        // Build the nested single-key table for this variable, innermost out.
        let mut value = coerce_scalar(&raw);
        for segment in segments.iter().rev() {
            let mut table = Table::new();
            table.insert(segment.clone(), value);
            value = Value::Table(table);
        }
        super::merger::deep_merge(&mut layer, value);
    }

    match layer {
        Value::Table(table) => table,
        _ => unreachable!("env layer is built as a table"),
    }
}

/// Coerce an environment string into the closest TOML scalar.
fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(raw.to_string())
}
