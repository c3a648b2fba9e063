// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Layered configuration resolution.
//!
//! Settings come from four sources, merged lowest to highest priority:
//! built-in defaults, `~/.mikucast/settings.toml`,
//! `~/.mikucast/.secrets.toml`, and `MIKUCAST_*` environment variables.
//! The merged document is deserialized into [`Settings`] (the structural
//! schema check); semantic rules live in [`Settings::validate`].
//!
//! Resolution happens once per process start. The resulting [`Settings`]
//! is an immutable snapshot; changes go through [`persist`] and take
//! effect on the next resolve.

mod loader;
mod merger;
mod persist;
mod types;

pub use loader::{
    ensure_config_files, env_layer, ConfigPaths, APP_DIR_NAME, ENV_NESTED_DELIMITER, ENV_PREFIX,
    SECRETS_FILE_NAME, SETTINGS_FILE_NAME,
};
pub use merger::{deep_merge, lowercase_top_level, merge_layers};
pub use persist::persist;
pub use types::{
    is_valid_base_url, LogSettings, ModelSelection, ProviderRecord, Settings,
};

use toml::Table;

use crate::error::ConfigError;

/// Resolve settings from the default `~/.mikucast` layout and the process
/// environment. The main entry point for the CLI.
pub fn resolve() -> Result<Settings, ConfigError> {
    let paths = ConfigPaths::default_paths()?;
    resolve_from(&paths, std::env::vars())
}

/// Resolve settings from explicit paths and an explicit set of
/// environment pairs. Tests use this to stay off the process environment.
pub fn resolve_from<I>(paths: &ConfigPaths, env: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    ensure_config_files(paths)?;

    let merged = merge_layers([
        loader::builtin_defaults()?,
        loader::read_file_layer(&paths.settings_file)?,
        loader::read_file_layer(&paths.secrets_file)?,
        env_layer(env),
    ]);

    settings_from_table(merged)
}

/// Deserialize a merged layer table into the typed schema.
fn settings_from_table(table: Table) -> Result<Settings, ConfigError> {
    // Round-trip through a TOML document; the toml deserializer reports
    // precise field-level messages this way.
    let rendered = toml::to_string(&table).map_err(|e| ConfigError::Schema(e.to_string()))?;
    toml::from_str(&rendered).map_err(|e| ConfigError::Schema(e.message().to_string()))
}
