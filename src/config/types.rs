// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Settings schema and semantic validation.
//!
//! [`Settings`] is the fully merged application configuration. It is
//! constructed once per process by the resolver and treated as an
//! immutable snapshot afterwards; commands never mutate it in place, and
//! persistence goes back through the source files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

use crate::error::ValidationError;

/// The merged, top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub model: ModelSelection,
    pub providers: BTreeMap<String, ProviderRecord>,
}

/// Logging preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Minimum level to record (`trace` .. `error`).
    pub level: String,
    /// Optional file to write logs to; without it, logs go to stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logfile: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            logfile: None,
        }
    }
}

/// The currently selected provider and model, referenced by key.
///
/// The provider is a weak reference into [`Settings::providers`], resolved
/// at read time; a dangling reference is a validation error, not a panic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One provider's connection profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderRecord {
    /// Absolute http/https URL of the API root. Kept as a string so it
    /// round-trips persist/resolve unchanged.
    pub base_url: String,

    /// Prefix for the `Authorization` header value.
    pub auth_header_prefix: String,

    /// Path appended to `base_url` to list models.
    pub models_endpoint: String,

    /// Path expression locating the model list in the response JSON.
    pub models_list_path: String,

    /// Path expression locating the id within each list element.
    pub model_id_field: String,

    /// Secret. Lives only in the secrets layer; never printed or logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ProviderRecord {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_header_prefix: "Bearer".to_string(),
            models_endpoint: "/models".to_string(),
            models_list_path: "data".to_string(),
            model_id_field: "id".to_string(),
            api_key: None,
        }
    }
}

impl ProviderRecord {
    /// Check that `base_url` is an absolute http/https URL with a host.
    pub fn has_valid_base_url(&self) -> bool {
        is_valid_base_url(&self.base_url)
    }
}

/// True for absolute URLs with scheme http/https and a non-empty host.
pub fn is_valid_base_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

impl Settings {
    /// Run the semantic validation rules, collecting one message per
    /// violated rule. Structural problems (wrong types, bad TOML) never
    /// reach this point; the resolver rejects those as [`crate::ConfigError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        match self.model.provider.as_deref() {
            None | Some("") => {
                violations.push("model.provider is not set; run `mikucast setup`".to_string());
            }
            Some(key) => {
                if !self.providers.contains_key(key) {
                    violations.push(format!(
                        "model.provider references `{key}` but no [providers.{key}] entry exists"
                    ));
                }
            }
        }

        if self.model.name.as_deref().is_none_or(str::is_empty) {
            violations.push("model.name is not set; run `mikucast setup`".to_string());
        }

        for (key, record) in &self.providers {
            if !record.has_valid_base_url() {
                violations.push(format!(
                    "providers.{key}.base_url `{}` is not a valid http(s) URL",
                    record.base_url
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// The `bool` form of [`Settings::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The record for the currently selected provider, if both the
    /// selection and the record exist.
    pub fn active_provider(&self) -> Option<(&str, &ProviderRecord)> {
        let key = self.model.provider.as_deref()?;
        let record = self.providers.get(key)?;
        Some((key, record))
    }

    /// A copy safe for display: API keys replaced with a placeholder.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        for record in copy.providers.values_mut() {
            if record.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                record.api_key = Some("********".to_string());
            }
        }
        copy
    }
}
