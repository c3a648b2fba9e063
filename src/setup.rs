// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Setup orchestration.
//!
//! Drives the configure-a-provider flow: assemble a candidate record from
//! the chosen provider's existing entry (or vendor defaults) plus the
//! caller's overrides, discover models through the registry, and hand the
//! final selection back to the config layer for persistence. All terminal
//! I/O stays in the CLI; this module only decides and persists.
//!
//! Model discovery failing is not a stop: the outcome tells the caller
//! that a manually entered model name is required instead.

use anyhow::{bail, Context};
use toml::{Table, Value};
use tracing::info;

use crate::config::{self, is_valid_base_url, ConfigPaths, ProviderRecord, Settings};
use crate::error::FetchError;
use crate::providers::ModelFetcher;

/// The caller's answers for one setup run.
#[derive(Debug, Clone, Default)]
pub struct SetupRequest {
    /// Provider key to configure (`openai`, `gemini`, `anthropic`, or any
    /// custom name).
    pub provider: String,
    /// Override for the provider's base URL. Required for providers that
    /// have no configured record yet.
    pub base_url: Option<String>,
    /// API key to store in the secrets file.
    pub api_key: Option<String>,
    /// Model to select. When omitted, discovery decides the outcome.
    pub model: Option<String>,
}

/// What a setup run produced.
#[derive(Debug)]
pub enum SetupOutcome {
    /// The selection was persisted; effective on the next resolve.
    Saved { provider: String, model: String },
    /// Discovery found models but none was chosen; the caller should
    /// present the list and rerun with a model.
    ModelChoiceNeeded { models: Vec<String> },
    /// Discovery produced nothing; a manually entered model is required.
    /// `reason` carries the fetch failure when there was one.
    ManualModelNeeded { reason: Option<FetchError> },
}

/// Run one setup pass against an immutable settings snapshot.
pub async fn run_setup(
    settings: &Settings,
    paths: &ConfigPaths,
    request: SetupRequest,
) -> crate::error::Result<SetupOutcome> {
    if request.provider.is_empty() {
        bail!("a provider key is required");
    }

    let record = candidate_record(settings, &request)?;

    let model = match request.model.as_deref().filter(|m| !m.is_empty()) {
        Some(model) => model.to_string(),
        None => {
            // No explicit choice; let discovery decide the outcome.
            let fetcher = ModelFetcher::bind(&request.provider, record.clone());
            let (models, fetch_error) = fetcher.fetch_models_or_empty().await;
            if models.is_empty() {
                return Ok(SetupOutcome::ManualModelNeeded {
                    reason: fetch_error,
                });
            }
            return Ok(SetupOutcome::ModelChoiceNeeded { models });
        }
    };

    persist_selection(paths, &request.provider, &record, &model)
        .context("saving configuration")?;

    info!(provider = %request.provider, %model, "setup persisted");
    Ok(SetupOutcome::Saved {
        provider: request.provider,
        model,
    })
}

/// Build the record the fetch (and the save) will use: the existing entry
/// for this key if there is one, vendor defaults otherwise, with the
/// caller's URL and key overrides applied on top.
fn candidate_record(
    settings: &Settings,
    request: &SetupRequest,
) -> crate::error::Result<ProviderRecord> {
    let mut record = settings
        .providers
        .get(&request.provider)
        .cloned()
        .unwrap_or_default();

    if let Some(url) = &request.base_url {
        record.base_url = url.clone();
    }
    if record.base_url.is_empty() {
        bail!(
            "provider `{}` has no base URL; pass --base-url",
            request.provider
        );
    }
    if !is_valid_base_url(&record.base_url) {
        bail!(
            "`{}` is not a valid http(s) URL (expected e.g. https://api.example.com/v1)",
            record.base_url
        );
    }

    if let Some(key) = request.api_key.as_deref().filter(|k| !k.is_empty()) {
        record.api_key = Some(key.to_string());
    }

    Ok(record)
}

/// Write the chosen provider/model to the settings file and the API key
/// (when present) to the secrets file.
fn persist_selection(
    paths: &ConfigPaths,
    provider: &str,
    record: &ProviderRecord,
    model: &str,
) -> Result<(), crate::error::ConfigError> {
    let mut model_table = Table::new();
    model_table.insert("provider".to_string(), Value::String(provider.to_string()));
    model_table.insert("name".to_string(), Value::String(model.to_string()));

    let mut provider_table = Table::new();
    provider_table.insert(
        "base_url".to_string(),
        Value::String(record.base_url.clone()),
    );

    let mut providers = Table::new();
    providers.insert(provider.to_string(), Value::Table(provider_table));

    let mut settings_delta = Table::new();
    settings_delta.insert("model".to_string(), Value::Table(model_table));
    settings_delta.insert("providers".to_string(), Value::Table(providers));

    let mut secrets_delta = Table::new();
    if let Some(api_key) = record.api_key.as_deref().filter(|k| !k.is_empty()) {
        let mut secret = Table::new();
        secret.insert("api_key".to_string(), Value::String(api_key.to_string()));
        let mut secret_providers = Table::new();
        secret_providers.insert(provider.to_string(), Value::Table(secret));
        secrets_delta.insert("providers".to_string(), Value::Table(secret_providers));
    }

    config::persist(paths, settings_delta, secrets_delta)
}
