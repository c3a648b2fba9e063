// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Provider registry and model-discovery strategies.
//!
//! Every provider, vendor-known or user-defined, answers the same
//! question through the same HTTP path: "which models do you offer?".
//! Vendor differences are data, not code: a known vendor hard-wires the
//! response shape (where the model list lives, which field is the id),
//! while `custom` and unrecognized keys use whatever shape the provider's
//! record declares. [`ProviderRegistry::resolve`] binds a key's record to
//! a [`ModelFetcher`], the single execution path.

mod fetch;

pub use fetch::{ModelFetcher, FETCH_TIMEOUT};

use crate::config::Settings;
use crate::error::ConfigError;

/// The known provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-shaped listing: list at `data`, ids at `id`.
    OpenAi,
    /// Gemini-shaped listing: list at `models`, ids at `name`.
    Gemini,
    /// Anthropic-shaped listing: list at `data`, ids at `id`.
    Anthropic,
    /// Anything else; the record's own shape fields drive extraction.
    Custom,
}

/// Where model ids live in a vendor's list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseShape {
    pub models_list_path: &'static str,
    pub model_id_field: &'static str,
}

impl ProviderKind {
    /// Classify a provider key. Unrecognized keys are `Custom`; this
    /// never fails because every key gets the generic strategy at worst.
    pub fn from_key(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "gemini" => Self::Gemini,
            "anthropic" => Self::Anthropic,
            _ => Self::Custom,
        }
    }

    /// The hard-wired response shape for known vendors. `None` means the
    /// provider record's own `models_list_path`/`model_id_field` apply.
    pub fn hardwired_shape(&self) -> Option<ResponseShape> {
        match self {
            Self::OpenAi | Self::Anthropic => Some(ResponseShape {
                models_list_path: "data",
                model_id_field: "id",
            }),
            Self::Gemini => Some(ResponseShape {
                models_list_path: "models",
                model_id_field: "name",
            }),
            Self::Custom => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Gemini => write!(f, "Gemini"),
            Self::Anthropic => write!(f, "Anthropic"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// Maps provider keys to their model-discovery strategy.
///
/// Borrows the settings snapshot; resolution is a lookup plus shape
/// binding, no I/O.
pub struct ProviderRegistry<'a> {
    settings: &'a Settings,
}

impl<'a> ProviderRegistry<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Bind `key`'s record to a fetcher, or fail if no such provider is
    /// configured.
    pub fn resolve(&self, key: &str) -> Result<ModelFetcher, ConfigError> {
        let record = self
            .settings
            .providers
            .get(key)
            .ok_or_else(|| ConfigError::UnknownProvider(key.to_string()))?;
        Ok(ModelFetcher::bind(key, record.clone()))
    }
}
