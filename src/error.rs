// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the MikuCast core.
//!
//! Three concerns, three taxonomies:
//!
//! - [`ConfigError`] - file I/O and parse failures while resolving
//!   configuration. Fatal to the invoking command.
//! - [`ValidationError`] - semantic schema violations. Recoverable; the
//!   caller is expected to route the user to `mikucast setup`.
//! - [`FetchError`] - model-discovery failures at the provider boundary.
//!   Non-fatal; callers degrade to an empty model list plus the reason.

use thiserror::Error;

/// Errors that can occur while loading or persisting configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("merged configuration does not match the settings schema: {0}")]
    Schema(String),

    #[error("no provider named `{0}` is configured")]
    UnknownProvider(String),

    #[error("could not locate a home directory for the config path")]
    NoHomeDir,
}

impl ConfigError {
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl Into<String>, err: &toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.message().to_string(),
        }
    }
}

/// A failed semantic validation of the merged settings.
///
/// Carries one human-readable message per violated rule. Never contains
/// secret values.
#[derive(Error, Debug)]
#[error("configuration failed validation ({} rule(s) violated)", violations.len())]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }
}

/// Errors from a single model-discovery attempt.
///
/// Every variant degrades to "no models found" at the call site; none of
/// them should abort the process.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error reaching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },

    #[error("no model list found at response path `{path}`")]
    UnexpectedShape { path: String },
}

impl FetchError {
    /// Map a reqwest transport error into the fetch taxonomy.
    pub fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            // Connect failures, DNS errors, and timeouts all land here.
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// The machine-readable category, for logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::Decode { .. } => "decode",
            Self::UnexpectedShape { .. } => "unexpected_shape",
        }
    }
}

/// Result type alias using anyhow for flexible error propagation at the
/// orchestration and CLI boundary.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Parse {
            path: "/tmp/settings.toml".to_string(),
            message: "expected `=`".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("settings.toml"));
        assert!(display.contains("expected `=`"));
    }

    #[test]
    fn test_validation_error_counts_violations() {
        let err = ValidationError::new(vec![
            "model.provider is not set".to_string(),
            "model.name is not set".to_string(),
        ]);
        assert_eq!(err.violations.len(), 2);
        assert!(format!("{}", err).contains("2 rule(s)"));
    }

    #[test]
    fn test_fetch_error_kinds() {
        let err = FetchError::HttpStatus {
            status: 401,
            url: "https://api.example.com/v1/models".to_string(),
        };
        assert_eq!(err.kind(), "http_status");
        assert!(format!("{}", err).contains("401"));

        let err = FetchError::UnexpectedShape {
            path: "data".to_string(),
        };
        assert_eq!(err.kind(), "unexpected_shape");
    }
}
