// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MikuCast — a command-line AI assistant.
//!
//! This crate is organized around two cores:
//!
//! - [`config`]: layered settings resolution. Built-in defaults, a user
//!   settings file, a secrets file, and `MIKUCAST_*` environment variables
//!   are deep-merged into one immutable [`Settings`] snapshot.
//! - [`providers`]: model discovery against any OpenAI-style HTTP API.
//!   Vendor differences are reduced to configuration (endpoint, response
//!   path, id field), so every provider shares one fetch path.
//!
//! The binary in `main.rs` is a thin clap layer over these modules.

pub mod config;
pub mod error;
pub mod extract;
pub mod providers;
pub mod setup;
pub mod telemetry;

pub use config::{
    ensure_config_files, persist, resolve, resolve_from, ConfigPaths, LogSettings,
    ModelSelection, ProviderRecord, Settings,
};
pub use error::{ConfigError, FetchError, Result, ValidationError};
pub use providers::{ModelFetcher, ProviderKind, ProviderRegistry, FETCH_TIMEOUT};
pub use setup::{run_setup, SetupOutcome, SetupRequest};

/// Crate version, from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
