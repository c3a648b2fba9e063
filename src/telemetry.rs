// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracing initialization.
//!
//! The subscriber is configured from the resolved `[log]` settings: the
//! minimum level comes from `log.level` (the `RUST_LOG` environment
//! variable still takes precedence when set), and an optional
//! `log.logfile` redirects output from stderr to an append-mode file.
//! Secret values are never recorded in spans or events.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::LogSettings;

/// Guard that flushes telemetry on drop.
///
/// Keep this alive for the duration of the program.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Reserved for buffered writers.
    }
}

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init_telemetry(log: &LogSettings) -> io::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.to_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match &log.logfile {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Arc::new(file))
                .compact();
            registry.with(layer).try_init()
        }
        None => {
            let layer = fmt::layer()
                .with_target(true)
                .with_writer(io::stderr)
                .compact();
            registry.with(layer).try_init()
        }
    };

    result.map_err(|e| io::Error::other(e.to_string()))?;
    Ok(TelemetryGuard { _private: () })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_logfile_created_on_init() {
        let temp = tempfile::TempDir::new().unwrap();
        let logfile: PathBuf = temp.path().join("mikucast.log");

        let log = LogSettings {
            level: "debug".to_string(),
            logfile: Some(logfile.clone()),
        };

        // A second test in the same process may have installed the global
        // subscriber already; only the file side effect is asserted.
        let _ = init_telemetry(&log);
        assert!(logfile.exists());
    }

    #[test]
    fn test_level_string_accepted() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO"] {
            let log = LogSettings {
                level: level.to_string(),
                logfile: None,
            };
            // Init may fail with "already set" but must not panic.
            let _ = init_telemetry(&log);
        }
    }
}
