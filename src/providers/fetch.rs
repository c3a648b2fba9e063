// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The shared model-discovery execution path.
//!
//! One GET with a bounded timeout, one parse, one extraction. No retries:
//! the calling workflow is interactive setup, where the human gets an
//! immediate manual fallback, so a second automatic attempt buys nothing.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use super::ProviderKind;
use crate::config::ProviderRecord;
use crate::error::FetchError;
use crate::extract::extract_model_ids;

/// Bound on each model-discovery request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider record bound to the shared fetch path.
///
/// Constructed through [`super::ProviderRegistry::resolve`]. Each
/// [`fetch_models`](Self::fetch_models) call builds its own short-lived
/// HTTP client; no connection state is shared across calls.
#[derive(Debug, Clone)]
pub struct ModelFetcher {
    key: String,
    record: ProviderRecord,
}

impl ModelFetcher {
    /// Bind a record to its strategy. For known vendors the response
    /// shape is hard-wired, overriding whatever the record carries; the
    /// generic strategy keeps the record's shape fields as-is.
    pub fn bind(key: impl Into<String>, mut record: ProviderRecord) -> Self {
        let key = key.into();
        if let Some(shape) = ProviderKind::from_key(&key).hardwired_shape() {
            record.models_list_path = shape.models_list_path.to_string();
            record.model_id_field = shape.model_id_field.to_string();
        }
        Self { key, record }
    }

    /// The provider key this fetcher is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The bound record, shape overrides applied.
    pub fn record(&self) -> &ProviderRecord {
        &self.record
    }

    /// The full URL the listing request goes to.
    pub fn models_url(&self) -> String {
        format!(
            "{}{}",
            self.record.base_url.trim_end_matches('/'),
            self.record.models_endpoint
        )
    }

    /// Fetch the provider's available model ids, sorted and deduplicated.
    ///
    /// Single attempt. Failures are categorical: non-2xx status, network
    /// trouble, a non-JSON body, or a JSON body whose shape does not
    /// match the configured paths. Callers treat any error as "no models
    /// found, manual entry required", never as a reason to abort.
    pub async fn fetch_models(&self) -> Result<Vec<String>, FetchError> {
        let url = self.models_url();
        debug!(provider = %self.key, %url, "fetching model list");

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FetchError::from_transport(&url, &e))?;

        let mut request = client.get(&url);
        if let Some(api_key) = self.record.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.header(
                AUTHORIZATION,
                format!("{} {}", self.record.auth_header_prefix, api_key),
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_transport(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = %self.key, status = status.as_u16(), "model listing rejected");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let document: serde_json::Value = response.json().await.map_err(|e| FetchError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let models = extract_model_ids(
            &document,
            &self.record.models_list_path,
            &self.record.model_id_field,
        )
        .ok_or_else(|| FetchError::UnexpectedShape {
            path: self.record.models_list_path.clone(),
        })?;

        debug!(provider = %self.key, count = models.len(), "model list fetched");
        Ok(models)
    }

    /// The degraded form of [`fetch_models`](Self::fetch_models): always
    /// yields a list, with the failure (if any) surfaced alongside it.
    pub async fn fetch_models_or_empty(&self) -> (Vec<String>, Option<FetchError>) {
        match self.fetch_models().await {
            Ok(models) => (models, None),
            Err(err) => {
                warn!(provider = %self.key, kind = err.kind(), "model discovery failed: {err}");
                (Vec::new(), Some(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(base_url: &str) -> ProviderRecord {
        ProviderRecord {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_models_url_strips_trailing_slash() {
        let fetcher = ModelFetcher::bind("custom", record("https://api.example.com/v1/"));
        assert_eq!(fetcher.models_url(), "https://api.example.com/v1/models");
    }

    #[test]
    fn test_models_url_plain_join() {
        let fetcher = ModelFetcher::bind("custom", record("https://api.example.com/v1"));
        assert_eq!(fetcher.models_url(), "https://api.example.com/v1/models");
    }

    #[test]
    fn test_bind_hardwires_vendor_shape() {
        let mut rec = record("https://generativelanguage.googleapis.com/v1beta");
        // Even a wrong user-supplied shape is overridden for known vendors.
        rec.models_list_path = "whatever".to_string();
        let fetcher = ModelFetcher::bind("gemini", rec);
        assert_eq!(fetcher.record().models_list_path, "models");
        assert_eq!(fetcher.record().model_id_field, "name");
    }

    #[test]
    fn test_bind_keeps_custom_shape() {
        let mut rec = record("https://gateway.internal");
        rec.models_list_path = "result.models".to_string();
        rec.model_id_field = "slug".to_string();
        let fetcher = ModelFetcher::bind("my-gateway", rec);
        assert_eq!(fetcher.record().models_list_path, "result.models");
        assert_eq!(fetcher.record().model_id_field, "slug");
    }

    #[test]
    fn test_custom_endpoint_respected() {
        let mut rec = record("https://gateway.internal");
        rec.models_endpoint = "/api/v2/model-list".to_string();
        let fetcher = ModelFetcher::bind("my-gateway", rec);
        assert_eq!(
            fetcher.models_url(),
            "https://gateway.internal/api/v2/model-list"
        );
    }
}
