//! LLM HTTP client
//!
//! A thin wrapper around reqwest shared by all provider adapters. Every
//! request carries an explicit timeout, and every transport failure (timeout,
//! connection refused, non-2xx status) is normalized into
//! `ProviderUnavailableError` so callers never see backend-specific failure
//! shapes. Requests are never retried here: a failed provider turn must
//! surface once, with its kind, to the orchestration layer.

use crate::error::{Result, SqlPilotError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// HTTP client for LLM API requests
#[derive(Clone)]
pub struct LlmHttpClient {
    client: Client,
}

impl LlmHttpClient {
    /// Create a client with the given request timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SqlPilotError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// POST a JSON body and return the response body as text.
    ///
    /// `provider` names the adapter for error attribution.
    pub async fn post_json<T: Serialize>(
        &self,
        provider: &str,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(provider, &e))?;

        let status = response.status();
        let text = response
            .bytes()
            .await
            .map_err(|e| transport_error(provider, &e))?;
        // Raw model output is not guaranteed clean UTF-8
        let text = String::from_utf8_lossy(&text).into_owned();

        if !status.is_success() {
            return Err(SqlPilotError::provider_unavailable(
                provider,
                format!("HTTP {}: {}", status.as_u16(), truncate(&text, 500)),
            ));
        }
        Ok(text)
    }

    /// GET a URL and return the response body as text (used by probes).
    pub async fn get_text(&self, provider: &str, url: &str, headers: HeaderMap) -> Result<String> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| transport_error(provider, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(provider, &e))?;

        if !status.is_success() {
            return Err(SqlPilotError::provider_unavailable(
                provider,
                format!("HTTP {}: {}", status.as_u16(), truncate(&text, 500)),
            ));
        }
        Ok(text)
    }

    /// Build standard JSON + bearer-token headers
    pub fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| SqlPilotError::Config("invalid API key format".to_string()))?,
        );
        Ok(headers)
    }

    /// Build plain JSON headers
    pub fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

fn transport_error(provider: &str, error: &reqwest::Error) -> SqlPilotError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    SqlPilotError::provider_unavailable(provider, message)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
