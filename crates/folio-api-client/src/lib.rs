//! HTTP client for the Folio backend.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key),
//! generic GET and multipart POST helpers, and the two calls the upload
//! pipeline depends on: submitting a processed photo and reading usage. The
//! CLI plugs this client into a batch session through the `PhotoSubmitter` and
//! `QuotaSource` traits.

pub mod api;

use anyhow::{Context, Result};
use folio_core::SubmitError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_API_VERSION: &str = "v0";

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// Conventional error body: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Message for a failed response: the server's own message when the body is
/// a well-formed envelope with a non-empty message, the generic one otherwise.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| SubmitError::generic_message(status))
}

/// HTTP client for the Folio API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_version: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth,
        })
    }

    /// Create client from environment: FOLIO_API_URL (or API_URL), FOLIO_API_KEY
    /// (or API_KEY) and FOLIO_API_VERSION. Uses X-API-Key auth.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("FOLIO_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let api_key = std::env::var("FOLIO_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .context("Missing API key. Set FOLIO_API_KEY or API_KEY")?;

        let client = Self::new(base_url, Auth::XApiKey(api_key))?;
        Ok(match std::env::var("FOLIO_API_VERSION") {
            Ok(version) if !version.trim().is_empty() => client.with_api_version(version.trim()),
            _ => client,
        })
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// API version prefix, e.g. "/api/v0".
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SubmitError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.get(&url));
        self.send(request).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, SubmitError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).multipart(form));
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SubmitError> {
        let response = request
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            tracing::debug!(
                status = status.as_u16(),
                message = %message,
                "API request rejected"
            );
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| SubmitError::InvalidResponse(e.to_string()))
    }
}
