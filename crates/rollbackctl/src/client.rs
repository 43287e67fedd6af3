//! Thin HTTP client over the rollback webhook daemon API.

use anyhow::{Context, Result};
use rollback_common::{
    HealthResponse, ReadyResponse, RollbackRequest, RollbackResponse, StatusResponse,
};

pub struct WebhookClient {
    base_url: String,
    http: reqwest::Client,
}

impl WebhookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        self.get("/status").await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    pub async fn ready(&self) -> Result<ReadyResponse> {
        self.get("/ready").await
    }

    /// POST a rollback. The daemon answers 200 for FAILED records too;
    /// non-2xx here means the request never reached the executor.
    pub async fn trigger(&self, request: &RollbackRequest) -> Result<RollbackResponse> {
        let url = format!("{}/rollback", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("daemon rejected rollback ({status}): {body}");
        }

        response
            .json()
            .await
            .context("decoding rollback response")
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        response.json().await.context("decoding response body")
    }
}
