//! HTTP client for CLI -> `ticketledger-api` communication.
//!
//! The CLI never talks to Postgres or the use cases directly - every
//! command goes through the same HTTP surface a human operator's browser
//! would hit, so the server remains the single source of truth.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Completed,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusRequest {
    pub status: AdminStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub postgres: bool,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), client: reqwest::Client::new() }
    }

    /// `POST /v1/admin/transactions/{reference}/status`.
    pub async fn update_transaction_status(
        &self,
        reference: &str,
        status: AdminStatus,
        reason: Option<String>,
    ) -> Result<SuccessResponse> {
        let resp = self
            .client
            .post(format!("{}/v1/admin/transactions/{}/status", self.base_url, reference))
            .json(&UpdateStatusRequest { status, reason })
            .send()
            .await
            .context("failed to connect to the ticketledger API")?;

        if !resp.status().is_success() {
            let err: ErrorResponse = resp.json().await.context("failed to parse error response")?;
            anyhow::bail!("{} ({})", err.message, err.code);
        }

        resp.json().await.context("failed to parse status response")
    }

    /// `GET /healthz`.
    pub async fn healthz(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await
            .context("failed to connect to the ticketledger API")?;

        resp.json().await.context("failed to parse health response")
    }
}
