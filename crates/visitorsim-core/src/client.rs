//! HTTP client for the simulation backend.
//!
//! Four endpoints are consumed, all relative to a fixed base URL:
//!
//! | Call           | Method | Path                     |
//! |----------------|--------|--------------------------|
//! | list scenarios | GET    | `/scenarios`             |
//! | get results    | GET    | `/getResults/{scenario}` |
//! | get settings   | GET    | `/settings`              |
//! | start run      | POST   | `/start` (form-encoded)  |
//!
//! [`SimulationApi`] is the seam the executor works against; [`HttpApi`] is
//! the reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::model::{ResultRow, RunAck, RunParams, ScenarioId, Settings};

/// Backend address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:22080/api";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Operations offered by the simulation backend.
pub trait SimulationApi: Send + Sync {
    fn list_scenarios(&self) -> impl Future<Output = Result<Vec<ScenarioId>, ApiError>> + Send;

    fn get_results(
        &self,
        scenario: ScenarioId,
    ) -> impl Future<Output = Result<Vec<ResultRow>, ApiError>> + Send;

    fn get_settings(&self) -> impl Future<Output = Result<Settings, ApiError>> + Send;

    /// Trigger a simulation run. The backend answers with plain text.
    fn start_run(&self, params: RunParams) -> impl Future<Output = Result<RunAck, ApiError>> + Send;
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// [`SimulationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        let body = read_body(path, response).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl SimulationApi for HttpApi {
    async fn list_scenarios(&self) -> Result<Vec<ScenarioId>, ApiError> {
        self.get_json("/scenarios").await
    }

    async fn get_results(&self, scenario: ScenarioId) -> Result<Vec<ResultRow>, ApiError> {
        self.get_json(&format!("/getResults/{scenario}")).await
    }

    async fn get_settings(&self) -> Result<Settings, ApiError> {
        self.get_json("/settings").await
    }

    async fn start_run(&self, params: RunParams) -> Result<RunAck, ApiError> {
        let path = "/start";
        let url = self.url(path);
        log::debug!(
            "POST {url} terminals={} visitors={} scenario={}",
            params.terminals,
            params.visitors,
            params.scenario
        );
        let response = self
            .http
            .post(&url)
            .form(&params.form_fields())
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        let message = read_body(path, response).await?;
        log::info!("run acknowledged: {message}");
        Ok(RunAck { message })
    }
}

fn transport(path: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        path: path.to_string(),
        source,
    }
}

/// Read the full body, turning non-2xx statuses into [`ApiError::Status`].
async fn read_body(path: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| transport(path, source))?;
    if !status.is_success() {
        return Err(ApiError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Strip trailing slashes and require an http(s) scheme with a host.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed.to_string()),
        _ => Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected http://host[:port][/path]".to_string(),
        }),
    }
}
