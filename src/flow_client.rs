//! HTTP client for the flow service
//!
//! The flow service answers every endpoint with a JSON envelope
//! `{retcode, retmsg, data}`. A non-zero `retcode` is turned into
//! [`Error::Remote`] (permanent); an unreadable body into
//! [`Error::InvalidResponse`] (retryable); transport failures and HTTP error
//! statuses into [`Error::Network`].

use crate::config::FlowConfig;
use crate::error::{Error, Result};
use crate::types::{JobKey, ReRunRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DATAVIEW_PATH: &str = "/job/dataview";
const RERUN_PATH: &str = "/job/rerun";
const DAG_DEPENDENCY_PATH: &str = "/pipeline/dag/dependency";

#[derive(Debug, Deserialize)]
struct Envelope {
    retcode: i64,
    #[serde(default)]
    retmsg: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Client for the flow service's job endpoints
#[derive(Clone, Debug)]
pub struct FlowClient {
    http: reqwest::Client,
    base_url: String,
}

impl FlowClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns a configuration error if the base URL is not an absolute
    /// http(s) URL, or if the HTTP client cannot be built.
    pub fn new(config: &FlowConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| Error::config("flow.base_url", format!("invalid base URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "flow.base_url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("job-board")
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dataset view of one party's job (the envelope's `data` field)
    pub async fn job_dataview(&self, key: &JobKey) -> Result<Value> {
        let envelope = self.post(DATAVIEW_PATH, key).await?;
        Ok(envelope.data)
    }

    /// Ask the flow service to rerun a job
    pub async fn rerun(&self, request: &ReRunRequest) -> Result<()> {
        self.post(RERUN_PATH, request).await?;
        Ok(())
    }

    /// Component dependency graph of one party's job (the envelope's `data` field)
    pub async fn dag_dependencies(&self, key: &JobKey) -> Result<Value> {
        let envelope = self.post(DAG_DEPENDENCY_PATH, key).await?;
        Ok(envelope.data)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling flow service");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&text).map_err(|e| Error::InvalidResponse {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        if envelope.retcode != 0 {
            return Err(Error::Remote {
                endpoint: path.to_string(),
                retcode: envelope.retcode,
                message: envelope.retmsg.unwrap_or_default(),
            });
        }

        Ok(envelope)
    }
}
