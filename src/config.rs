//! Configuration types for job-board

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Main configuration for [`JobBoard`](crate::JobBoard)
///
/// Every field has a default, so an empty JSON/TOML document is a valid
/// configuration. Durations are expressed in integer milliseconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Flow service (remote job orchestration peer)
    #[serde(default)]
    pub flow: FlowConfig,

    /// Shared worker pool sizing
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Retry policy for remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Progress streaming behavior
    #[serde(default)]
    pub stream: StreamConfig,

    /// Paged job listing limits
    #[serde(default)]
    pub paging: PagingConfig,

    /// Data storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// API server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Check the configuration for values the runtime cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.flow.base_url.trim().is_empty() {
            return Err(Error::config("flow.base_url", "base URL must not be empty"));
        }
        if self.executor.pool_size == 0 {
            return Err(Error::config(
                "executor.pool_size",
                "worker pool needs at least one slot",
            ));
        }
        self.retry.validate()?;
        if self.stream.poll_interval.is_zero() {
            return Err(Error::config(
                "stream.poll_interval",
                "poll interval must be greater than zero",
            ));
        }
        if self.paging.max_page_size <= 0 {
            return Err(Error::config(
                "paging.max_page_size",
                "max page size must be greater than zero",
            ));
        }
        if self.paging.default_page_size <= 0 {
            return Err(Error::config(
                "paging.default_page_size",
                "default page size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Flow service connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Base URL including the API version prefix (default: "http://127.0.0.1:9380/v1")
    #[serde(default = "default_flow_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_millis_serde")]
    pub request_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_url: default_flow_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Worker pool configuration
///
/// The pool bounds how many remote calls are in flight at once across all
/// streaming sessions and page requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum concurrently running tasks (default: 16)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
        }
    }
}

/// One retry tier: up to `max_attempts` attempts spaced `delay` apart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryTier {
    /// Attempts allowed in this tier
    pub max_attempts: u32,

    /// Wait before each attempt of this tier (except the very first attempt)
    #[serde(with = "duration_millis_serde")]
    pub delay: Duration,
}

impl RetryTier {
    /// Create a tier
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Tiered retry configuration
///
/// Tiers are consumed in order and never revisited. With the default
/// `[(3, 500ms), (3, 1000ms)]` an operation is attempted at most 6 times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Ordered retry tiers
    #[serde(default = "default_retry_tiers")]
    pub tiers: Vec<RetryTier>,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            tiers: default_retry_tiers(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Build a policy from parallel attempt-count and delay arrays
    ///
    /// The arrays pair up index by index, so they must have the same length.
    pub fn from_parallel(attempts: &[u32], delays: &[Duration]) -> Result<Self> {
        if attempts.len() != delays.len() {
            return Err(Error::config(
                "retry.tiers",
                format!(
                    "attempt counts ({}) and delays ({}) must have the same length",
                    attempts.len(),
                    delays.len()
                ),
            ));
        }

        let config = Self {
            tiers: attempts
                .iter()
                .zip(delays)
                .map(|(&max_attempts, &delay)| RetryTier::new(max_attempts, delay))
                .collect(),
            jitter: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Total number of attempts the policy allows
    pub fn max_total_attempts(&self) -> u32 {
        self.tiers.iter().map(|t| t.max_attempts).sum::<u32>().max(1)
    }

    /// Check that the policy has at least one usable tier
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(Error::config("retry.tiers", "at least one tier is required"));
        }
        if let Some(index) = self.tiers.iter().position(|t| t.max_attempts == 0) {
            return Err(Error::config(
                "retry.tiers",
                format!("tier {} allows zero attempts", index),
            ));
        }
        Ok(())
    }
}

/// Progress streaming configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Wait between two polls of the same job (default: 500ms)
    #[serde(default = "default_poll_interval", with = "duration_millis_serde")]
    pub poll_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

/// Paged listing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size used when the request does not name one (default: 10)
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Largest accepted page size; larger requests are clamped (default: 100)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database path (default: "job-board.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// API server configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_flow_base_url() -> String {
    "http://127.0.0.1:9380/v1".to_string()
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}
fn default_pool_size() -> usize {
    16
}
fn default_retry_tiers() -> Vec<RetryTier> {
    vec![
        RetryTier::new(3, Duration::from_millis(500)),
        RetryTier::new(3, Duration::from_millis(1000)),
    ]
}
fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}
fn default_page_size() -> i64 {
    10
}
fn default_max_page_size() -> i64 {
    100
}
fn default_database_path() -> PathBuf {
    PathBuf::from("job-board.db")
}
fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_true() -> bool {
    true
}

mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
