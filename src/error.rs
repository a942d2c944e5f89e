//! Error types for job-board
//!
//! This module provides the crate-wide error type together with:
//! - Retry classification for remote calls (see [`crate::retry::IsRetryable`])
//! - HTTP status code mapping for the API surface
//! - Structured JSON error bodies with machine-readable codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for job-board operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for job-board
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retry.tiers")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// A request parameter did not pass its allow-list
    #[error("invalid value for {field}: {value:?}")]
    Validation {
        /// Name of the rejected parameter
        field: String,
        /// The rejected value
        value: String,
    },

    /// Job or other entity not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Network error talking to the flow service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The flow service answered with a body that could not be understood
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint path that produced the response
        endpoint: String,
        /// Why the body was rejected
        reason: String,
    },

    /// The flow service answered with a non-zero return code
    #[error("{endpoint} returned retcode {retcode}: {message}")]
    Remote {
        /// Endpoint path that produced the response
        endpoint: String,
        /// Return code reported by the service
        retcode: i64,
        /// Message reported by the service
        message: String,
    },

    /// A read-model provider reported a failure
    #[error("{provider} provider returned code {code}: {message}")]
    Provider {
        /// Which provider failed ("dependency" or "summary")
        provider: &'static str,
        /// Response code reported by the provider
        code: i32,
        /// Message reported by the provider
        message: String,
    },

    /// Observer transport failed or was closed
    #[error("transport error: {0}")]
    Transport(String),

    /// A dispatched task was aborted before it finished
    #[error("task cancelled")]
    TaskCancelled,

    /// A dispatched task panicked
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// The worker pool no longer accepts work
    #[error("worker pool is closed")]
    PoolClosed,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a validation error for a rejected parameter
    pub fn validation(field: impl Into<String>, value: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a configuration error tied to a config key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Constraint violation (e.g., duplicate job key)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// API error response format
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "invalid value for job_id: \"a;b\"",
///     "details": { "field": "job_id" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::NotFound(_) => 404,

            Error::Config { .. } => 500,
            Error::Database(_) => 500,
            Error::Serialization(_) | Error::Io(_) => 500,
            Error::TaskPanicked(_) => 500,
            Error::ApiServerError(_) | Error::Other(_) => 500,
            Error::Transport(_) => 500,

            // Upstream failures
            Error::Network(_) => 502,
            Error::InvalidResponse { .. } => 502,
            Error::Remote { .. } => 502,
            Error::Provider { .. } => 502,

            Error::TaskCancelled | Error::PoolClosed => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::Validation { .. } => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::Network(_) => "network_error",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Remote { .. } => "remote_error",
            Error::Provider { .. } => "provider_error",
            Error::Transport(_) => "transport_error",
            Error::TaskCancelled => "task_cancelled",
            Error::TaskPanicked(_) => "task_panicked",
            Error::PoolClosed => "pool_closed",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            Error::Remote {
                endpoint, retcode, ..
            } => Some(serde_json::json!({
                "endpoint": endpoint,
                "retcode": retcode,
            })),
            Error::Provider { provider, code, .. } => Some(serde_json::json!({
                "provider": provider,
                "code": code,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::config("retry.tiers", "empty"),
                500,
                "config_error",
            ),
            (
                Error::Database(DatabaseError::QueryFailed("locked".into())),
                500,
                "database_error",
            ),
            (Error::validation("job_id", "a;b"), 400, "validation_error"),
            (Error::NotFound("job 1".into()), 404, "not_found"),
            (
                Error::InvalidResponse {
                    endpoint: "/job/dataview".into(),
                    reason: "expected value".into(),
                },
                502,
                "invalid_response",
            ),
            (
                Error::Remote {
                    endpoint: "/job/rerun".into(),
                    retcode: 100,
                    message: "no such job".into(),
                },
                502,
                "remote_error",
            ),
            (
                Error::Provider {
                    provider: "summary",
                    code: 1,
                    message: "job not found".into(),
                },
                502,
                "provider_error",
            ),
            (Error::Transport("closed".into()), 500, "transport_error"),
            (Error::TaskCancelled, 503, "task_cancelled"),
            (Error::TaskPanicked("boom".into()), 500, "task_panicked"),
            (Error::PoolClosed, 503, "pool_closed"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn test_status_and_error_codes() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {error}");
            assert_eq!(error.error_code(), code, "code for {error}");
        }
    }

    #[test]
    fn test_validation_error_details() {
        let api_error: ApiError = Error::validation("partner", "x%y").into();

        assert_eq!(api_error.error.code, "validation_error");
        assert!(api_error.error.message.contains("partner"));
        assert_eq!(api_error.error.details.unwrap()["field"], "partner");
    }

    #[test]
    fn test_remote_error_details() {
        let api_error: ApiError = Error::Remote {
            endpoint: "/job/rerun".into(),
            retcode: 101,
            message: "busy".into(),
        }
        .into();

        let details = api_error.error.details.unwrap();
        assert_eq!(details["endpoint"], "/job/rerun");
        assert_eq!(details["retcode"], 101);
    }

    #[test]
    fn test_plain_errors_have_no_details() {
        let api_error: ApiError = Error::TaskCancelled.into();
        assert!(api_error.error.details.is_none());

        let json = serde_json::to_value(&api_error).unwrap();
        assert!(json["error"].get("details").is_none());
    }
}
