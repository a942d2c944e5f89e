//! # job-board
//!
//! Backend library for monitoring jobs run by a federated-learning flow
//! service.
//!
//! ## What it does
//!
//! - **Paged job listing** - each row is enriched with its dataset view,
//!   fetched concurrently on a bounded worker pool with tiered retries
//! - **Live progress** - a streaming session pushes job snapshots to a
//!   WebSocket client until the job finishes
//! - **REST surface** - an axum router with OpenAPI docs for all of the above,
//!   plus reruns and component output commands
//!
//! ## Quick Start
//!
//! ```no_run
//! use job_board::{Config, JobBoard, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.flow.base_url = "http://flow.internal:9380/v1".to_string();
//!
//!     let board = JobBoard::new(config).await?;
//!     let _server = board.spawn_api_server();
//!
//!     run_with_shutdown(board).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Job board facade (decomposed into focused submodules)
pub mod board;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Bounded worker pool with owned task handles
pub mod executor;
/// HTTP client for the flow service
pub mod flow_client;
/// Dependency and summary read models
pub mod providers;
/// Tiered retry logic
pub mod retry;
/// Streaming sessions pushing job progress to observers
pub mod stream;
/// Core types
pub mod types;
/// Allow-list validation of request parameters
pub mod validation;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use board::JobBoard;
pub use config::{Config, RetryConfig, RetryTier};
pub use db::{Database, Job, JobStore, NewJob};
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, Result, ToHttpStatus};
pub use executor::{TaskHandle, WorkerPool};
pub use stream::{JobSnapshot, SessionState, StreamingSession, Transport};
pub use types::{
    EnrichedJob, EnrichmentResult, JobKey, JobStatus, Page, PagedJobQuery, ReRunRequest,
    RerunOutcome,
};

/// Run the board until a termination signal arrives, then shut it down.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to whichever
///   handler could be registered.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use job_board::{JobBoard, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let board = JobBoard::new(Config::default()).await?;
///     run_with_shutdown(board).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(board: JobBoard) -> Result<()> {
    wait_for_signal().await;
    board.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
