//! Live job progress streaming
//!
//! A [`StreamingSession`] owns one observer connection. It polls the job row,
//! fetches the dependency graph and the summary in parallel on the shared
//! [`WorkerPool`], merges them into a [`JobSnapshot`] and pushes it, until
//! the job reaches a terminal status, disappears, or something fails.
//!
//! ```text
//! Polling ──fetch+merge──▶ Pushing ──poll interval──▶ Polling
//!    │                        │
//!    ├─ job gone ──▶ TerminatedMissing
//!    ├─ peer gone ─▶ TerminatedClosed
//!    │                        └─ terminal status ──▶ TerminatedFinished
//!    └─ any error (either state) ──▶ TerminatedError
//! ```

mod snapshot;
mod ws;

pub use snapshot::JobSnapshot;
pub use ws::WsTransport;

use crate::db::JobStore;
use crate::error::{Error, Result};
use crate::executor::WorkerPool;
use crate::providers::{DependencyProvider, SummaryProvider};
use crate::types::{JobKey, ProviderResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Notice sent when the job row cannot be found
pub const JOB_MISSING_NOTICE: &str = "this job doesn't exist";

/// Notice sent before closing a session that failed
pub const SESSION_ERROR_NOTICE: &str = "this job socket has error";

/// Outbound text channel to one observer
///
/// The session never reads from the channel; a closed channel is the only
/// cancellation signal it observes.
#[async_trait]
pub trait Transport: Send {
    /// Whether the channel can still carry messages
    fn is_open(&self) -> bool;

    /// Send one text frame
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the channel
    async fn close(&mut self) -> Result<()>;
}

/// Lifecycle state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Fetching the job row and its views
    Polling,
    /// A snapshot is being sent
    Pushing,
    /// The job reached a terminal status; last snapshot sent, transport closed
    TerminatedFinished,
    /// The job row disappeared; notice sent, transport closed
    TerminatedMissing,
    /// An error ended the session; error notice attempted
    TerminatedError,
    /// The observer closed the transport
    TerminatedClosed,
}

impl SessionState {
    /// Whether the session loop has exited
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Polling | SessionState::Pushing)
    }
}

/// Shared collaborators a session needs; cheap to clone
#[derive(Clone)]
pub struct SessionContext {
    /// Job rows
    pub store: Arc<dyn JobStore>,
    /// Dependency graph source
    pub dependencies: Arc<dyn DependencyProvider>,
    /// Summary source
    pub summaries: Arc<dyn SummaryProvider>,
    /// Pool the two per-iteration fetches run on
    pub pool: WorkerPool,
    /// Wait between iterations
    pub poll_interval: Duration,
}

/// Push loop for one observer
pub struct StreamingSession<T: Transport> {
    key: JobKey,
    first_push_done: bool,
    state: SessionState,
    transport: T,
    ctx: SessionContext,
}

impl<T: Transport> StreamingSession<T> {
    /// Create a session in the `Polling` state
    pub fn new(key: JobKey, transport: T, ctx: SessionContext) -> Self {
        Self {
            key,
            first_push_done: false,
            state: SessionState::Polling,
            transport,
            ctx,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until the session terminates and return the final state
    ///
    /// Never fails: errors end the session in
    /// [`SessionState::TerminatedError`] after a best-effort notice and close.
    pub async fn run(mut self) -> SessionState {
        tracing::info!(
            job_id = %self.key.job_id,
            role = %self.key.role,
            party_id = %self.key.party_id,
            "Streaming session started"
        );

        if let Err(e) = self.poll_loop().await {
            self.state = SessionState::TerminatedError;
            tracing::error!(job_id = %self.key.job_id, error = %e, "Streaming session failed");

            if let Err(e) = self
                .transport
                .send_text(SESSION_ERROR_NOTICE.to_string())
                .await
            {
                tracing::warn!(job_id = %self.key.job_id, error = %e, "Failed to send error notice");
            }
            if let Err(e) = self.transport.close().await {
                tracing::warn!(job_id = %self.key.job_id, error = %e, "Failed to close transport");
            }
        }

        tracing::info!(job_id = %self.key.job_id, state = ?self.state, "Streaming session ended");
        self.state
    }

    async fn poll_loop(&mut self) -> Result<()> {
        loop {
            if !self.transport.is_open() {
                self.state = SessionState::TerminatedClosed;
                return Ok(());
            }
            self.state = SessionState::Polling;

            let Some(job) = self.ctx.store.find_job(&self.key).await? else {
                tracing::info!(job_id = %self.key.job_id, "Job no longer exists");
                self.transport
                    .send_text(JOB_MISSING_NOTICE.to_string())
                    .await?;
                self.close_after_final_message().await;
                self.state = SessionState::TerminatedMissing;
                return Ok(());
            };

            let status = job.status().display();
            let now_ms = chrono::Utc::now().timestamp_millis();
            let (dependency_data, summary_data) = fetch_views(&self.ctx, &self.key).await?;

            let mut snapshot = JobSnapshot {
                job_process: job.progress,
                job_duration: job.duration_ms(now_ms),
                job_status: status.clone(),
                dependency_data,
                summary_data,
            };
            if self.first_push_done {
                snapshot = snapshot.strip_redundant();
            }

            self.state = SessionState::Pushing;
            self.transport
                .send_text(serde_json::to_string(&snapshot)?)
                .await?;
            self.first_push_done = true;

            tracing::debug!(
                job_id = %self.key.job_id,
                status = %status,
                progress = job.progress,
                "Pushed job snapshot"
            );

            if status.is_terminal() {
                self.close_after_final_message().await;
                self.state = SessionState::TerminatedFinished;
                return Ok(());
            }

            tokio::time::sleep(self.ctx.poll_interval).await;
        }
    }

    async fn close_after_final_message(&mut self) {
        if let Err(e) = self.transport.close().await {
            tracing::warn!(job_id = %self.key.job_id, error = %e, "Failed to close transport");
        }
    }
}

/// Fetch the dependency graph and the summary concurrently; both must succeed
async fn fetch_views(ctx: &SessionContext, key: &JobKey) -> Result<(Value, Value)> {
    let dependencies = ctx.dependencies.clone();
    let dependency_key = key.clone();
    let dependency_task = ctx
        .pool
        .spawn(async move { dependencies.dependencies(&dependency_key).await });

    let summaries = ctx.summaries.clone();
    let summary_key = key.clone();
    let summary_task = ctx
        .pool
        .spawn(async move { summaries.summary(&summary_key).await });

    let (dependency, summary) = tokio::join!(dependency_task.join(), summary_task.join());

    Ok((
        accept("dependency", dependency?)?,
        accept("summary", summary?)?,
    ))
}

/// Unwrap a provider response, treating a non-zero code or a null payload as fatal
fn accept(provider: &'static str, response: ProviderResponse) -> Result<Value> {
    if response.code != 0 {
        return Err(Error::Provider {
            provider,
            code: response.code,
            message: response.msg,
        });
    }
    if response.data.is_null() {
        return Err(Error::Provider {
            provider,
            code: response.code,
            message: "empty payload".to_string(),
        });
    }
    Ok(response.data)
}
