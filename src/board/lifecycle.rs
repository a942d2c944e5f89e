//! Summaries, session creation and shutdown.

use crate::error::{Error, Result};
use crate::providers::CODE_JOB_NOT_FOUND;
use crate::stream::{SessionContext, StreamingSession, Transport};
use crate::types::JobKey;
use crate::validation;
use serde_json::Value;

use super::JobBoard;

impl JobBoard {
    /// Summary of one party's job: the stored row and its dataset view
    pub async fn job_summary(&self, key: &JobKey) -> Result<Value> {
        validation::job_key(key)?;

        let response = self.summaries.summary(key).await?;
        match response.code {
            0 => Ok(response.data),
            CODE_JOB_NOT_FOUND => Err(Error::NotFound(format!("job {}", key))),
            code => Err(Error::Provider {
                provider: "summary",
                code,
                message: response.msg,
            }),
        }
    }

    /// Collaborators handed to every streaming session
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            store: self.store.clone(),
            dependencies: self.dependencies.clone(),
            summaries: self.summaries.clone(),
            pool: self.pool.clone(),
            poll_interval: self.config.stream.poll_interval,
        }
    }

    /// Bind a streaming session for `key` to `transport`
    ///
    /// The caller drives the session with [`StreamingSession::run`].
    pub fn open_session<T: Transport>(&self, key: JobKey, transport: T) -> StreamingSession<T> {
        StreamingSession::new(key, transport, self.session_context())
    }

    /// Gracefully shut down the board
    ///
    /// Closes the worker pool so queued and future remote calls fail fast,
    /// then closes the database if the board opened it.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.pool.close();
        tracing::info!(in_flight = self.pool.in_flight(), "Worker pool closed");

        if let Some(database) = &self.database {
            database.close().await;
            tracing::info!("Database closed");
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
