//! Bounded worker pool for remote and cross-component fetches
//!
//! Every task dispatched through [`WorkerPool`] runs on the tokio runtime but
//! must hold one of the pool's permits while it does work, so the number of
//! in-flight remote calls never exceeds the configured pool size no matter
//! how many streaming sessions or page requests are active.
//!
//! Dispatching returns a [`TaskHandle`] owned by the caller. Handles are
//! joined explicitly and can be aborted; dropping a handle aborts its task,
//! so work whose caller went away stops retrying against the flow service.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::retry::execute_with_retry;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Shared, cloneable worker pool (all clones share the same permits)
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool that runs at most `size` tasks at once
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Configured pool size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of tasks currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.size.saturating_sub(self.permits.available_permits())
    }

    /// Stop accepting work; queued and future tasks fail with [`Error::PoolClosed`]
    pub fn close(&self) {
        self.permits.close();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Dispatch a single-shot task
    pub fn spawn<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = self.permits.clone();
        TaskHandle::new(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(|_| Error::PoolClosed)?;
            task.await
        }))
    }

    /// Dispatch a task that is retried according to `policy`
    ///
    /// `operation` is called once per attempt. A permit is held only while an
    /// attempt runs; the backoff between attempts does not occupy the pool.
    pub fn spawn_with_retry<F, Fut, T>(&self, policy: RetryConfig, mut operation: F) -> TaskHandle<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = self.permits.clone();
        TaskHandle::new(tokio::spawn(async move {
            execute_with_retry(&policy, || {
                let permits = permits.clone();
                let attempt = operation();
                async move {
                    let _permit = permits.acquire_owned().await.map_err(|_| Error::PoolClosed)?;
                    attempt.await
                }
            })
            .await
        }))
    }
}

/// Owned handle to a dispatched task
///
/// The task is aborted when the handle is dropped before it finishes.
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<Result<T>>,
}

impl<T> TaskHandle<T> {
    fn new(inner: JoinHandle<Result<T>>) -> Self {
        Self { inner }
    }

    /// Wait for the task and return its result
    ///
    /// Aborted tasks yield [`Error::TaskCancelled`], panicked tasks
    /// [`Error::TaskPanicked`].
    pub async fn join(mut self) -> Result<T> {
        match (&mut self.inner).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::TaskCancelled),
            Err(e) => Err(Error::TaskPanicked(e.to_string())),
        }
    }

    /// Cancel the task; a later [`join`](Self::join) reports [`Error::TaskCancelled`]
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Whether the task has finished (successfully or not)
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        self.inner.abort();
    }
}
