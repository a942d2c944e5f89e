//! Tiered retry logic for remote calls
//!
//! A [`RetryConfig`] is an ordered list of tiers, each allowing a number of
//! attempts spaced by a fixed delay. When a tier runs out of attempts the next
//! tier takes over with its own counter and delay; once the last tier is
//! exhausted the final error is returned to the caller.
//!
//! # Example
//!
//! ```no_run
//! use job_board::retry::{IsRetryable, execute_with_retry};
//! use job_board::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let result = execute_with_retry(&config, || async {
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{RetryConfig, RetryTier};
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, 5xx answers, garbled
/// bodies) should return `true`. Permanent failures (rejected input, missing
/// jobs, explicit non-zero return codes) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            // The peer answered but the body was unreadable; likely a proxy or partial write
            Error::InvalidResponse { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            Error::Remote { .. } => false,
            Error::Provider { .. } => false,
            Error::Validation { .. } => false,
            Error::NotFound(_) => false,
            Error::Config { .. } => false,
            Error::Database(_) => false,
            Error::Transport(_) => false,
            Error::TaskCancelled | Error::TaskPanicked(_) | Error::PoolClosed => false,
            Error::Serialization(_) => false,
            Error::ApiServerError(_) => false,
            Error::Other(_) => false,
        }
    }
}

/// Execute an async operation, retrying transient failures tier by tier
///
/// The first attempt runs immediately. After a retryable failure the attempt
/// is counted against the current tier; if that tier still has attempts left
/// the next attempt waits the tier's delay, otherwise the next tier becomes
/// current and its delay applies. Non-retryable errors are returned at once.
///
/// Waiting is done with [`tokio::time::sleep`], so a pending retry never
/// occupies a worker slot.
pub async fn execute_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut tiers = config.tiers.iter();
    let mut tier: Option<&RetryTier> = tiers.next();
    let mut attempts_in_tier = 0u32;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() => {
                attempts_in_tier += 1;

                // Move on to the first tier that still has attempts left
                while let Some(current) = tier {
                    if attempts_in_tier < current.max_attempts {
                        break;
                    }
                    tier = tiers.next();
                    attempts_in_tier = 0;
                }

                let Some(current) = tier else {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry tiers exhausted"
                    );
                    return Err(e);
                };

                let delay = if config.jitter {
                    add_jitter(current.delay)
                } else {
                    current.delay
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_total_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Operation failed with non-retryable error");
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to spread out retries from concurrent callers
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
