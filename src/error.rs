//! Error taxonomy for the fetch layer.
//!
//! Only `NotFound` ever reaches the caller of a run. Rate limits are absorbed by
//! the backoff loop, and the remaining failures are converted into absent values
//! or empty comment lists at the call sites that own that policy.

use thiserror::Error;

/// Failures reported by a [`crate::ForumClient`] implementation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The named subreddit (or item) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote asked us to slow down.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A secondary resource is missing (suspended account, stripped field, ...).
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// The one failure signal the backoff loop recognises.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::RateLimited(_))
    }
}

/// Outcome of a retried call that did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// A non-throttle failure, passed through untouched.
    #[error("{0}")]
    Failed(E),

    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// Only reachable when the policy sets `max_attempts` or `max_total_delay`.
    #[error("retry budget exhausted after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors surfaced by the fetchers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Subreddit '{0}' does not exist.")]
    NotFound(String),

    #[error("client error: {0}")]
    Client(ClientError),

    #[error("retry aborted: {0}")]
    Retry(String),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl From<RetryError<ClientError>> for FetchError {
    fn from(e: RetryError<ClientError>) -> Self {
        match e {
            RetryError::Failed(inner) => FetchError::Client(inner),
            other => FetchError::Retry(other.to_string()),
        }
    }
}

/// Worker-pool infrastructure failures (never per-unit failures).
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    #[error("worker pool disconnected with {pending} result(s) outstanding")]
    Disconnected { pending: usize },
}
