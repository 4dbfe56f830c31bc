//! Rate-limit aware retry: exponential backoff on throttling, immediate
//! propagation of everything else.

use crate::error::{ClientError, RetryError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Blocking pause used by the backoff loop and the pacing pauses.
/// Swappable so tests can observe delays without waiting for them.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, dur: Duration);
}

/// Real `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

/// Shared flag that aborts a retry loop at its next attempt boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Backoff schedule: `initial`, then doubling after every throttled attempt.
/// Unbounded unless `max_attempts` or `max_total_delay` is set.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub initial: Duration,
    pub max_attempts: Option<u32>,
    /// Upper bound on the sum of all backoff sleeps.
    pub max_total_delay: Option<Duration>,
    pub cancel: CancelToken,
}

impl RetryPolicy {
    pub fn unbounded(initial: Duration) -> Self {
        Self { initial, max_attempts: None, max_total_delay: None, cancel: CancelToken::default() }
    }
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n.max(1));
        self
    }
    pub fn with_max_total_delay(mut self, d: Duration) -> Self {
        self.max_total_delay = Some(d);
        self
    }
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }
}

/// Run `op` until it succeeds or fails with something other than a rate limit.
///
/// On [`ClientError::RateLimited`] the calling thread sleeps for the current
/// delay and the delay doubles. Any other error is returned as
/// [`RetryError::Failed`] without a retry. The success value is passed through as is.
pub fn call_with_backoff<T, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, RetryError<ClientError>>
where
    F: FnMut() -> Result<T, ClientError>,
{
    let mut delay = policy.initial;
    let mut slept = Duration::ZERO;
    let mut attempts: u32 = 0;
    loop {
        if policy.cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts });
        }
        attempts = attempts.saturating_add(1);
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_rate_limited() => {
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    tracing::warn!("rate limited {} time(s); giving up", attempts);
                    return Err(RetryError::Exhausted { attempts });
                }
                if policy.max_total_delay.is_some_and(|max| slept + delay > max) {
                    tracing::warn!("rate limited; next backoff of {:?} exceeds budget", delay);
                    return Err(RetryError::Exhausted { attempts });
                }
                tracing::debug!("rate limited (attempt {}): {}; sleeping {:?}", attempts, e, delay);
                sleeper.sleep(delay);
                slept += delay;
                delay = delay.saturating_mul(2);
            }
            Err(e) => return Err(RetryError::Failed(e)),
        }
    }
}
