use std::future::Future;
use std::time::Duration;

use log::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
const DEFAULT_JITTER_MS: u64 = 1000;

/// Statuses that indicate the server is temporarily unable to respond.
pub const TRANSIENT_STATUSES: [u16; 3] = [500, 503, 504];

pub fn is_transient_status(status: u16) -> bool {
    TRANSIENT_STATUSES.contains(&status)
}

/// Backoff and attempt budget for one logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound (exclusive) of the uniform random delay added per attempt.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter: Duration::from_millis(DEFAULT_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed 1-based `attempt`:
    /// `min(base * 2^(attempt-1) + U[0, jitter), max_delay)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let exponential = self.base_delay.saturating_mul(factor);
        let jitter = self.jitter.mul_f64(rand::random::<f64>());
        (exponential + jitter).min(self.max_delay)
    }
}

/// Result of driving an operation through a [`RetryPolicy`].
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// The predicate accepted an attempt's result, which may itself be a
    /// failure that is not worth retrying.
    Completed(Result<T, E>),
    /// Every attempt was judged retryable; carries the last observed failure.
    Exhausted { attempts: u32, last: Result<T, E> },
}

/// Runs `operation` until `should_retry` rejects its result or the attempt
/// budget is spent. Attempts are strictly sequential: each one is awaited,
/// then the backoff delay elapses before the next begins.
pub async fn run<T, E, F, Fut, P>(policy: &RetryPolicy, operation: F, should_retry: P) -> Outcome<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&Result<T, E>) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let result = operation().await;

        if !should_retry(&result) {
            return Outcome::Completed(result);
        }
        if attempt >= max_attempts {
            return Outcome::Exhausted {
                attempts: attempt,
                last: result,
            };
        }

        let delay = policy.backoff_delay(attempt);
        warn!(
            "attempt {} of {} failed, retrying in {:?}",
            attempt, max_attempts, delay
        );
        tokio::time::sleep(delay).await;
    }
}
