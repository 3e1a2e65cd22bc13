//! Bounded retry with exponential backoff
//!
//! Executes a fallible async operation up to a configured number of attempts,
//! sleeping between attempts per the policy's delay law. Whether an error is
//! worth another attempt is decided by a [`RetryPredicate`], the single seam
//! where callers plug in their own classification.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations.
///
/// Both failure variants carry the most recent underlying error, never the
/// first one.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every allowed attempt failed.
    #[error("all {attempts} attempts failed: {source}")]
    Exhausted { attempts: u32, source: E },

    /// The operation failed with an error the predicate refused to retry.
    #[error("non-retryable error on attempt {attempts}: {source}")]
    NonRetryable { attempts: u32, source: E },
}

impl<E> RetryError<E> {
    /// The most recent underlying error.
    pub const fn source_error(&self) -> &E {
        match self {
            Self::Exhausted { source, .. } | Self::NonRetryable { source, .. } => source,
        }
    }

    /// Consume the wrapper and return the most recent underlying error.
    pub fn into_source(self) -> E {
        match self {
            Self::Exhausted { source, .. } | Self::NonRetryable { source, .. } => source,
        }
    }

    /// Attempts consumed before giving up.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::NonRetryable { attempts, .. } => *attempts,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    /// Attempts consumed, successful or not. Always at least 1.
    pub attempts: u32,
    /// Accumulated backoff delay (excludes operation execution time).
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Per-call retry tunables.
///
/// A plain value object: constructed per call or defaulted, never shared
/// mutably. The delay before attempt `n + 1` is
/// `initial_delay * multiplier^(n-1)`, capped at `max_delay`. There is no
/// jitter; callers rely on the exact delay law.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Zero is treated as
    /// one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Multiplier applied for each subsequent failure.
    pub multiplier: f64,
    /// Upper bound on a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self { max_attempts, initial_delay, multiplier, max_delay: Duration::from_secs(30) }
    }

    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay to sleep after `failed_attempt` (1-based) fails.
    #[must_use]
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1);
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(capped_ms)
    }

    const fn effective_max_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }
}

/// Trait for determining whether an error should be retried.
///
/// This is the only place retryability is decided; swapping the default
/// message-based classification for typed error codes touches implementations
/// of this trait and nothing else.
pub trait RetryPredicate<E> {
    /// Whether `error`, observed on 1-based `attempt`, is worth another try.
    fn is_retryable(&self, error: &E, attempt: u32) -> bool;
}

/// The main retry executor.
///
/// Backoff sleeps are cooperative (`tokio::time::sleep`); only the logical
/// operation is suspended, never a shared thread or lock.
pub struct RetryExecutor<P> {
    policy: RetryPolicy,
    predicate: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given policy and predicate.
    pub const fn new(policy: RetryPolicy, predicate: P) -> Self {
        Self { policy, predicate }
    }

    /// Create with the default policy.
    pub fn with_predicate(predicate: P) -> Self {
        Self::new(RetryPolicy::default(), predicate)
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic.
    #[instrument(skip(self, operation), fields(max_attempts = self.policy.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPredicate<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPredicate<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.policy.effective_max_attempts();
        let mut attempt: u32 = 1;
        let mut total_delay = Duration::ZERO;

        loop {
            debug!(attempt, max_attempts, "executing operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => {
                    if let Some(outcome) = self.give_up(error, attempt, total_delay) {
                        return outcome;
                    }
                    total_delay += self.sleep_before_next(attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Execute with retry logic, bounding each attempt by `attempt_timeout`.
    ///
    /// A timed-out attempt is abandoned (its future is dropped, releasing
    /// whatever it held) and converted through `on_timeout` into an ordinary
    /// error, eligible for retry like any other. `on_timeout` implementations
    /// produce messages containing "timed out" so downstream classification
    /// can distinguish them.
    pub async fn execute_with_attempt_timeout<F, Fut, T, E, M>(
        &self,
        mut operation: F,
        attempt_timeout: Duration,
        mut on_timeout: M,
    ) -> RetryOutcome<T, E>
    where
        P: RetryPredicate<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        M: FnMut(Duration) -> E,
    {
        let max_attempts = self.policy.effective_max_attempts();
        let mut attempt: u32 = 1;
        let mut total_delay = Duration::ZERO;

        loop {
            debug!(attempt, max_attempts, timeout = ?attempt_timeout, "executing bounded operation");

            let result = match tokio::time::timeout(attempt_timeout, operation()).await {
                Ok(inner) => inner,
                Err(_) => {
                    warn!(attempt, timeout = ?attempt_timeout, "attempt timed out, abandoning it");
                    Err(on_timeout(attempt_timeout))
                }
            };

            match result {
                Ok(value) => {
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => {
                    if let Some(outcome) = self.give_up(error, attempt, total_delay) {
                        return outcome;
                    }
                    total_delay += self.sleep_before_next(attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Terminal outcome for `error` on `attempt`, or `None` when another
    /// attempt is allowed.
    fn give_up<T, E>(
        &self,
        error: E,
        attempt: u32,
        total_delay: Duration,
    ) -> Option<RetryOutcome<T, E>>
    where
        P: RetryPredicate<E>,
        E: fmt::Display,
    {
        if attempt >= self.policy.effective_max_attempts() {
            warn!(attempt, error = %error, "all attempts exhausted");
            return Some(RetryOutcome {
                result: Err(RetryError::Exhausted { attempts: attempt, source: error }),
                attempts: attempt,
                total_delay,
            });
        }

        if !self.predicate.is_retryable(&error, attempt) {
            debug!(attempt, error = %error, "error is not retryable");
            return Some(RetryOutcome {
                result: Err(RetryError::NonRetryable { attempts: attempt, source: error }),
                attempts: attempt,
                total_delay,
            });
        }

        None
    }

    async fn sleep_before_next(&self, failed_attempt: u32) -> Duration {
        let delay = self.policy.backoff_delay(failed_attempt);
        warn!(attempt = failed_attempt, delay = ?delay, "operation failed, retrying after delay");
        tokio::time::sleep(delay).await;
        delay
    }
}

/// Convenience function to create a retry executor and execute an operation.
pub async fn retry_with_policy<F, Fut, T, E, P>(
    policy: RetryPolicy,
    predicate: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPredicate<E>,
    E: fmt::Display,
{
    let executor = RetryExecutor::new(policy, predicate);
    executor.execute(operation).await
}

/// Pre-defined retry predicates for common scenarios
pub mod policies {
    use super::RetryPredicate;

    /// Retries on any error.
    #[derive(Debug, Clone, Copy)]
    pub struct AlwaysRetry;

    impl<E> RetryPredicate<E> for AlwaysRetry {
        fn is_retryable(&self, _error: &E, _attempt: u32) -> bool {
            true
        }
    }

    /// Never retries.
    #[derive(Debug, Clone, Copy)]
    pub struct NeverRetry;

    impl<E> RetryPredicate<E> for NeverRetry {
        fn is_retryable(&self, _error: &E, _attempt: u32) -> bool {
            false
        }
    }

    /// Closure-backed predicate.
    #[derive(Debug)]
    pub struct RetryIf<F> {
        predicate: F,
    }

    impl<F> RetryIf<F> {
        pub const fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPredicate<E> for RetryIf<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn is_retryable(&self, error: &E, attempt: u32) -> bool {
            (self.predicate)(error, attempt)
        }
    }
}
