//! Fallback dispatch - walking resolved providers until one succeeds
//!
//! The dispatcher resolves the candidate list once per call, then walks it
//! strictly in order, engaging each provider through the retry layer. The
//! first success wins and ends the walk; a provider whose retries exhaust (or
//! that fails fatally) is left behind for good, never revisited within the
//! same call. One telemetry record is emitted per attempted provider with its
//! final outcome.

pub mod classify;
pub mod ports;
pub mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use inkflow_common::{RetryError, RetryExecutor, RetryPolicy};
use inkflow_domain::{
    AttemptOutcome, AttemptRecord, DispatchError, Provider, ProviderError, RetrySettings,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::resolver::ProviderResolver;

pub use classify::{retryable_message, TransientErrorPredicate};
pub use ports::{NullTelemetrySink, ProviderTransport, TelemetrySink};
pub use state::DispatchState;

/// Outcome of engaging one provider through the retry layer.
struct ProviderAttempt<T> {
    result: Result<T, ProviderError>,
    /// Underlying calls consumed, including the successful one.
    attempts: u32,
}

/// Walks resolved providers in order, first success wins.
pub struct FallbackDispatcher {
    resolver: ProviderResolver,
    telemetry: Arc<dyn TelemetrySink>,
    retry: RetrySettings,
}

impl FallbackDispatcher {
    /// Create a dispatcher over the given resolver and telemetry sink.
    pub fn new(
        resolver: ProviderResolver,
        telemetry: Arc<dyn TelemetrySink>,
        retry: RetrySettings,
    ) -> Self {
        Self { resolver, telemetry, retry }
    }

    /// Execute `operation` against the first provider that succeeds.
    ///
    /// The resolver runs exactly once per call. An empty candidate list is
    /// rejected up front with [`DispatchError::NoProvidersEnabled`]; once the
    /// walk starts, the caller sees either the winning value or one
    /// [`DispatchError::Exhausted`] carrying the most recent provider error
    /// and the attempted ids in order.
    #[instrument(skip(self, operation))]
    pub async fn execute<T, F, Fut>(
        &self,
        user_id: Option<&str>,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T, DispatchError>
    where
        F: FnMut(Provider) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let resolved = self.resolver.resolve(user_id).await;
        if resolved.is_empty() {
            warn!(operation = operation_name, "dispatch rejected: no providers enabled");
            return Err(DispatchError::NoProvidersEnabled {
                operation: operation_name.to_string(),
            });
        }

        let candidates = resolved.providers;
        let allow_fallback = resolved.allow_fallback;
        let dispatch_id = Uuid::new_v4();
        debug!(
            %dispatch_id,
            candidates = candidates.len(),
            allow_fallback,
            source = ?resolved.source,
            "dispatching"
        );

        let mut attempted: Vec<String> = Vec::with_capacity(candidates.len());
        let mut state = DispatchState::start();

        while let DispatchState::Attempting { index } = state {
            let provider = &candidates[index];
            attempted.push(provider.id.clone());

            let started = Instant::now();
            let attempt = self.engage_provider(provider, operation_name, &mut operation).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            self.record_attempt(dispatch_id, operation_name, provider, &attempt, latency_ms);
            state = state.advance(attempt.result.is_ok(), candidates.len(), allow_fallback);

            match attempt.result {
                Ok(value) => {
                    debug!(
                        %dispatch_id,
                        provider = %provider.id,
                        attempts = attempt.attempts,
                        "dispatch succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => match state {
                    DispatchState::Fallback { .. } => {
                        warn!(
                            %dispatch_id,
                            provider = %provider.id,
                            error = %error,
                            transient = error.is_transient(),
                            "provider failed, falling back to next candidate"
                        );
                        state = state.resume();
                    }
                    _ => {
                        warn!(
                            %dispatch_id,
                            provider = %provider.id,
                            error = %error,
                            attempted = attempted.len(),
                            "dispatch exhausted"
                        );
                        return Err(DispatchError::Exhausted {
                            operation: operation_name.to_string(),
                            attempted,
                            source: error,
                        });
                    }
                },
            }
        }

        // The walk always returns from inside the loop: candidates are
        // non-empty and every transition either returns or resumes.
        Err(DispatchError::NoProvidersEnabled { operation: operation_name.to_string() })
    }

    /// Engage one provider: run the operation under the retry policy,
    /// bounding each attempt when a per-attempt timeout is configured.
    async fn engage_provider<T, F, Fut>(
        &self,
        provider: &Provider,
        operation_name: &str,
        operation: &mut F,
    ) -> ProviderAttempt<T>
    where
        F: FnMut(Provider) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let executor = RetryExecutor::new(retry_policy(&self.retry), TransientErrorPredicate);

        let outcome = match self.retry.attempt_timeout() {
            Some(limit) => {
                let name = operation_name.to_string();
                executor
                    .execute_with_attempt_timeout(
                        || operation(provider.clone()),
                        limit,
                        move |elapsed| ProviderError::Timeout {
                            operation: name.clone(),
                            elapsed_ms: elapsed.as_millis() as u64,
                        },
                    )
                    .await
            }
            None => executor.execute_with_outcome(|| operation(provider.clone())).await,
        };

        ProviderAttempt {
            attempts: outcome.attempts,
            result: outcome.result.map_err(RetryError::into_source),
        }
    }

    fn record_attempt<T>(
        &self,
        dispatch_id: Uuid,
        operation_name: &str,
        provider: &Provider,
        attempt: &ProviderAttempt<T>,
        latency_ms: u64,
    ) {
        let (outcome, error) = match &attempt.result {
            Ok(_) => (AttemptOutcome::Success, None),
            Err(err) => (AttemptOutcome::Failure, Some(err.to_string())),
        };
        self.telemetry.record(&AttemptRecord {
            dispatch_id,
            operation: operation_name.to_string(),
            provider_id: provider.id.clone(),
            outcome,
            attempts: attempt.attempts,
            latency_ms,
            error,
            recorded_at: Utc::now(),
        });
    }
}

/// Build the retry policy from configured settings.
fn retry_policy(settings: &RetrySettings) -> RetryPolicy {
    RetryPolicy::new(
        settings.max_attempts,
        Duration::from_millis(settings.initial_delay_ms),
        settings.backoff_multiplier,
    )
    .with_max_delay(Duration::from_millis(settings.max_delay_ms))
}
