//! Transient-error classification
//!
//! Retryability is decided by matching rendered error text against a fixed
//! set of transient markers. Message matching is deliberately the only
//! classification mechanism and lives behind the [`RetryPredicate`] seam, so
//! replacing it with typed error codes later touches this module and nothing
//! in the retry loop.

use std::fmt;

use inkflow_common::RetryPredicate;

/// Substrings that mark an error message as transient.
///
/// Covers timeouts, network/connection failures, rate limiting (HTTP 429) and
/// server-side failures (HTTP 5xx), matched case-insensitively.
const TRANSIENT_MARKERS: &[&str] = &[
    "timed out",
    "timeout",
    "network",
    "connection",
    "rate limit",
    "too many requests",
    "429",
    "server error",
    "unavailable",
    "500",
    "502",
    "503",
    "504",
];

/// Whether a rendered error message indicates a transient condition.
///
/// Anything not matching a transient marker is fatal: it is returned
/// immediately without consuming further attempts.
#[must_use]
pub fn retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Default retry predicate: classify by rendered message.
///
/// Works over any `Display` error, which keeps the same classification
/// applicable to provider errors and to foreign transport errors alike.
/// Callers wanting different behavior supply their own [`RetryPredicate`];
/// an explicit predicate fully replaces this classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientErrorPredicate;

impl<E: fmt::Display> RetryPredicate<E> for TransientErrorPredicate {
    fn is_retryable(&self, error: &E, _attempt: u32) -> bool {
        retryable_message(&error.to_string())
    }
}
