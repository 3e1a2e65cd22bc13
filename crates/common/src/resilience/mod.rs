//! Resilience patterns for fault tolerance
//!
//! Generic retry machinery, decoupled from any particular error type. The
//! executor is generic over `<E: Display>` and retryability is decided by a
//! [`RetryPredicate`] implementation, so provider dispatch can plug in its own
//! transient-error classification without this module knowing about providers.

pub mod retry;

// Re-export retry types
pub use retry::{
    policies, retry_with_policy, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    RetryPredicate, RetryResult,
};
