//! Shared utilities for InkFlow crates.
//!
//! Small, dependency-light building blocks used by the orchestration core and
//! infrastructure layers: generic retry with exponential backoff, and a clock
//! abstraction for deterministic time in tests.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use resilience::{
    policies, retry_with_policy, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    RetryPredicate, RetryResult,
};
pub use time::{Clock, MockClock, SystemClock};
