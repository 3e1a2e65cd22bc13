//! # InkFlow Core
//!
//! Pure orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Provider resolution and fallback dispatch
//! - Transient-error classification over the retry layer
//! - Per-subject context caching and provider health tracking
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `inkflow-common` and `inkflow-domain`
//! - No HTTP, filesystem, or platform code
//! - All external dependencies via traits
//! - Pure, testable orchestration logic

pub mod cache;
pub mod dispatch;
pub mod health;
pub mod orchestrator;
pub mod resolver;

// Re-export specific items to avoid ambiguity
pub use cache::{CacheStats, ContextCache};
pub use dispatch::ports::{NullTelemetrySink, ProviderTransport, TelemetrySink};
pub use dispatch::{retryable_message, DispatchState, FallbackDispatcher, TransientErrorPredicate};
pub use health::ports::ProviderProbe;
pub use health::HealthTracker;
pub use orchestrator::Orchestrator;
pub use resolver::ports::PreferenceStore;
pub use resolver::ProviderResolver;
