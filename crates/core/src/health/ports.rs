//! Port interfaces for provider health probing

use async_trait::async_trait;
use inkflow_domain::{HealthSample, Provider};

/// Trait for issuing one cheap liveness request against a provider.
///
/// Probing is infallible by construction: a failed or timed-out request is
/// reported as a failed sample carrying the measured latency, never as an
/// error. Probe outcomes feed the health tracker and nothing else.
#[async_trait]
pub trait ProviderProbe: Send + Sync {
    /// Probe `provider` once and report the outcome.
    async fn probe(&self, provider: &Provider) -> HealthSample;
}
