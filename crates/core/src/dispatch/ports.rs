//! Port interfaces for provider dispatch

use async_trait::async_trait;
use inkflow_domain::{AttemptRecord, GenerationRequest, GenerationResponse, Provider, ProviderError};

/// Trait for the outbound call against one provider.
///
/// The dispatch layer is agnostic to the wire protocol; adapters map their
/// transport failures into [`ProviderError`] variants so classification and
/// fallback behave uniformly.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Run one generation task against `provider`.
    async fn generate(
        &self,
        provider: &Provider,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError>;
}

/// Trait for recording per-provider dispatch observations.
///
/// Fire-and-forget: recording is synchronous and infallible so it can never
/// fail or block the dispatch path. One record is emitted per attempted
/// provider, reflecting the final per-provider outcome.
pub trait TelemetrySink: Send + Sync {
    /// Record one attempt observation.
    fn record(&self, record: &AttemptRecord);
}

/// Sink that drops every record. Useful for tests and embedded callers that
/// do not collect telemetry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {
    fn record(&self, _record: &AttemptRecord) {}
}
