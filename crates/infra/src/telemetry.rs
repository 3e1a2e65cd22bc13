//! Telemetry sink backed by `tracing`
//!
//! Each dispatch attempt record becomes one structured event, so operators
//! can follow fallback chains in the logs without a separate metrics
//! pipeline.

use inkflow_core::TelemetrySink;
use inkflow_domain::{AttemptOutcome, AttemptRecord};
use tracing::{info, warn};

/// Sink that emits one tracing event per attempt record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

impl TracingTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, record: &AttemptRecord) {
        match record.outcome {
            AttemptOutcome::Success => info!(
                dispatch_id = %record.dispatch_id,
                operation = %record.operation,
                provider = %record.provider_id,
                attempts = record.attempts,
                latency_ms = record.latency_ms,
                "provider attempt succeeded"
            ),
            AttemptOutcome::Failure => warn!(
                dispatch_id = %record.dispatch_id,
                operation = %record.operation,
                provider = %record.provider_id,
                attempts = record.attempts,
                latency_ms = record.latency_ms,
                error = record.error.as_deref().unwrap_or("unknown"),
                "provider attempt failed"
            ),
        }
    }
}
