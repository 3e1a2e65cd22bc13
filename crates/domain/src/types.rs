//! Common data types used throughout the orchestration core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_status_conversions;

/// One external AI model backend reachable through the uniform call interface.
///
/// Immutable configuration: built at process start from the static catalog
/// (plus optional per-user ordering) and never mutated at runtime.
/// Credentials are deliberately not part of this value; it is logged and
/// serialized freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    /// Base URL of the provider's OpenAI-compatible API surface.
    pub endpoint: String,
    /// Default model slug requested by the transport.
    pub model: String,
    /// Lower sorts first in the environment order.
    pub priority: u8,
}

/// Stored per-user provider preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPreferences {
    /// Provider ids in the user's preferred order.
    pub provider_order: Vec<String>,
    /// Whether the user allows falling through to the next provider.
    pub auto_fallback: bool,
}

/// Where a resolved provider order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The user's stored preference order survived filtering.
    UserPreference,
    /// The configured catalog order (no identity, no usable preferences, or
    /// lookup failure).
    Environment,
}

/// Output of one resolver call: candidate providers in attempt order plus the
/// effective fallback toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProviders {
    pub providers: Vec<Provider>,
    pub allow_fallback: bool,
    pub source: ResolutionSource,
}

impl ResolvedProviders {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Caller-supplied payload plus the assembled side context for one generation
/// task (prior project text, character and world summaries).
///
/// Opaque to the dispatch path; the content hash is the only thing the cache
/// inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    pub prompt: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub character_notes: Vec<String>,
    #[serde(default)]
    pub world_notes: Vec<String>,
    #[serde(default)]
    pub recent_passages: Vec<String>,
}

impl OperationContext {
    /// Deterministic fingerprint of the whole context.
    ///
    /// Fields are length-prefixed before hashing so adjacent values cannot
    /// collide by concatenation. Equal contexts always hash equal; any
    /// content change changes the hash.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hash_str(&mut hasher, &self.prompt);
        hash_str(&mut hasher, self.synopsis.as_deref().unwrap_or(""));
        hash_list(&mut hasher, &self.character_notes);
        hash_list(&mut hasher, &self.world_notes);
        hash_list(&mut hasher, &self.recent_passages);
        hex::encode(hasher.finalize().as_bytes())
    }
}

fn hash_str(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_list(hasher: &mut blake3::Hasher, values: &[String]) {
    hasher.update(&(values.len() as u64).to_le_bytes());
    for value in values {
        hash_str(hasher, value);
    }
}

/// One generation task as submitted by the service layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Operation name, e.g. "outline", "plot_analysis", "style_score".
    pub operation: String,
    pub context: OperationContext,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Provider response for one generation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub provider_id: String,
    pub model: String,
    pub text: String,
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
}

/// Coarse provider health classification derived from rolling samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Operational,
    Degraded,
    Outage,
    Unknown,
}

impl_status_conversions!(HealthStatus {
    Operational => "operational",
    Degraded => "degraded",
    Outage => "outage",
    Unknown => "unknown",
});

/// Result of one liveness probe against one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSample {
    pub latency_ms: u64,
    pub success: bool,
    /// Advertised model count when the probe could read it.
    #[serde(default)]
    pub model_count: Option<usize>,
}

impl HealthSample {
    #[must_use]
    pub const fn success(latency_ms: u64, model_count: Option<usize>) -> Self {
        Self { latency_ms, success: true, model_count }
    }

    #[must_use]
    pub const fn failure(latency_ms: u64) -> Self {
        Self { latency_ms, success: false, model_count: None }
    }
}

/// Read-model snapshot of one provider's health.
///
/// Owned by the health tracker and mutated only by probe results; everything
/// else sees cloned snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealthRecord {
    pub provider_id: String,
    pub status: HealthStatus,
    /// Rolling average probe latency over the window.
    pub avg_latency_ms: u64,
    /// Rolling success rate over the window, 0.0..=1.0.
    pub success_rate: f64,
    #[serde(default)]
    pub model_count: Option<usize>,
    #[serde(default)]
    pub last_probe: Option<DateTime<Utc>>,
}

impl ProviderHealthRecord {
    /// Fresh record for a provider that has never been probed.
    #[must_use]
    pub fn unknown(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            status: HealthStatus::Unknown,
            avg_latency_ms: 0,
            success_rate: 0.0,
            model_count: None,
            last_probe: None,
        }
    }
}

/// Final per-provider outcome of one dispatch walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Failure,
}

impl_status_conversions!(AttemptOutcome {
    Success => "success",
    Failure => "failure",
});

/// One telemetry observation: a provider was attempted during a dispatch call.
///
/// Emitted once per attempted provider with its final outcome, not once per
/// underlying retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Correlates all records of one dispatch call.
    pub dispatch_id: Uuid,
    pub operation: String,
    pub provider_id: String,
    pub outcome: AttemptOutcome,
    /// Underlying calls the retry layer consumed for this provider.
    pub attempts: u32,
    pub latency_ms: u64,
    #[serde(default)]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
