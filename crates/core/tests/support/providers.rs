//! Mock port implementations for dispatch integration tests
//!
//! Provides in-memory mocks for the transport, telemetry, and preference
//! ports, enabling deterministic walk tests without network dependencies.

use async_trait::async_trait;
use inkflow_core::{PreferenceStore, ProviderTransport, TelemetrySink};
use inkflow_domain::{
    AttemptRecord, CacheSettings, GenerationRequest, GenerationResponse, HealthSettings,
    OrchestratorConfig, Provider, ProviderConfig, ProviderError, ProviderPreferences,
    Result as DomainResult, RetrySettings,
};
use parking_lot::Mutex;

/// Scripted behavior for one provider in a [`ScriptedTransport`].
#[derive(Clone)]
pub enum Script {
    /// Every call succeeds.
    Succeed,
    /// Every call fails with a clone of the given error.
    Fail(ProviderError),
    /// The first `failures` calls fail, then calls succeed.
    FailThenSucceed { failures: u32, error: ProviderError },
}

/// In-memory transport whose per-provider behavior is scripted.
///
/// Records every underlying call in invocation order so tests can assert
/// exactly how many times the retry layer engaged each provider. Providers
/// without a script succeed.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Vec<(String, Script)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a script for one provider id.
    #[must_use]
    pub fn with_script(mut self, provider_id: &str, script: Script) -> Self {
        self.scripts.push((provider_id.to_string(), script));
        self
    }

    /// Provider ids of every underlying call, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, provider_id: &str) -> usize {
        self.calls.lock().iter().filter(|id| *id == provider_id).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    fn script_for(&self, provider_id: &str) -> Script {
        self.scripts
            .iter()
            .find(|(id, _)| id == provider_id)
            .map_or(Script::Succeed, |(_, script)| script.clone())
    }
}

#[async_trait]
impl ProviderTransport for ScriptedTransport {
    async fn generate(
        &self,
        provider: &Provider,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let prior = {
            let mut calls = self.calls.lock();
            let prior = calls.iter().filter(|id| **id == provider.id).count() as u32;
            calls.push(provider.id.clone());
            prior
        };

        let succeed = match self.script_for(&provider.id) {
            Script::Succeed => Ok(()),
            Script::Fail(error) => Err(error),
            Script::FailThenSucceed { failures, error } => {
                if prior < failures {
                    Err(error)
                } else {
                    Ok(())
                }
            }
        };

        succeed.map(|()| GenerationResponse {
            provider_id: provider.id.clone(),
            model: provider.model.clone(),
            text: format!("{} from {}", request.operation, provider.id),
            prompt_tokens: Some(16),
            completion_tokens: Some(64),
        })
    }
}

/// Telemetry sink that keeps every record for later inspection.
#[derive(Default)]
pub struct RecordingTelemetry {
    records: Mutex<Vec<AttemptRecord>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn record(&self, record: &AttemptRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Preference store returning a fixed answer for every user.
pub struct FixedPreferences(pub Option<ProviderPreferences>);

#[async_trait]
impl PreferenceStore for FixedPreferences {
    async fn load_preferences(&self, _user_id: &str) -> DomainResult<Option<ProviderPreferences>> {
        Ok(self.0.clone())
    }
}

/// Catalog of enabled test providers in the given priority order.
pub fn catalog(provider_ids: &[&str]) -> OrchestratorConfig {
    let providers = provider_ids
        .iter()
        .enumerate()
        .map(|(priority, id)| ProviderConfig {
            id: (*id).to_string(),
            name: id.to_uppercase(),
            enabled: true,
            endpoint: format!("https://{id}.invalid/v1"),
            model: "test-model".to_string(),
            priority: priority as u8,
            api_key_env: None,
            api_key: None,
        })
        .collect();

    OrchestratorConfig {
        providers,
        fallback_enabled: true,
        retry: fast_retry(3),
        cache: CacheSettings { capacity: 4, ttl_secs: 300 },
        health: HealthSettings::default(),
    }
}

/// Retry settings with micro delays so failing walks finish quickly.
pub fn fast_retry(max_attempts: u32) -> RetrySettings {
    RetrySettings {
        max_attempts,
        initial_delay_ms: 1,
        backoff_multiplier: 2.0,
        max_delay_ms: 5,
        attempt_timeout_secs: None,
    }
}

/// Minimal generation request for the given operation.
pub fn request(operation: &str) -> GenerationRequest {
    GenerationRequest {
        operation: operation.to_string(),
        context: inkflow_domain::OperationContext {
            prompt: "continue the scene".to_string(),
            ..Default::default()
        },
        max_tokens: Some(256),
        temperature: Some(0.7),
    }
}
