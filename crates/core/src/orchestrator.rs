//! Orchestrator facade over dispatch, context caching, and health
//!
//! Service layers hold one [`Orchestrator`] and reach every orchestration
//! concern through it: generation goes through the fallback dispatcher,
//! assembled contexts go through the per-subject cache, and provider health
//! is read from the tracker the background monitor feeds.

use std::sync::Arc;

use inkflow_domain::{
    DispatchError, GenerationRequest, GenerationResponse, OperationContext, OrchestratorConfig,
    Provider, ProviderError, ProviderHealthRecord,
};

use crate::cache::{CacheStats, ContextCache};
use crate::dispatch::{FallbackDispatcher, ProviderTransport, TelemetrySink};
use crate::health::HealthTracker;
use crate::resolver::{PreferenceStore, ProviderResolver};

/// Single entry point into the orchestration core.
///
/// Built once at startup from the loaded configuration; every collaborator
/// behind it is injected through its port, so adapters and tests swap freely.
pub struct Orchestrator {
    dispatcher: FallbackDispatcher,
    transport: Arc<dyn ProviderTransport>,
    cache: ContextCache,
    health: Arc<HealthTracker>,
}

impl Orchestrator {
    /// Wire the core from configuration and injected ports.
    ///
    /// The health tracker is seeded with the enabled catalog so status
    /// displays list every provider from the first render.
    pub fn new(
        config: &OrchestratorConfig,
        preferences: Arc<dyn PreferenceStore>,
        transport: Arc<dyn ProviderTransport>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let resolver = ProviderResolver::new(config, preferences);
        let provider_ids = config.enabled_providers().into_iter().map(|p| p.id);
        Self {
            dispatcher: FallbackDispatcher::new(resolver, telemetry, config.retry.clone()),
            transport,
            cache: ContextCache::new(&config.cache),
            health: Arc::new(HealthTracker::new(&config.health, provider_ids)),
        }
    }

    /// Run one generation task through the provider walk.
    ///
    /// Providers are tried in resolved order; the first success wins. The
    /// transport owns the wire format, so this stays provider-agnostic.
    pub async fn generate(
        &self,
        user_id: Option<&str>,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DispatchError> {
        let operation = request.operation.clone();
        let request = Arc::new(request);
        let transport = Arc::clone(&self.transport);
        self.dispatcher
            .execute(user_id, &operation, move |provider| {
                let transport = Arc::clone(&transport);
                let request = Arc::clone(&request);
                async move { transport.generate(&provider, &request).await }
            })
            .await
    }

    /// Run an arbitrary per-provider operation through the provider walk.
    ///
    /// For callers that need more than chat generation, e.g. model listing
    /// or embeddings, while keeping resolution, retry, and fallback.
    pub async fn dispatch<T, F, Fut>(
        &self,
        user_id: Option<&str>,
        operation_name: &str,
        operation: F,
    ) -> Result<T, DispatchError>
    where
        F: FnMut(Provider) -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        self.dispatcher.execute(user_id, operation_name, operation).await
    }

    /// Store an assembled context for `subject_id`, fingerprinted by its own
    /// content hash.
    pub fn cache_context(&self, subject_id: &str, context: OperationContext) {
        let content_hash = context.content_hash();
        self.cache.set(subject_id, context, &content_hash);
    }

    /// Fetch the cached context for `subject_id` if it is still fresh
    /// against `content_hash`.
    pub fn cached_context(&self, subject_id: &str, content_hash: &str) -> Option<OperationContext> {
        self.cache.get(subject_id, content_hash)
    }

    /// Drop the cached context for `subject_id`, if any.
    pub fn invalidate_context(&self, subject_id: &str) -> bool {
        self.cache.invalidate(subject_id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Health snapshot for one provider.
    pub fn provider_status(&self, provider_id: &str) -> ProviderHealthRecord {
        self.health.status(provider_id)
    }

    /// Health snapshots for every known provider, ordered by id.
    pub fn provider_statuses(&self) -> Vec<ProviderHealthRecord> {
        self.health.all_statuses()
    }

    /// Shared handle to the health tracker, for wiring the probe worker.
    pub fn health_tracker(&self) -> Arc<HealthTracker> {
        Arc::clone(&self.health)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use inkflow_domain::{
        HealthStatus, ProviderPreferences, Result as DomainResult, RetrySettings,
    };

    use super::*;
    use crate::dispatch::NullTelemetrySink;

    /// Transport that fails the scripted provider ids and echoes for the
    /// rest.
    struct ScriptedTransport {
        failing: Vec<String>,
    }

    #[async_trait]
    impl ProviderTransport for ScriptedTransport {
        async fn generate(
            &self,
            provider: &Provider,
            request: &GenerationRequest,
        ) -> Result<GenerationResponse, ProviderError> {
            if self.failing.contains(&provider.id) {
                return Err(ProviderError::Network(format!(
                    "connection refused by {}",
                    provider.id
                )));
            }
            Ok(GenerationResponse {
                provider_id: provider.id.clone(),
                model: provider.model.clone(),
                text: format!("echo: {}", request.context.prompt),
                prompt_tokens: Some(12),
                completion_tokens: Some(40),
            })
        }
    }

    struct NoPreferences;

    #[async_trait]
    impl PreferenceStore for NoPreferences {
        async fn load_preferences(&self, _user_id: &str) -> DomainResult<Option<ProviderPreferences>> {
            Ok(None)
        }
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            // Single underlying attempt keeps the walk free of backoff sleeps
            retry: RetrySettings {
                max_attempts: 1,
                initial_delay_ms: 1,
                backoff_multiplier: 2.0,
                max_delay_ms: 10,
                attempt_timeout_secs: None,
            },
            ..OrchestratorConfig::default()
        }
    }

    fn orchestrator(failing: &[&str]) -> Orchestrator {
        let transport = ScriptedTransport {
            failing: failing.iter().map(|id| (*id).to_string()).collect(),
        };
        Orchestrator::new(
            &config(),
            Arc::new(NoPreferences),
            Arc::new(transport),
            Arc::new(NullTelemetrySink),
        )
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            operation: "outline".to_string(),
            context: OperationContext { prompt: prompt.to_string(), ..OperationContext::default() },
            max_tokens: Some(512),
            temperature: Some(0.7),
        }
    }

    /// Validates `Orchestrator::generate` behavior for the healthy first
    /// provider scenario.
    ///
    /// Assertions:
    /// - Confirms the response comes from the highest-priority provider.
    /// - Confirms the transport saw the request payload.
    #[tokio::test]
    async fn test_generate_uses_first_provider() {
        let orchestrator = orchestrator(&[]);

        let response = orchestrator.generate(None, request("draft an opening")).await.unwrap();

        assert_eq!(response.provider_id, "openai");
        assert_eq!(response.text, "echo: draft an opening");
    }

    /// Validates `Orchestrator::generate` behavior for the failing first
    /// provider scenario.
    ///
    /// Assertions:
    /// - Confirms the walk falls through to the next provider in order.
    #[tokio::test]
    async fn test_generate_falls_back_past_failing_provider() {
        let orchestrator = orchestrator(&["openai"]);

        let response = orchestrator.generate(None, request("draft an opening")).await.unwrap();

        assert_eq!(response.provider_id, "anthropic");
    }

    /// Validates `Orchestrator::generate` behavior for the all-providers-down
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the caller sees one exhausted error naming every attempted
    ///   provider.
    #[tokio::test]
    async fn test_generate_exhausts_when_all_fail() {
        let orchestrator = orchestrator(&["openai", "anthropic", "mistral"]);

        let error = orchestrator.generate(None, request("draft")).await.unwrap_err();

        match error {
            DispatchError::Exhausted { attempted, .. } => {
                assert_eq!(attempted, ["openai", "anthropic", "mistral"]);
            }
            other => panic!("expected exhausted, got {other:?}"),
        }
    }

    /// Validates the context cache facade round trip.
    #[tokio::test]
    async fn test_context_cache_round_trip() {
        let orchestrator = orchestrator(&[]);
        let context = OperationContext {
            prompt: "chapter 3".to_string(),
            synopsis: Some("the heist".to_string()),
            ..OperationContext::default()
        };
        let hash = context.content_hash();

        orchestrator.cache_context("project-1", context.clone());
        assert_eq!(orchestrator.cached_context("project-1", &hash), Some(context));

        assert!(orchestrator.invalidate_context("project-1"));
        assert_eq!(orchestrator.cached_context("project-1", &hash), None);
        assert_eq!(orchestrator.cache_stats().misses, 1);
    }

    /// Validates the health tracker is seeded from the enabled catalog.
    #[tokio::test]
    async fn test_health_seeded_with_catalog() {
        let orchestrator = orchestrator(&[]);

        let statuses = orchestrator.provider_statuses();
        let ids: Vec<&str> = statuses.iter().map(|r| r.provider_id.as_str()).collect();
        assert_eq!(ids, ["anthropic", "mistral", "openai"]);
        assert!(statuses.iter().all(|r| r.status == HealthStatus::Unknown));

        assert_eq!(orchestrator.provider_status("openai").status, HealthStatus::Unknown);
    }
}
