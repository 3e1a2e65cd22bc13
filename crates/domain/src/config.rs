//! Configuration structures for the orchestration core
//!
//! The whole tree is serde-derived so it can be read from TOML or JSON; every
//! section falls back to the defaults in [`crate::constants`]. Values are
//! read once at startup; hot reload is out of scope.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_CACHE_CAPACITY,
    DEFAULT_CACHE_TTL_SECS, DEFAULT_DEGRADED_LATENCY_MS, DEFAULT_DEGRADED_SUCCESS_RATE,
    DEFAULT_HEALTH_WINDOW_SIZE, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS, DEFAULT_PROBE_INTERVAL_SECS, DEFAULT_PROBE_TIMEOUT_SECS,
    ENV_ANTHROPIC_API_KEY, ENV_MISTRAL_API_KEY, ENV_OPENAI_API_KEY,
};
use crate::types::Provider;

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_provider_catalog")]
    pub providers: Vec<ProviderConfig>,
    /// Environment-level fallback toggle, used when no per-user preference
    /// applies.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub health: HealthSettings,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            providers: default_provider_catalog(),
            fallback_enabled: true,
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            health: HealthSettings::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Enabled providers in environment order (priority, then id for a
    /// stable tie-break).
    #[must_use]
    pub fn enabled_providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self
            .providers
            .iter()
            .filter(|p| p.enabled)
            .map(ProviderConfig::to_provider)
            .collect();
        providers.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        providers
    }

    /// Look up one provider's config by id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// Static configuration of one provider in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub priority: u8,
    /// Name of the environment variable holding this provider's API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Key material resolved at load time. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    #[must_use]
    pub fn to_provider(&self) -> Provider {
        Provider {
            id: self.id.clone(),
            name: self.name.clone(),
            enabled: self.enabled,
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            priority: self.priority,
        }
    }
}

/// Retry Policy Engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-attempt timeout; `None` disables the timeout variant.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            attempt_timeout_secs: Some(DEFAULT_ATTEMPT_TIMEOUT_SECS),
        }
    }
}

impl RetrySettings {
    #[must_use]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs.map(Duration::from_secs)
    }
}

/// Context cache tunables, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { capacity: DEFAULT_CACHE_CAPACITY, ttl_secs: DEFAULT_CACHE_TTL_SECS }
    }
}

impl CacheSettings {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Health monitor tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSettings {
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Rolling window size in samples.
    #[serde(default = "default_health_window_size")]
    pub window_size: usize,
    /// Success rate below this, with at least one success, is degraded.
    #[serde(default = "default_degraded_success_rate")]
    pub degraded_success_rate: f64,
    /// Rolling average latency above this is degraded.
    #[serde(default = "default_degraded_latency_ms")]
    pub degraded_latency_ms: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            window_size: DEFAULT_HEALTH_WINDOW_SIZE,
            degraded_success_rate: DEFAULT_DEGRADED_SUCCESS_RATE,
            degraded_latency_ms: DEFAULT_DEGRADED_LATENCY_MS,
        }
    }
}

impl HealthSettings {
    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn default_provider_catalog() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            id: "openai".to_string(),
            name: "OpenAI".to_string(),
            enabled: true,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            priority: 0,
            api_key_env: Some(ENV_OPENAI_API_KEY.to_string()),
            api_key: None,
        },
        ProviderConfig {
            id: "anthropic".to_string(),
            name: "Anthropic".to_string(),
            enabled: true,
            endpoint: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            priority: 1,
            api_key_env: Some(ENV_ANTHROPIC_API_KEY.to_string()),
            api_key: None,
        },
        ProviderConfig {
            id: "mistral".to_string(),
            name: "Mistral".to_string(),
            enabled: true,
            endpoint: "https://api.mistral.ai/v1".to_string(),
            model: "mistral-large-latest".to_string(),
            priority: 2,
            api_key_env: Some(ENV_MISTRAL_API_KEY.to_string()),
            api_key: None,
        },
    ]
}

const fn default_true() -> bool {
    true
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}

const fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

const fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

const fn default_attempt_timeout_secs() -> Option<u64> {
    Some(DEFAULT_ATTEMPT_TIMEOUT_SECS)
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

const fn default_probe_interval_secs() -> u64 {
    DEFAULT_PROBE_INTERVAL_SECS
}

const fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

const fn default_health_window_size() -> usize {
    DEFAULT_HEALTH_WINDOW_SIZE
}

const fn default_degraded_success_rate() -> f64 {
    DEFAULT_DEGRADED_SUCCESS_RATE
}

const fn default_degraded_latency_ms() -> u64 {
    DEFAULT_DEGRADED_LATENCY_MS
}
