//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! orchestration core.

// Retry defaults
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;

// Context cache defaults
pub const DEFAULT_CACHE_CAPACITY: usize = 100;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// Health monitoring defaults
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_HEALTH_WINDOW_SIZE: usize = 20;
pub const DEFAULT_DEGRADED_SUCCESS_RATE: f64 = 0.75;
pub const DEFAULT_DEGRADED_LATENCY_MS: u64 = 2_000;

// Environment variable names
pub const ENV_PROVIDERS: &str = "INKFLOW_PROVIDERS";
pub const ENV_FALLBACK_ENABLED: &str = "INKFLOW_FALLBACK_ENABLED";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "INKFLOW_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_INITIAL_DELAY_MS: &str = "INKFLOW_RETRY_INITIAL_DELAY_MS";
pub const ENV_RETRY_BACKOFF_MULTIPLIER: &str = "INKFLOW_RETRY_BACKOFF_MULTIPLIER";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "INKFLOW_RETRY_MAX_DELAY_MS";
pub const ENV_RETRY_ATTEMPT_TIMEOUT_SECS: &str = "INKFLOW_RETRY_ATTEMPT_TIMEOUT_SECS";
pub const ENV_CACHE_CAPACITY: &str = "INKFLOW_CACHE_CAPACITY";
pub const ENV_CACHE_TTL_SECS: &str = "INKFLOW_CACHE_TTL_SECS";
pub const ENV_PROBE_INTERVAL_SECS: &str = "INKFLOW_PROBE_INTERVAL_SECS";
pub const ENV_PROBE_TIMEOUT_SECS: &str = "INKFLOW_PROBE_TIMEOUT_SECS";
pub const ENV_CONFIG_PATH: &str = "INKFLOW_CONFIG_PATH";

// Default provider credential env vars
pub const ENV_OPENAI_API_KEY: &str = "INKFLOW_OPENAI_API_KEY";
pub const ENV_ANTHROPIC_API_KEY: &str = "INKFLOW_ANTHROPIC_API_KEY";
pub const ENV_MISTRAL_API_KEY: &str = "INKFLOW_MISTRAL_API_KEY";
