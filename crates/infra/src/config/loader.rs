//! Configuration loader
//!
//! Loads orchestrator configuration from environment variables and files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file when one is present (`dotenvy`)
//! 2. Reads the base config from `INKFLOW_CONFIG_PATH`, a probed config
//!    file, or the built-in defaults
//! 3. Applies `INKFLOW_*` environment overrides on top
//! 4. Resolves provider API keys from the environment
//! 5. Validates the result
//!
//! ## Environment Variables
//! - `INKFLOW_CONFIG_PATH`: Explicit config file path (skips probing)
//! - `INKFLOW_PROVIDERS`: Comma-separated provider ids to enable
//! - `INKFLOW_FALLBACK_ENABLED`: Whether fallback dispatch is enabled (true/false)
//! - `INKFLOW_RETRY_MAX_ATTEMPTS`: Attempts per provider before failing over
//! - `INKFLOW_RETRY_INITIAL_DELAY_MS`: First retry delay in milliseconds
//! - `INKFLOW_RETRY_BACKOFF_MULTIPLIER`: Exponential backoff multiplier
//! - `INKFLOW_RETRY_MAX_DELAY_MS`: Upper bound on a single retry delay
//! - `INKFLOW_RETRY_ATTEMPT_TIMEOUT_SECS`: Per-attempt timeout (0 disables)
//! - `INKFLOW_CACHE_CAPACITY`: Context cache entry capacity
//! - `INKFLOW_CACHE_TTL_SECS`: Context cache entry TTL in seconds
//! - `INKFLOW_PROBE_INTERVAL_SECS`: Health probe interval in seconds
//! - `INKFLOW_PROBE_TIMEOUT_SECS`: Per-probe timeout in seconds
//!
//! Provider API keys are resolved from the variables named by each catalog
//! entry's `api_key_env` (for the default catalog: `INKFLOW_OPENAI_API_KEY`,
//! `INKFLOW_ANTHROPIC_API_KEY`, `INKFLOW_MISTRAL_API_KEY`).
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./inkflow.toml` or `./inkflow.json` (current working directory)
//! 2. `./config/inkflow.toml` or `./config/inkflow.json`
//! 3. The same four paths relative to the executable location

use std::path::{Path, PathBuf};

use inkflow_domain::constants::{
    ENV_CACHE_CAPACITY, ENV_CACHE_TTL_SECS, ENV_CONFIG_PATH, ENV_FALLBACK_ENABLED,
    ENV_PROBE_INTERVAL_SECS, ENV_PROBE_TIMEOUT_SECS, ENV_PROVIDERS,
    ENV_RETRY_ATTEMPT_TIMEOUT_SECS, ENV_RETRY_BACKOFF_MULTIPLIER, ENV_RETRY_INITIAL_DELAY_MS,
    ENV_RETRY_MAX_ATTEMPTS, ENV_RETRY_MAX_DELAY_MS,
};
use inkflow_domain::{InkFlowError, OrchestratorConfig, Result};

use super::validate;

/// Load configuration with automatic fallback strategy
///
/// Reads the base configuration from `INKFLOW_CONFIG_PATH`, a probed config
/// file, or the built-in defaults, then applies environment overrides and
/// resolves provider credentials.
///
/// # Errors
/// Returns `InkFlowError::Config` if:
/// - An explicitly named config file is missing or malformed
/// - An environment override is set but does not parse
/// - The resulting catalog fails validation
pub fn load() -> Result<OrchestratorConfig> {
    // A .env file is optional; a missing one is not an error.
    dotenvy::dotenv().ok();

    let mut config = match std::env::var(ENV_CONFIG_PATH).ok() {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::debug!("No config file found, starting from built-in defaults");
                OrchestratorConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    resolve_credentials(&mut config);
    validate(&config)?;

    tracing::info!(providers = config.enabled_providers().len(), "Configuration loaded");
    Ok(config)
}

/// Load configuration from environment variables only
///
/// Starts from the built-in defaults and applies the `INKFLOW_*` overrides,
/// without touching the filesystem.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `InkFlowError::Config` if an override is set but does not parse,
/// or if the resulting catalog fails validation.
pub fn load_from_env() -> Result<OrchestratorConfig> {
    let mut config = OrchestratorConfig::default();

    apply_env_overrides(&mut config)?;
    resolve_credentials(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both TOML and JSON formats (detected by file extension).
///
/// This is the raw file layer: environment overrides, credential resolution,
/// and validation are the caller's concern. [`load`] applies all three.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `InkFlowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<OrchestratorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InkFlowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InkFlowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| InkFlowError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.toml` or `.json`).
///
/// # Arguments
/// * `contents` - File contents as string
/// * `path` - Path to the file (for format detection and error messages)
///
/// # Errors
/// Returns `InkFlowError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<OrchestratorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InkFlowError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InkFlowError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(InkFlowError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./inkflow.{toml,json}`,
///    `./config/inkflow.{toml,json}`)
/// 2. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("inkflow.toml"),
            cwd.join("inkflow.json"),
            cwd.join("config/inkflow.toml"),
            cwd.join("config/inkflow.json"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("inkflow.toml"),
                exe_dir.join("inkflow.json"),
                exe_dir.join("config/inkflow.toml"),
                exe_dir.join("config/inkflow.json"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Apply `INKFLOW_*` environment overrides to a base configuration
///
/// Variables that are unset leave the base value untouched.
///
/// # Errors
/// Returns `InkFlowError::Config` if a variable is set but does not parse.
fn apply_env_overrides(config: &mut OrchestratorConfig) -> Result<()> {
    if let Ok(raw) = std::env::var(ENV_PROVIDERS) {
        let requested: Vec<String> =
            raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
        for id in &requested {
            if config.provider(id).is_none() {
                tracing::warn!(provider = %id, "Provider override names an unknown provider");
            }
        }
        for provider in &mut config.providers {
            provider.enabled = requested.iter().any(|id| id == &provider.id);
        }
    }

    config.fallback_enabled = env_bool(ENV_FALLBACK_ENABLED, config.fallback_enabled);

    if let Some(value) = env_override(ENV_RETRY_MAX_ATTEMPTS)? {
        config.retry.max_attempts = value;
    }
    if let Some(value) = env_override(ENV_RETRY_INITIAL_DELAY_MS)? {
        config.retry.initial_delay_ms = value;
    }
    if let Some(value) = env_override(ENV_RETRY_BACKOFF_MULTIPLIER)? {
        config.retry.backoff_multiplier = value;
    }
    if let Some(value) = env_override(ENV_RETRY_MAX_DELAY_MS)? {
        config.retry.max_delay_ms = value;
    }
    if let Some(secs) = env_override::<u64>(ENV_RETRY_ATTEMPT_TIMEOUT_SECS)? {
        // Zero disables the per-attempt timeout.
        config.retry.attempt_timeout_secs = if secs == 0 { None } else { Some(secs) };
    }
    if let Some(value) = env_override(ENV_CACHE_CAPACITY)? {
        config.cache.capacity = value;
    }
    if let Some(value) = env_override(ENV_CACHE_TTL_SECS)? {
        config.cache.ttl_secs = value;
    }
    if let Some(value) = env_override(ENV_PROBE_INTERVAL_SECS)? {
        config.health.probe_interval_secs = value;
    }
    if let Some(value) = env_override(ENV_PROBE_TIMEOUT_SECS)? {
        config.health.probe_timeout_secs = value;
    }

    Ok(())
}

/// Fill in provider API keys from the environment variables the catalog
/// names. Keys already present (for example parsed from a file) are kept.
fn resolve_credentials(config: &mut OrchestratorConfig) {
    for provider in &mut config.providers {
        if provider.api_key.is_some() {
            continue;
        }
        if let Some(env_name) = &provider.api_key_env {
            if let Ok(key) = std::env::var(env_name) {
                if !key.trim().is_empty() {
                    tracing::debug!(provider = %provider.id, "API key resolved from environment");
                    provider.api_key = Some(key);
                }
            }
        }
    }
}

/// Parse an optional typed override from an environment variable
///
/// # Errors
/// Returns `InkFlowError::Config` if the variable is set but does not parse.
fn env_override<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| InkFlowError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Arguments
/// * `key` - Environment variable name
/// * `default` - Default value if variable is not set
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
