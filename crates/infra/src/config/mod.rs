//! Configuration loading and management
//!
//! This module provides utilities for loading orchestrator configuration
//! from environment variables and files, and for validating the resulting
//! provider catalog before anything is wired up.

pub mod loader;

use inkflow_domain::{InkFlowError, OrchestratorConfig, Result};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

/// Validate a loaded configuration.
///
/// Rejects catalogs the orchestrator cannot serve: every provider disabled,
/// or an enabled provider whose declared credential source resolved to
/// nothing. Providers without an `api_key_env` are assumed to need no
/// credential (local endpoints).
///
/// # Errors
/// Returns `InkFlowError::Config` describing the first violation found.
pub fn validate(config: &OrchestratorConfig) -> Result<()> {
    if config.enabled_providers().is_empty() {
        return Err(InkFlowError::Config(
            "no providers are enabled; enable at least one catalog entry".to_string(),
        ));
    }

    for provider in config.providers.iter().filter(|p| p.enabled) {
        if provider.api_key.is_none() {
            if let Some(env_name) = &provider.api_key_env {
                return Err(InkFlowError::Config(format!(
                    "provider '{}' is enabled but its credential is missing; set {}",
                    provider.id, env_name
                )));
            }
        }
    }

    Ok(())
}
