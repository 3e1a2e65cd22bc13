//! Error types used throughout the orchestration core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for InkFlow
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum InkFlowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for InkFlow operations
pub type Result<T> = std::result::Result<T, InkFlowError>;

/// Failure of a single call against one provider.
///
/// The `Display` text of every variant is stable: the retry layer classifies
/// errors by message content, so the wording here is part of the contract.
/// Timeouts must render with "timed out" so callers can match on it.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderError {
    #[error("request '{operation}' timed out after {elapsed_ms}ms")]
    Timeout { operation: String, elapsed_ms: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limit exceeded{}", .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("provider '{provider}' server error {status}: {message}")]
    Server { provider: String, status: u16, message: String },

    #[error("authentication rejected by '{provider}': {message}")]
    Auth { provider: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response payload: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Typed transience classification.
    ///
    /// The retry layer's default predicate matches on message substrings for
    /// compatibility with upstream callers; this method is the typed
    /// equivalent and the two must agree for every variant.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Network(_) | Self::RateLimited { .. } | Self::Server { .. }
        )
    }
}

/// Terminal outcome of a dispatch call that produced no success.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// The resolver returned an empty provider list. Nothing was attempted.
    #[error("no providers are enabled; cannot dispatch '{operation}'")]
    NoProvidersEnabled { operation: String },

    /// Every resolved provider was attempted and failed; carries the most
    /// recent provider error and the attempted ids in order.
    #[error("all providers failed for '{operation}' (attempted: {})", .attempted.join(", "))]
    Exhausted {
        operation: String,
        attempted: Vec<String>,
        #[source]
        source: ProviderError,
    },
}

impl DispatchError {
    /// Provider ids attempted before this error, in dispatch order.
    #[must_use]
    pub fn attempted(&self) -> &[String] {
        match self {
            Self::NoProvidersEnabled { .. } => &[],
            Self::Exhausted { attempted, .. } => attempted,
        }
    }
}

impl From<DispatchError> for InkFlowError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoProvidersEnabled { .. } => Self::Config(err.to_string()),
            DispatchError::Exhausted { .. } => Self::Provider(err.to_string()),
        }
    }
}
