//! Health monitor error types

use inkflow_domain::InkFlowError;
use thiserror::Error;

use crate::errors::InfraError;

/// Monitor-specific errors
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Monitor is already running
    #[error("Health monitor already running")]
    AlreadyRunning,

    /// Monitor is not running
    #[error("Health monitor not running")]
    NotRunning,

    /// Shutdown timed out
    #[error("Health monitor did not stop within {seconds}s")]
    StopTimeout { seconds: u64 },

    /// Task join failed
    #[error("Health monitor task failed: {0}")]
    TaskJoinFailed(String),
}

impl From<MonitorError> for InfraError {
    fn from(err: MonitorError) -> Self {
        let domain_err = match err {
            MonitorError::AlreadyRunning | MonitorError::NotRunning => {
                InkFlowError::InvalidInput(err.to_string())
            }
            _ => InkFlowError::Internal(err.to_string()),
        };
        InfraError(domain_err)
    }
}

impl From<MonitorError> for InkFlowError {
    fn from(err: MonitorError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;
