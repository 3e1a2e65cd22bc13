//! Background health monitoring
//!
//! The monitor owns the probe schedule and shutdown mechanics; sample
//! classification lives in `inkflow_core::HealthTracker`.

pub mod error;
pub mod monitor;

// Re-export commonly used items
pub use error::{MonitorError, MonitorResult};
pub use monitor::HealthMonitor;
