//! Error conversion boundary between external crates and the domain
//!
//! External error types (reqwest, etc.) never cross into `inkflow-core` or
//! `inkflow-domain`. This module converts them into `InkFlowError` at the
//! infrastructure edge.

pub mod conversions;

// Re-export commonly used items
pub use conversions::InfraError;
