//! # InkFlow Domain
//!
//! Business domain types and models for the InkFlow AI orchestration core.
//!
//! This crate contains:
//! - Domain data types (Provider, OperationContext, health records)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and models
//!
//! ## Architecture
//! - No dependencies on other InkFlow crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
