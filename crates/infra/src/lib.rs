//! # InkFlow Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (environment + TOML/JSON files)
//! - HTTP client shared by the provider adapters
//! - Provider adapters (completion transport, health probe, preference store)
//! - Background health monitor worker
//! - Telemetry sink backed by `tracing`
//!
//! ## Architecture
//! - Implements traits defined in `inkflow-core`
//! - Depends on `inkflow-common`, `inkflow-domain`, and `inkflow-core`
//! - Contains all "impure" code (I/O, HTTP, background tasks)

pub mod config;
pub mod errors;
pub mod health;
pub mod http;
pub mod providers;
pub mod telemetry;

// Re-export commonly used items
pub use errors::*;
pub use health::*;
pub use http::*;
pub use providers::*;
pub use telemetry::*;
