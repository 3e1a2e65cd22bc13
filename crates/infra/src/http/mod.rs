//! Shared HTTP client construction
//!
//! One reqwest client is built at startup and cloned into every adapter so
//! connection pools are shared across providers.

pub mod client;

// Re-export commonly used items
pub use client::{HttpClient, HttpClientBuilder};
