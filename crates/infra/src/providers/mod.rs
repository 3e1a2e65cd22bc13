//! Provider-facing HTTP adapters
//!
//! Implementations of the `inkflow-core` ports against the OpenAI-compatible
//! provider surface and the writing app backend:
//! - `HttpProviderTransport` - chat completion calls
//! - `HttpProviderProbe` - model listing health probes
//! - `HttpPreferenceStore` / `StaticPreferenceStore` - per-user preferences

pub mod preferences;
pub mod probe;
pub mod transport;

pub(crate) mod types;

// Re-export commonly used items
pub use preferences::{HttpPreferenceStore, StaticPreferenceStore};
pub use probe::HttpProviderProbe;
pub use transport::HttpProviderTransport;
