//! Port interfaces for preference resolution

use async_trait::async_trait;
use inkflow_domain::{ProviderPreferences, Result};

/// Trait for loading stored per-user provider preferences.
///
/// Lookups may fail or find nothing. The resolver degrades both cases to the
/// environment defaults, so implementations should surface real failures as
/// errors rather than mapping them to `None`.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load stored preferences for `user_id`; `None` when the user has none.
    async fn load_preferences(&self, user_id: &str) -> Result<Option<ProviderPreferences>>;
}
