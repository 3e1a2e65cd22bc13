//! Provider resolution - choosing the candidate order per call

pub mod ports;

use std::sync::Arc;

use inkflow_domain::{
    OrchestratorConfig, Provider, ProviderPreferences, ResolutionSource, ResolvedProviders,
};
use tracing::{debug, warn};

pub use ports::PreferenceStore;

/// Decides, per call, the ordered candidate list and the fallback toggle.
///
/// The enabled catalog and the environment fallback flag are captured at
/// construction; only the per-user preference lookup happens per call.
pub struct ProviderResolver {
    /// Enabled catalog providers in environment order.
    catalog: Vec<Provider>,
    fallback_enabled: bool,
    preferences: Arc<dyn PreferenceStore>,
}

impl ProviderResolver {
    pub fn new(config: &OrchestratorConfig, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            catalog: config.enabled_providers(),
            fallback_enabled: config.fallback_enabled,
            preferences,
        }
    }

    /// Resolve the candidate order for one dispatch call.
    ///
    /// With a caller identity and usable stored preferences, the user's order
    /// (filtered to enabled providers) and their fallback toggle win.
    /// Everything else degrades to the environment order: missing identity,
    /// no stored preferences, an order that matches no enabled provider, or a
    /// lookup failure. A lookup failure is logged at `warn` and never
    /// propagates; the returned list may be empty when no provider is
    /// enabled, which callers must reject themselves.
    pub async fn resolve(&self, user_id: Option<&str>) -> ResolvedProviders {
        let Some(user_id) = user_id else {
            return self.environment_order();
        };

        match self.preferences.load_preferences(user_id).await {
            Ok(Some(preferences)) => self.apply_preferences(user_id, &preferences),
            Ok(None) => {
                debug!(user_id, "no stored preferences, using environment order");
                self.environment_order()
            }
            Err(error) => {
                warn!(user_id, error = %error, "preference lookup failed, using environment order");
                self.environment_order()
            }
        }
    }

    /// Filter the user's order down to the enabled catalog.
    ///
    /// Unknown and disabled ids are dropped, as are duplicates (first
    /// occurrence wins). The user's fallback toggle applies only when at
    /// least one preferred provider survives filtering.
    fn apply_preferences(
        &self,
        user_id: &str,
        preferences: &ProviderPreferences,
    ) -> ResolvedProviders {
        let mut providers: Vec<Provider> = Vec::new();
        for id in &preferences.provider_order {
            if providers.iter().any(|p| &p.id == id) {
                continue;
            }
            if let Some(provider) = self.catalog.iter().find(|p| &p.id == id) {
                providers.push(provider.clone());
            }
        }

        if providers.is_empty() {
            debug!(user_id, "preference order matches no enabled provider, using environment order");
            return self.environment_order();
        }

        ResolvedProviders {
            providers,
            allow_fallback: preferences.auto_fallback,
            source: ResolutionSource::UserPreference,
        }
    }

    fn environment_order(&self) -> ResolvedProviders {
        ResolvedProviders {
            providers: self.catalog.clone(),
            allow_fallback: self.fallback_enabled,
            source: ResolutionSource::Environment,
        }
    }
}
