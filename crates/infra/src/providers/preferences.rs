//! Preference lookup against the writing app backend.

use std::collections::HashMap;

use async_trait::async_trait;
use inkflow_core::PreferenceStore;
use inkflow_domain::{InkFlowError, ProviderPreferences, Result};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::errors::InfraError;
use crate::http::HttpClient;

use super::types::PreferencesPayload;

/// Store that fetches per-user preferences from the backend.
///
/// A 404 means the user has never saved preferences; that is a normal
/// outcome, not an error. Transport failures and other statuses surface as
/// errors so the resolver can log the degradation.
pub struct HttpPreferenceStore {
    http_client: HttpClient,
    base_url: String,
}

impl HttpPreferenceStore {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { http_client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn preferences_url(&self, user_id: &str) -> String {
        format!("{}/api/users/{}/ai-preferences", self.base_url, user_id)
    }
}

#[async_trait]
impl PreferenceStore for HttpPreferenceStore {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<ProviderPreferences>> {
        let url = self.preferences_url(user_id);
        let response = self.http_client.send(self.http_client.request(Method::GET, &url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(user_id, "no stored provider preferences");
            return Ok(None);
        }

        let response = response.error_for_status().map_err(|err| {
            let infra: InfraError = err.into();
            InkFlowError::from(infra)
        })?;

        let payload: PreferencesPayload = response.json().await.map_err(|err| {
            InkFlowError::Internal(format!("malformed preferences payload: {}", err))
        })?;

        Ok(Some(ProviderPreferences {
            provider_order: payload.provider_order,
            auto_fallback: payload.auto_fallback,
        }))
    }
}

/// In-memory store for embedded callers and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPreferenceStore {
    entries: HashMap<String, ProviderPreferences>,
}

impl StaticPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stored preferences for one user.
    #[must_use]
    pub fn with_user(
        mut self,
        user_id: impl Into<String>,
        preferences: ProviderPreferences,
    ) -> Self {
        self.entries.insert(user_id.into(), preferences);
        self
    }
}

#[async_trait]
impl PreferenceStore for StaticPreferenceStore {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<ProviderPreferences>> {
        Ok(self.entries.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_store(base_url: &str) -> HttpPreferenceStore {
        HttpPreferenceStore::new(HttpClient::new().unwrap(), base_url)
    }

    #[tokio::test]
    async fn loads_stored_preferences() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/user-7/ai-preferences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "providerOrder": ["anthropic", "openai"],
                "autoFallback": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = test_store(&mock_server.uri());
        let preferences = store.load_preferences("user-7").await.expect("should load");

        let preferences = preferences.expect("preferences present");
        assert_eq!(preferences.provider_order, vec!["anthropic", "openai"]);
        assert!(preferences.auto_fallback);
    }

    #[tokio::test]
    async fn missing_preferences_map_to_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/new-user/ai-preferences"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let store = test_store(&mock_server.uri());
        let preferences = store.load_preferences("new-user").await.expect("should load");

        assert!(preferences.is_none());
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let store = test_store(&mock_server.uri());
        let result = store.load_preferences("user-7").await;

        assert!(matches!(result, Err(InkFlowError::Network(_))));
    }

    #[tokio::test]
    async fn malformed_payload_surfaces_as_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let store = test_store(&mock_server.uri());
        let result = store.load_preferences("user-7").await;

        assert!(matches!(result, Err(InkFlowError::Internal(_))));
    }

    #[tokio::test]
    async fn static_store_returns_configured_entries() {
        let preferences = ProviderPreferences {
            provider_order: vec!["mistral".to_string()],
            auto_fallback: false,
        };
        let store = StaticPreferenceStore::new().with_user("writer", preferences.clone());

        assert_eq!(store.load_preferences("writer").await.unwrap(), Some(preferences));
        assert_eq!(store.load_preferences("stranger").await.unwrap(), None);
    }
}
