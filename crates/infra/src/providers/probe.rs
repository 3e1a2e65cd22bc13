//! Health probe against the provider model listing endpoint.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use inkflow_core::ProviderProbe;
use inkflow_domain::{HealthSample, OrchestratorConfig, Provider};
use reqwest::Method;
use tracing::debug;

use crate::http::HttpClient;

use super::types::ModelListResponse;

/// Probe that issues `GET {endpoint}/models` and measures round-trip latency.
///
/// Probes never fail: every outcome becomes a [`HealthSample`] so the tracker
/// sees rejected and unreachable providers as failed samples rather than
/// gaps in the window.
pub struct HttpProviderProbe {
    http_client: HttpClient,
    credentials: HashMap<String, String>,
}

impl HttpProviderProbe {
    /// Create a probe holding the credentials resolved at config load.
    pub fn new(http_client: HttpClient, config: &OrchestratorConfig) -> Self {
        let credentials = config
            .providers
            .iter()
            .filter_map(|p| p.api_key.clone().map(|key| (p.id.clone(), key)))
            .collect();

        Self { http_client, credentials }
    }

    fn models_url(provider: &Provider) -> String {
        format!("{}/models", provider.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProviderProbe for HttpProviderProbe {
    async fn probe(&self, provider: &Provider) -> HealthSample {
        let url = Self::models_url(provider);
        let mut builder = self.http_client.request(Method::GET, &url);

        if let Some(key) = self.credentials.get(&provider.id) {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let started = Instant::now();
        let result = self.http_client.send(builder).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.status().is_success() => {
                // A 2xx with an unreadable body still counts as healthy;
                // the model count is just unavailable.
                let model_count =
                    response.json::<ModelListResponse>().await.ok().map(|list| list.data.len());
                HealthSample::success(latency_ms, model_count)
            }
            Ok(response) => {
                debug!(
                    provider = %provider.id,
                    status = response.status().as_u16(),
                    latency_ms,
                    "health probe rejected"
                );
                HealthSample::failure(latency_ms)
            }
            Err(err) => {
                debug!(provider = %provider.id, error = %err, latency_ms, "health probe failed");
                HealthSample::failure(latency_ms)
            }
        }
    }
}
