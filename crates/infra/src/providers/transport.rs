//! Chat completion transport for OpenAI-compatible providers.
//!
//! Every catalog provider (OpenAI, Anthropic via its compatibility surface,
//! Mistral) speaks the same `/chat/completions` wire shape, so one transport
//! serves all of them. Per-provider differences are limited to endpoint,
//! model slug and credential.

use std::collections::HashMap;

use async_trait::async_trait;
use inkflow_core::ProviderTransport;
use inkflow_domain::{
    GenerationRequest, GenerationResponse, InkFlowError, OperationContext, OrchestratorConfig,
    Provider, ProviderError,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, Response, StatusCode};
use tracing::debug;

use crate::http::HttpClient;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Transport that runs generation tasks over HTTP.
pub struct HttpProviderTransport {
    http_client: HttpClient,
    /// Resolved API key per provider id. Providers without an entry are
    /// called without an `Authorization` header (local endpoints).
    credentials: HashMap<String, String>,
}

impl HttpProviderTransport {
    /// Create a transport holding the credentials resolved at config load.
    pub fn new(http_client: HttpClient, config: &OrchestratorConfig) -> Self {
        let credentials = config
            .providers
            .iter()
            .filter_map(|p| p.api_key.clone().map(|key| (p.id.clone(), key)))
            .collect();

        Self { http_client, credentials }
    }

    fn completions_url(provider: &Provider) -> String {
        format!("{}/chat/completions", provider.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProviderTransport for HttpProviderTransport {
    async fn generate(
        &self,
        provider: &Provider,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let payload = ChatCompletionRequest {
            model: provider.model.clone(),
            messages: build_messages(&request.context),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = Self::completions_url(provider);
        let mut builder = self
            .http_client
            .request(Method::POST, &url)
            .header("Content-Type", "application/json")
            .json(&payload);

        if let Some(key) = self.credentials.get(&provider.id) {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = self.http_client.send(builder).await.map_err(|err| match err {
            InkFlowError::Network(msg) => ProviderError::Network(msg),
            other => ProviderError::Network(format!("HTTP error: {}", other)),
        })?;

        let status = response.status();
        debug!(
            provider = %provider.id,
            operation = %request.operation,
            status = status.as_u16(),
            "received completion response"
        );

        if !status.is_success() {
            return Err(status_error(provider, status, response).await);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|err| {
            ProviderError::InvalidResponse(format!("malformed completion payload: {}", err))
        })?;

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("completion contained no choices".to_string())
        })?;

        let (prompt_tokens, completion_tokens) = completion
            .usage
            .map(|usage| (usage.prompt_tokens, usage.completion_tokens))
            .unwrap_or((None, None));

        Ok(GenerationResponse {
            provider_id: provider.id.clone(),
            model: completion.model.unwrap_or_else(|| provider.model.clone()),
            text: choice.message.content,
            prompt_tokens,
            completion_tokens,
        })
    }
}

/// Map a non-success status to the provider error the dispatch layer
/// classifies on.
async fn status_error(provider: &Provider, status: StatusCode, response: Response) -> ProviderError {
    let retry_after_secs = retry_after(&response);
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() { status.to_string() } else { body };

    match status.as_u16() {
        401 | 403 => ProviderError::Auth { provider: provider.id.clone(), message },
        429 => ProviderError::RateLimited { retry_after_secs },
        400 | 422 => ProviderError::InvalidRequest(message),
        500..=599 => ProviderError::Server {
            provider: provider.id.clone(),
            status: status.as_u16(),
            message,
        },
        _ => ProviderError::InvalidRequest(format!(
            "unexpected status {}: {}",
            status.as_u16(),
            message
        )),
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Flatten the story context into chat messages.
///
/// Synopsis and notes become one system message; the prompt itself is the
/// user message. A context with nothing beyond the prompt produces no system
/// message at all.
fn build_messages(context: &OperationContext) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);

    let briefing = build_briefing(context);
    if !briefing.is_empty() {
        messages.push(ChatMessage { role: "system".to_string(), content: briefing });
    }

    messages.push(ChatMessage { role: "user".to_string(), content: context.prompt.clone() });
    messages
}

fn build_briefing(context: &OperationContext) -> String {
    let mut briefing = String::new();

    if let Some(synopsis) = &context.synopsis {
        briefing.push_str("Story synopsis:\n");
        briefing.push_str(synopsis);
        briefing.push('\n');
    }

    if !context.character_notes.is_empty() {
        briefing.push_str("\nCharacter notes:\n");
        for note in &context.character_notes {
            briefing.push_str(&format!("- {}\n", note));
        }
    }

    if !context.world_notes.is_empty() {
        briefing.push_str("\nWorld notes:\n");
        for note in &context.world_notes {
            briefing.push_str(&format!("- {}\n", note));
        }
    }

    if !context.recent_passages.is_empty() {
        briefing.push_str("\nRecent passages:\n");
        for passage in &context.recent_passages {
            briefing.push_str(passage);
            briefing.push_str("\n\n");
        }
    }

    briefing.trim_end().to_string()
}
