//! Example: One generation request through the fallback dispatcher
//!
//! This example wires the orchestrator against the configured provider
//! catalog, runs a single continuation request, and prints the first health
//! probe round.
//!
//! # Setup
//!
//! 1. Export an API key for at least one enabled provider: ```bash export
//!    INKFLOW_OPENAI_API_KEY=sk-... ```
//!
//! 2. Optionally narrow the catalog: ```bash export
//!    INKFLOW_PROVIDERS=openai ```
//!
//! 3. Run this example: ```bash cargo run --example generate ```

use std::sync::Arc;
use std::time::Duration;

use inkflow_core::Orchestrator;
use inkflow_domain::{GenerationRequest, OperationContext};
use inkflow_infra::config;
use inkflow_infra::health::HealthMonitor;
use inkflow_infra::http::HttpClient;
use inkflow_infra::providers::{HttpProviderProbe, HttpProviderTransport, StaticPreferenceStore};
use inkflow_infra::telemetry::TracingTelemetrySink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("InkFlow Generation Example");
    println!("==========================\n");

    let mut config = config::load()?;
    // Short probe interval so the demo sees a health round before it exits
    config.health.probe_interval_secs = 2;

    let enabled = config.enabled_providers();
    println!("✓ Configuration loaded, {} provider(s) enabled:", enabled.len());
    for provider in &enabled {
        println!("  {} (priority {}, model {})", provider.id, provider.priority, provider.model);
    }
    println!();

    let http_client = HttpClient::builder().timeout(Duration::from_secs(60)).build()?;
    let transport = HttpProviderTransport::new(http_client.clone(), &config);
    let orchestrator = Orchestrator::new(
        &config,
        Arc::new(StaticPreferenceStore::new()),
        Arc::new(transport),
        Arc::new(TracingTelemetrySink::new()),
    );

    let probe = HttpProviderProbe::new(http_client, &config);
    let mut monitor =
        HealthMonitor::new(&config.health, enabled, Arc::new(probe), orchestrator.health_tracker());
    monitor.start().await?;

    let request = GenerationRequest {
        operation: "continuation".to_string(),
        context: OperationContext {
            prompt: "Continue the scene: the lighthouse keeper finds the door ajar.".to_string(),
            synopsis: Some("A keeper on a remote island guards more than the light.".to_string()),
            ..OperationContext::default()
        },
        max_tokens: Some(256),
        temperature: Some(0.8),
    };

    println!("📝 Dispatching a continuation request...\n");
    match orchestrator.generate(None, request).await {
        Ok(response) => {
            println!("✓ Generation succeeded");
            println!("  Provider: {}", response.provider_id);
            println!("  Model:    {}", response.model);
            if let (Some(prompt), Some(completion)) =
                (response.prompt_tokens, response.completion_tokens)
            {
                println!("  Tokens:   {} prompt / {} completion", prompt, completion);
            }
            println!("\n{}\n", response.text);
        }
        Err(e) => {
            println!("✗ Generation failed: {}\n", e);
        }
    }

    // Give the monitor time for its first probe round
    tokio::time::sleep(Duration::from_secs(3)).await;

    println!("🩺 Provider health after the first probe round:");
    for record in orchestrator.provider_statuses() {
        println!(
            "  {:<10} {:?} (avg {}ms, success rate {:.0}%, models {:?})",
            record.provider_id,
            record.status,
            record.avg_latency_ms,
            record.success_rate * 100.0,
            record.model_count,
        );
    }

    monitor.stop().await?;
    Ok(())
}
