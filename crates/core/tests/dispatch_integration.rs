//! Integration tests for the provider walk
//!
//! Exercises the orchestrator end to end with scripted transports: fallback
//! order, retry budgets per provider, fatal short-circuits, and the telemetry
//! emitted along the way.

mod support;

use std::sync::Arc;

use inkflow_core::{Orchestrator, ProviderTransport, TelemetrySink};
use inkflow_domain::{
    AttemptOutcome, DispatchError, OrchestratorConfig, ProviderError, ProviderPreferences,
};
use support::providers::{
    catalog, fast_retry, request, FixedPreferences, RecordingTelemetry, Script, ScriptedTransport,
};

fn network_error() -> ProviderError {
    ProviderError::Network("connection reset by peer".to_string())
}

fn server_error(provider: &str) -> ProviderError {
    ProviderError::Server {
        provider: provider.to_string(),
        status: 503,
        message: "service unavailable".to_string(),
    }
}

fn auth_error(provider: &str) -> ProviderError {
    ProviderError::Auth { provider: provider.to_string(), message: "bad key".to_string() }
}

fn harness(
    config: &OrchestratorConfig,
    transport: ScriptedTransport,
    preferences: Option<ProviderPreferences>,
) -> (Orchestrator, Arc<ScriptedTransport>, Arc<RecordingTelemetry>) {
    let transport = Arc::new(transport);
    let telemetry = Arc::new(RecordingTelemetry::new());
    let orchestrator = Orchestrator::new(
        config,
        Arc::new(FixedPreferences(preferences)),
        Arc::clone(&transport) as Arc<dyn ProviderTransport>,
        Arc::clone(&telemetry) as Arc<dyn TelemetrySink>,
    );
    (orchestrator, transport, telemetry)
}

/// Validates the walk stops at the first successful provider.
///
/// # Test Steps
/// 1. Configure three providers with a single-attempt retry budget
/// 2. Script the first provider to fail and the second to succeed
/// 3. Dispatch one generation task
/// 4. Confirm the response came from the second provider
/// 5. Confirm the third provider was never engaged
#[tokio::test(flavor = "multi_thread")]
async fn test_walk_stops_at_first_success() {
    let mut config = catalog(&["p1", "p2", "p3"]);
    config.retry = fast_retry(1);
    let transport = ScriptedTransport::new().with_script("p1", Script::Fail(network_error()));
    let (orchestrator, transport, _telemetry) = harness(&config, transport, None);

    let response = orchestrator.generate(None, request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p2");
    assert_eq!(transport.calls(), ["p1", "p2"]);
    assert_eq!(transport.call_count("p3"), 0);
}

/// Validates each failing provider consumes its full retry budget before the
/// walk falls through, and telemetry captures the final per-provider
/// outcomes.
///
/// # Test Steps
/// 1. Script two failing providers and a healthy third, 3 attempts each
/// 2. Dispatch one generation task
/// 3. Confirm 7 underlying calls in strict provider order (3 + 3 + 1)
/// 4. Confirm three telemetry records: failure, failure, success
/// 5. Confirm all records share one dispatch id
#[tokio::test(flavor = "multi_thread")]
async fn test_failing_providers_exhaust_retries_before_fallback() {
    let config = catalog(&["p1", "p2", "p3"]);
    let transport = ScriptedTransport::new()
        .with_script("p1", Script::Fail(network_error()))
        .with_script("p2", Script::Fail(server_error("p2")));
    let (orchestrator, transport, telemetry) = harness(&config, transport, None);

    let response = orchestrator.generate(None, request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p3");
    assert_eq!(transport.total_calls(), 7);
    assert_eq!(
        transport.calls(),
        ["p1", "p1", "p1", "p2", "p2", "p2", "p3"]
    );

    let records = telemetry.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].provider_id, "p1");
    assert_eq!(records[0].outcome, AttemptOutcome::Failure);
    assert_eq!(records[0].attempts, 3);
    assert_eq!(records[1].provider_id, "p2");
    assert_eq!(records[1].outcome, AttemptOutcome::Failure);
    assert_eq!(records[1].attempts, 3);
    assert_eq!(records[2].provider_id, "p3");
    assert_eq!(records[2].outcome, AttemptOutcome::Success);
    assert_eq!(records[2].attempts, 1);

    assert!(records.iter().all(|r| r.dispatch_id == records[0].dispatch_id));
    assert!(records.iter().all(|r| r.operation == "outline"));
}

/// Validates a disabled fallback confines the walk to the first provider.
///
/// # Test Steps
/// 1. Disable fallback at the environment level
/// 2. Script the first provider to fail persistently
/// 3. Confirm the dispatch exhausts after that provider alone
/// 4. Confirm its retry budget was still honored
#[tokio::test(flavor = "multi_thread")]
async fn test_fallback_disabled_stops_after_first_provider() {
    let mut config = catalog(&["p1", "p2"]);
    config.fallback_enabled = false;
    let transport = ScriptedTransport::new().with_script("p1", Script::Fail(network_error()));
    let (orchestrator, transport, telemetry) = harness(&config, transport, None);

    let error = orchestrator.generate(None, request("outline")).await.unwrap_err();

    match error {
        DispatchError::Exhausted { attempted, .. } => assert_eq!(attempted, ["p1"]),
        other => panic!("expected exhausted, got {other:?}"),
    }
    assert_eq!(transport.call_count("p1"), 3);
    assert_eq!(transport.call_count("p2"), 0);
    assert_eq!(telemetry.records().len(), 1);
}

/// Validates a fatal error ends a provider's engagement on the first call.
///
/// # Test Steps
/// 1. Script the first provider to fail with an authentication error
/// 2. Confirm it is called exactly once despite a 3-attempt budget
/// 3. Confirm the walk still falls through to the next provider
#[tokio::test(flavor = "multi_thread")]
async fn test_fatal_error_consumes_single_call() {
    let config = catalog(&["p1", "p2"]);
    let transport = ScriptedTransport::new().with_script("p1", Script::Fail(auth_error("p1")));
    let (orchestrator, transport, telemetry) = harness(&config, transport, None);

    let response = orchestrator.generate(None, request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p2");
    assert_eq!(transport.call_count("p1"), 1);

    let records = telemetry.records();
    assert_eq!(records[0].attempts, 1);
    let error = records[0].error.as_deref().unwrap();
    assert!(error.contains("authentication rejected"));
}

/// Validates an empty candidate list is rejected before any provider work.
#[tokio::test(flavor = "multi_thread")]
async fn test_no_enabled_providers_rejected_up_front() {
    let config = catalog(&[]);
    let (orchestrator, transport, telemetry) = harness(&config, ScriptedTransport::new(), None);

    let error = orchestrator.generate(None, request("outline")).await.unwrap_err();

    assert!(matches!(error, DispatchError::NoProvidersEnabled { .. }));
    assert_eq!(transport.total_calls(), 0);
    assert!(telemetry.records().is_empty());
}

/// Validates stored user preferences reorder the walk.
///
/// # Test Steps
/// 1. Store preferences putting the last catalog provider first
/// 2. Dispatch with that user's identity
/// 3. Confirm the preferred provider serves the response directly
#[tokio::test(flavor = "multi_thread")]
async fn test_user_order_overrides_environment() {
    let config = catalog(&["p1", "p2", "p3"]);
    let preferences = ProviderPreferences {
        provider_order: vec!["p3".to_string(), "p1".to_string()],
        auto_fallback: true,
    };
    let (orchestrator, transport, _telemetry) =
        harness(&config, ScriptedTransport::new(), Some(preferences));

    let response = orchestrator.generate(Some("writer-7"), request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p3");
    assert_eq!(transport.calls(), ["p3"]);
}

/// Validates preferred ids outside the enabled catalog are skipped.
#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_preferred_ids_are_filtered() {
    let config = catalog(&["p1", "p2"]);
    let preferences = ProviderPreferences {
        provider_order: vec!["ghost".to_string(), "p2".to_string()],
        auto_fallback: true,
    };
    let (orchestrator, transport, _telemetry) =
        harness(&config, ScriptedTransport::new(), Some(preferences));

    let response = orchestrator.generate(Some("writer-7"), request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p2");
    assert_eq!(transport.calls(), ["p2"]);
}

/// Validates the exhausted error carries the most recent provider failure
/// and every attempted id in walk order.
///
/// # Test Steps
/// 1. Script all three providers to fail with distinct errors
/// 2. Make the middle failure fatal to vary the per-provider call counts
/// 3. Confirm the surfaced source is the last provider's error
#[tokio::test(flavor = "multi_thread")]
async fn test_exhausted_error_carries_most_recent_failure() {
    let config = catalog(&["p1", "p2", "p3"]);
    let transport = ScriptedTransport::new()
        .with_script("p1", Script::Fail(network_error()))
        .with_script("p2", Script::Fail(auth_error("p2")))
        .with_script("p3", Script::Fail(ProviderError::RateLimited { retry_after_secs: Some(30) }));
    let (orchestrator, transport, _telemetry) = harness(&config, transport, None);

    let error = orchestrator.generate(None, request("outline")).await.unwrap_err();

    match error {
        DispatchError::Exhausted { attempted, source, .. } => {
            assert_eq!(attempted, ["p1", "p2", "p3"]);
            assert!(matches!(source, ProviderError::RateLimited { .. }));
        }
        other => panic!("expected exhausted, got {other:?}"),
    }
    // 3 transient retries + 1 fatal call + 3 transient retries
    assert_eq!(transport.total_calls(), 7);
}

/// Validates a provider that recovers within its own retry budget wins
/// without any fallback.
#[tokio::test(flavor = "multi_thread")]
async fn test_recovery_within_retry_budget_avoids_fallback() {
    let config = catalog(&["p1", "p2"]);
    let transport = ScriptedTransport::new()
        .with_script("p1", Script::FailThenSucceed { failures: 2, error: network_error() });
    let (orchestrator, transport, telemetry) = harness(&config, transport, None);

    let response = orchestrator.generate(None, request("outline")).await.unwrap();

    assert_eq!(response.provider_id, "p1");
    assert_eq!(transport.calls(), ["p1", "p1", "p1"]);
    assert_eq!(transport.call_count("p2"), 0);

    let records = telemetry.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, AttemptOutcome::Success);
    assert_eq!(records[0].attempts, 3);
}

/// Validates each dispatch call gets its own correlation id.
#[tokio::test(flavor = "multi_thread")]
async fn test_each_dispatch_gets_distinct_id() {
    let config = catalog(&["p1"]);
    let (orchestrator, _transport, telemetry) = harness(&config, ScriptedTransport::new(), None);

    orchestrator.generate(None, request("outline")).await.unwrap();
    orchestrator.generate(None, request("style_score")).await.unwrap();

    let records = telemetry.records();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].dispatch_id, records[1].dispatch_id);
    assert_eq!(records[1].operation, "style_score");
}
