//! Background health monitor for the provider catalog.
//!
//! Runs one probe sweep per interval against every enabled provider and
//! feeds the samples into the shared [`HealthTracker`]. Lifecycle follows
//! explicit start/stop with a cancellation token and a join timeout on
//! shutdown; classification itself lives in `inkflow-core`.

use std::sync::Arc;
use std::time::Duration;

use inkflow_core::{HealthTracker, ProviderProbe};
use inkflow_domain::{HealthSample, HealthSettings, Provider};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::error::{MonitorError, MonitorResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Context for the probe loop to avoid too many arguments (clippy)
struct ProbeLoopContext {
    providers: Vec<Provider>,
    probe: Arc<dyn ProviderProbe>,
    tracker: Arc<HealthTracker>,
    probe_timeout: Duration,
}

/// Periodic health prober with explicit lifecycle management.
pub struct HealthMonitor {
    providers: Vec<Provider>,
    probe: Arc<dyn ProviderProbe>,
    tracker: Arc<HealthTracker>,
    interval: Duration,
    probe_timeout: Duration,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl HealthMonitor {
    /// Create a new monitor over the given providers.
    ///
    /// # Arguments
    ///
    /// * `settings` - Probe interval and timeout
    /// * `providers` - Providers to sweep, usually the enabled catalog
    /// * `probe` - Probe implementation
    /// * `tracker` - Shared tracker receiving the samples
    pub fn new(
        settings: &HealthSettings,
        providers: Vec<Provider>,
        probe: Arc<dyn ProviderProbe>,
        tracker: Arc<HealthTracker>,
    ) -> Self {
        Self {
            providers,
            probe,
            tracker,
            interval: settings.probe_interval(),
            probe_timeout: settings.probe_timeout(),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the monitor.
    ///
    /// Spawns a background task that probes every provider once per
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns error if the monitor is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> MonitorResult<()> {
        if self.is_running() {
            return Err(MonitorError::AlreadyRunning);
        }

        info!(providers = self.providers.len(), "Starting health monitor");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let context = ProbeLoopContext {
            providers: self.providers.clone(),
            probe: Arc::clone(&self.probe),
            tracker: Arc::clone(&self.tracker),
            probe_timeout: self.probe_timeout,
        };
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            probe_loop(context, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Health monitor started");

        Ok(())
    }

    /// Stop the monitor gracefully.
    ///
    /// Cancels the background task and awaits completion.
    ///
    /// # Errors
    ///
    /// Returns error if the monitor is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> MonitorResult<()> {
        if !self.is_running() {
            return Err(MonitorError::NotRunning);
        }

        info!("Stopping health monitor");

        // Cancel background task
        self.cancellation_token.cancel();

        // Await handle with timeout
        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| MonitorError::StopTimeout { seconds: join_timeout.as_secs() })?
                .map_err(|err| MonitorError::TaskJoinFailed(err.to_string()))?;
        }

        info!("Health monitor stopped");

        Ok(())
    }

    /// Check if the monitor is running.
    ///
    /// The monitor is considered running if it has an active task handle
    /// that hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

/// Background probe loop
async fn probe_loop(context: ProbeLoopContext, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Probe loop cancelled");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                probe_all(&context).await;
            }
        }
    }
}

/// Probe every provider once and record the samples.
///
/// A probe that exceeds the configured timeout is recorded as a failed
/// sample with the timeout as its latency, so a hanging provider degrades
/// instead of stalling the sweep forever.
async fn probe_all(context: &ProbeLoopContext) {
    for provider in &context.providers {
        let sample =
            match tokio::time::timeout(context.probe_timeout, context.probe.probe(provider)).await
            {
                Ok(sample) => sample,
                Err(_) => {
                    debug!(provider = %provider.id, "Probe timed out");
                    HealthSample::failure(context.probe_timeout.as_millis() as u64)
                }
            };

        context.tracker.record_sample(&provider.id, sample);
    }
}

/// Ensure the monitor is stopped when dropped
impl Drop for HealthMonitor {
    fn drop(&mut self) {
        // Drop cannot await the task handle; a contended lock is treated as
        // a running task so cancellation is never skipped.
        let has_task = self.task_handle.try_lock().map_or(true, |guard| guard.is_some());
        if has_task && !self.cancellation_token.is_cancelled() {
            warn!("HealthMonitor dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
