//! Provider health tracking
//!
//! The tracker owns the per-provider status table: a rolling window of probe
//! samples per provider plus the threshold classification derived from it.
//! Probing itself is an infrastructure concern; the background worker feeds
//! samples in through [`HealthTracker::record_sample`] while dispatch and
//! status displays read cloned snapshots concurrently.

pub mod ports;

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use inkflow_domain::{HealthSample, HealthSettings, HealthStatus, ProviderHealthRecord};
use parking_lot::RwLock;
use tracing::{info, warn};

pub use ports::ProviderProbe;

/// Rolling sample window for one provider.
#[derive(Debug, Default)]
struct ProviderWindow {
    samples: VecDeque<HealthSample>,
    /// Most recently advertised model count, carried across failed probes.
    model_count: Option<usize>,
    last_probe: Option<DateTime<Utc>>,
}

impl ProviderWindow {
    fn push(&mut self, sample: HealthSample, window_size: usize) {
        self.samples.push_back(sample);
        while self.samples.len() > window_size {
            self.samples.pop_front();
        }
        if sample.model_count.is_some() {
            self.model_count = sample.model_count;
        }
        self.last_probe = Some(Utc::now());
    }

    fn success_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let successes = self.samples.iter().filter(|s| s.success).count();
        successes as f64 / self.samples.len() as f64
    }

    fn avg_latency_ms(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        self.samples.iter().map(|s| s.latency_ms).sum::<u64>() / self.samples.len() as u64
    }

    /// Whether the two most recent probes both failed.
    fn consecutive_recent_failures(&self) -> bool {
        let mut recent = self.samples.iter().rev().take(2);
        matches!((recent.next(), recent.next()), (Some(a), Some(b)) if !a.success && !b.success)
    }
}

/// Threshold classification over rolling probe windows.
///
/// Old samples decay out of the fixed-size window, so a provider that
/// recovers is reclassified without manual reset. Reads and writes share one
/// `RwLock`; readers always receive cloned records, never references into the
/// table.
pub struct HealthTracker {
    window_size: usize,
    degraded_success_rate: f64,
    degraded_latency_ms: u64,
    table: RwLock<BTreeMap<String, ProviderWindow>>,
}

impl HealthTracker {
    /// Tracker pre-seeded with the catalog ids so status displays list every
    /// provider as `unknown` before the first probe lands.
    pub fn new(settings: &HealthSettings, provider_ids: impl IntoIterator<Item = String>) -> Self {
        let table = provider_ids.into_iter().map(|id| (id, ProviderWindow::default())).collect();
        Self {
            window_size: settings.window_size.max(1),
            degraded_success_rate: settings.degraded_success_rate,
            degraded_latency_ms: settings.degraded_latency_ms,
            table: RwLock::new(table),
        }
    }

    /// Record one probe outcome for `provider_id`.
    ///
    /// Providers outside the seeded catalog get a window on first contact.
    /// Status transitions are logged here, where both the old and the new
    /// classification are known.
    pub fn record_sample(&self, provider_id: &str, sample: HealthSample) {
        let mut table = self.table.write();
        let window = table.entry(provider_id.to_string()).or_default();
        let previous = self.classify(window);
        window.push(sample, self.window_size);
        let current = self.classify(window);

        if previous != current {
            if matches!(current, HealthStatus::Degraded | HealthStatus::Outage) {
                warn!(provider = provider_id, from = %previous, to = %current, "provider health worsened");
            } else {
                info!(provider = provider_id, from = %previous, to = %current, "provider health changed");
            }
        }
    }

    /// Snapshot of one provider's health. Unseen providers read as
    /// `unknown`.
    pub fn status(&self, provider_id: &str) -> ProviderHealthRecord {
        let table = self.table.read();
        match table.get(provider_id) {
            Some(window) => self.record_from(provider_id, window),
            None => ProviderHealthRecord::unknown(provider_id),
        }
    }

    /// Snapshots for every known provider, ordered by id.
    pub fn all_statuses(&self) -> Vec<ProviderHealthRecord> {
        let table = self.table.read();
        table.iter().map(|(id, window)| self.record_from(id, window)).collect()
    }

    fn record_from(&self, provider_id: &str, window: &ProviderWindow) -> ProviderHealthRecord {
        ProviderHealthRecord {
            provider_id: provider_id.to_string(),
            status: self.classify(window),
            avg_latency_ms: window.avg_latency_ms(),
            success_rate: window.success_rate(),
            model_count: window.model_count,
            last_probe: window.last_probe,
        }
    }

    /// Threshold state machine, recomputed from the window on every read.
    ///
    /// Outage requires the provider to be failing now (two consecutive
    /// recent failures) or to have no success at all in the window; a single
    /// blip against a healthy history stays within the rate/latency
    /// thresholds instead of flapping to outage.
    fn classify(&self, window: &ProviderWindow) -> HealthStatus {
        if window.samples.is_empty() {
            return HealthStatus::Unknown;
        }
        let rate = window.success_rate();
        if rate == 0.0 || window.consecutive_recent_failures() {
            return HealthStatus::Outage;
        }
        if rate < self.degraded_success_rate || window.avg_latency_ms() > self.degraded_latency_ms {
            return HealthStatus::Degraded;
        }
        HealthStatus::Operational
    }
}
