//! Dispatch counters.
//!
//! One `IntCounterVec` per process, labelled by resource name, namespace,
//! kind and status. Counters live in a registry owned by [`SyncMetrics`]
//! rather than the process-global default registry.

use std::fmt;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use grafwatch_core::types::EntryKind;

use crate::dispatch::DispatchStatus;
use crate::error::SyncError;

pub const UPDATES_METRIC: &str = "grafana_watcher_configmap_updates";

#[derive(Clone)]
pub struct SyncMetrics {
    registry: Registry,
    updates: IntCounterVec,
}

impl fmt::Debug for SyncMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMetrics").finish_non_exhaustive()
    }
}

impl SyncMetrics {
    pub fn new() -> Result<Self, SyncError> {
        let registry = Registry::new();
        let updates = IntCounterVec::new(
            Opts::new(UPDATES_METRIC, "Total number of updates per configmap"),
            &["name", "namespace", "kind", "status"],
        )?;
        registry.register(Box::new(updates.clone()))?;
        Ok(Self { registry, updates })
    }

    pub fn record(&self, name: &str, namespace: &str, kind: EntryKind, status: DispatchStatus) {
        self.updates
            .with_label_values(&[name, namespace, kind.as_str(), status.as_str()])
            .inc();
    }

    /// Current value of one counter; zero if it was never incremented.
    pub fn count(
        &self,
        name: &str,
        namespace: &str,
        kind: EntryKind,
        status: DispatchStatus,
    ) -> u64 {
        self.updates
            .with_label_values(&[name, namespace, kind.as_str(), status.as_str()])
            .get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, SyncError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
