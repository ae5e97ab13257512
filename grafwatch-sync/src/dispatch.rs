//! Pushes changed entries to the dashboard service, one at a time.

use grafwatch_core::types::{Entry, EntryKind, Namespace, ResourceName};

use crate::client::GrafanaApi;
use crate::metrics::SyncMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Success,
    Failure,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Success => "success",
            DispatchStatus::Failure => "failure",
        }
    }
}

/// Result of pushing one entry. Only feeds counters and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub name: ResourceName,
    pub namespace: Namespace,
    pub kind: EntryKind,
    pub status: DispatchStatus,
}

/// Totals for a batch of entries of one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct Dispatcher<A> {
    api: A,
    metrics: SyncMetrics,
}

impl<A: GrafanaApi> Dispatcher<A> {
    pub fn new(api: A, metrics: SyncMetrics) -> Self {
        Self { api, metrics }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    /// Push one entry and count the outcome. Never fails; errors are logged.
    pub fn dispatch(&self, entry: &Entry, kind: EntryKind) -> DispatchOutcome {
        tracing::info!(
            "refreshing {}: {}/{} key {}",
            kind,
            entry.namespace,
            entry.owner_name,
            entry.key
        );

        let result = match kind {
            EntryKind::Dashboard => self.api.push_dashboard(&entry.value),
            EntryKind::Datasource => self.api.push_datasource(&entry.value),
        };
        let status = match result {
            Ok(()) => DispatchStatus::Success,
            Err(err) => {
                tracing::error!(
                    "failed to push {} {}/{} key {}: {}",
                    kind,
                    entry.namespace,
                    entry.owner_name,
                    entry.key,
                    err
                );
                DispatchStatus::Failure
            }
        };

        self.metrics
            .record(&entry.owner_name.0, &entry.namespace.0, kind, status);
        DispatchOutcome {
            name: entry.owner_name.clone(),
            namespace: entry.namespace.clone(),
            kind,
            status,
        }
    }

    /// Push every entry in order; a failure never stops the batch.
    pub fn dispatch_all(&self, entries: &[Entry], kind: EntryKind) -> DispatchReport {
        let mut report = DispatchReport::default();
        for entry in entries {
            match self.dispatch(entry, kind).status {
                DispatchStatus::Success => report.succeeded += 1,
                DispatchStatus::Failure => report.failed += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ApiError;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(EntryKind, String)>>,
        reject: Option<&'static str>,
    }

    impl RecordingApi {
        fn call(&self, kind: EntryKind, payload: &str) -> Result<(), ApiError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((kind, payload.to_string()));
            if self.reject == Some(payload) {
                return Err(ApiError::Status {
                    url: "http://grafana/api".to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    impl GrafanaApi for RecordingApi {
        fn push_dashboard(&self, payload: &str) -> Result<(), ApiError> {
            self.call(EntryKind::Dashboard, payload)
        }

        fn push_datasource(&self, payload: &str) -> Result<(), ApiError> {
            self.call(EntryKind::Datasource, payload)
        }

        fn health(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn entry(name: &str, value: &str) -> Entry {
        Entry {
            namespace: Namespace::from("ns1"),
            owner_name: ResourceName::from(name),
            key: "json".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn routes_by_kind_and_counts_success() {
        let metrics = SyncMetrics::new().expect("metrics");
        let dispatcher = Dispatcher::new(RecordingApi::default(), metrics.clone());

        let outcome = dispatcher.dispatch(&entry("cm-a", "{}"), EntryKind::Datasource);

        assert_eq!(outcome.status, DispatchStatus::Success);
        assert_eq!(outcome.kind, EntryKind::Datasource);
        assert_eq!(
            dispatcher.api().calls.lock().expect("calls lock").as_slice(),
            &[(EntryKind::Datasource, "{}".to_string())]
        );
        assert_eq!(
            metrics.count("cm-a", "ns1", EntryKind::Datasource, DispatchStatus::Success),
            1
        );
    }

    #[test]
    fn failure_in_the_middle_does_not_stop_the_batch() {
        let metrics = SyncMetrics::new().expect("metrics");
        let api = RecordingApi {
            reject: Some("2"),
            ..RecordingApi::default()
        };
        let dispatcher = Dispatcher::new(api, metrics.clone());
        let entries = [entry("e1", "1"), entry("e2", "2"), entry("e3", "3")];

        let report = dispatcher.dispatch_all(&entries, EntryKind::Dashboard);

        assert_eq!(report, DispatchReport { succeeded: 2, failed: 1 });
        assert_eq!(dispatcher.api().calls.lock().expect("calls lock").len(), 3);
        for (name, status) in [
            ("e1", DispatchStatus::Success),
            ("e2", DispatchStatus::Failure),
            ("e3", DispatchStatus::Success),
        ] {
            assert_eq!(metrics.count(name, "ns1", EntryKind::Dashboard, status), 1);
        }
        assert_eq!(
            metrics.count("e2", "ns1", EntryKind::Dashboard, DispatchStatus::Success),
            0
        );
    }
}
