//! The worker loop: readiness gate, then one catalog → detect → dispatch
//! pass per coalesced batch until the coalescer closes.

use std::sync::Arc;
use std::time::Duration;

use grafwatch_core::config::WatcherConfig;
use grafwatch_core::types::EntryKind;
use grafwatch_sync::{ChangeTracker, DispatchReport, Dispatcher, GrafanaApi};

use crate::cluster::ResourceSource;
use crate::coalescer::Coalescer;
use crate::error::DaemonError;

/// Per-kind dispatch totals for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub datasources: DispatchReport,
    pub dashboards: DispatchReport,
}

impl PassReport {
    pub fn for_kind(&self, kind: EntryKind) -> DispatchReport {
        match kind {
            EntryKind::Datasource => self.datasources,
            EntryKind::Dashboard => self.dashboards,
        }
    }

    fn set(&mut self, kind: EntryKind, report: DispatchReport) {
        match kind {
            EntryKind::Datasource => self.datasources = report,
            EntryKind::Dashboard => self.dashboards = report,
        }
    }

    pub fn attempted(&self) -> usize {
        self.datasources.attempted() + self.dashboards.attempted()
    }
}

/// What the loop did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub passes: usize,
    pub notifications: usize,
    pub dispatched: usize,
}

pub struct Worker<S, A> {
    source: S,
    dispatcher: Arc<Dispatcher<A>>,
    trackers: Vec<ChangeTracker>,
    batch_window: Duration,
    pass_interval: Duration,
    health_poll_interval: Duration,
}

impl<S, A> Worker<S, A>
where
    S: ResourceSource,
    A: GrafanaApi + 'static,
{
    pub fn new(config: &WatcherConfig, source: S, dispatcher: Arc<Dispatcher<A>>) -> Self {
        let trackers = EntryKind::PASS_ORDER
            .into_iter()
            .map(|kind| ChangeTracker::new(kind, config.annotation_for(kind)))
            .collect();
        Self {
            source,
            dispatcher,
            trackers,
            batch_window: config.batch_window,
            pass_interval: config.pass_interval,
            health_poll_interval: config.health_poll_interval,
        }
    }

    /// Run until the coalescer is closed and drained.
    pub async fn run(mut self, mut coalescer: Coalescer) -> Result<WorkerSummary, DaemonError> {
        let mut summary = WorkerSummary::default();

        if !self.wait_until_ready(&coalescer).await {
            tracing::info!("coalescer closed before the dashboard service became ready");
            return Ok(summary);
        }
        tracing::info!("worker started");

        loop {
            let batch = coalescer.await_batch(self.batch_window).await;
            if batch.is_empty() {
                if batch.closed {
                    break;
                }
                continue;
            }

            tracing::info!(updates = batch.len(), "worker processing updates");
            let report = self.run_pass().await?;
            summary.passes += 1;
            summary.notifications += batch.len();
            summary.dispatched += report.attempted();

            tokio::time::sleep(self.pass_interval).await;
        }

        tracing::info!(passes = summary.passes, "worker closed");
        Ok(summary)
    }

    /// Poll the service's health endpoint until it answers. Returns `false`
    /// if the coalescer is closed first.
    pub async fn wait_until_ready(&self, coalescer: &Coalescer) -> bool {
        loop {
            let dispatcher = Arc::clone(&self.dispatcher);
            match tokio::task::spawn_blocking(move || dispatcher.api().health()).await {
                Ok(Ok(())) => return true,
                Ok(Err(err)) => tracing::warn!(error = %err, "dashboard service not ready"),
                Err(err) => tracing::warn!(error = %err, "readiness probe panicked"),
            }

            tracing::info!(
                retry_in_secs = self.health_poll_interval.as_secs(),
                "retrying dashboard service health"
            );
            tokio::select! {
                _ = tokio::time::sleep(self.health_poll_interval) => {}
                _ = coalescer.closed() => return false,
            }
        }
    }

    /// One full pass over every kind, datasources first.
    ///
    /// A listing failure counts as "no changes" for that kind.
    pub async fn run_pass(&mut self) -> Result<PassReport, DaemonError> {
        let mut pass = PassReport::default();

        for tracker in self.trackers.iter_mut() {
            let kind = tracker.kind();
            tracing::info!(kind = %kind, "looking for updates");

            let resources = match self.source.list().await {
                Ok(resources) => resources,
                Err(err) => {
                    tracing::error!(kind = %kind, error = %err, "unable to list resources");
                    continue;
                }
            };

            let changed = tracker.find_changed(&resources);
            tracing::info!(kind = %kind, changed = changed.len(), "found updates");
            if changed.is_empty() {
                continue;
            }

            let dispatcher = Arc::clone(&self.dispatcher);
            let report =
                tokio::task::spawn_blocking(move || dispatcher.dispatch_all(&changed, kind))
                    .await
                    .map_err(|err| {
                        DaemonError::Runtime(format!("dispatch task join error: {err}"))
                    })?;
            if report.failed > 0 {
                tracing::warn!(
                    kind = %kind,
                    failed = report.failed,
                    succeeded = report.succeeded,
                    "pass finished with failures",
                );
            }
            pass.set(kind, report);
        }

        Ok(pass)
    }
}
