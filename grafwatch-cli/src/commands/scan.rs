//! `grafwatch scan`: dry run of a first pass against the live cluster.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use grafwatch_core::types::{AnnotatedResource, EntryKind};
use grafwatch_daemon::{ClusterConfigMaps, ResourceSource};
use grafwatch_sync::fingerprint::fingerprint;
use grafwatch_sync::ChangeTracker;

use super::AnnotationArgs;

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub annotations: AnnotationArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ScanRow {
    kind: &'static str,
    id: String,
    namespace: String,
    name: String,
    key: String,
    fingerprint: String,
    bytes: usize,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let resources = runtime.block_on(async {
            let cluster = ClusterConfigMaps::connect()
                .await
                .context("failed to connect to the cluster")?;
            cluster.list().await.context("failed to list config maps")
        })?;

        let rows = plan(&self.annotations, &resources);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("no annotated entries found");
            return Ok(());
        }
        for row in &rows {
            println!(
                "{:<10} {:<50} {:>8}B  {}",
                row.kind,
                row.id,
                row.bytes,
                &row.fingerprint[..12]
            );
        }
        println!("{} entries would be pushed", rows.len());
        Ok(())
    }
}

/// Entries a fresh set of trackers would report, in pass order.
fn plan(annotations: &AnnotationArgs, resources: &[AnnotatedResource]) -> Vec<ScanRow> {
    let mut rows = Vec::new();
    for kind in EntryKind::PASS_ORDER {
        let marker = match kind {
            EntryKind::Dashboard => &annotations.dashboard_annotation,
            EntryKind::Datasource => &annotations.datasource_annotation,
        };
        let mut tracker = ChangeTracker::new(kind, marker.as_str());
        rows.extend(tracker.find_changed(resources).into_iter().map(|entry| ScanRow {
            kind: kind.as_str(),
            id: entry.id().0,
            fingerprint: fingerprint(&entry.value),
            bytes: entry.value.len(),
            namespace: entry.namespace.0,
            name: entry.owner_name.0,
            key: entry.key,
        }));
    }
    rows
}
