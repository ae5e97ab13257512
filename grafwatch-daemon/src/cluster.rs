//! Cluster collaborator: listing and watching config maps.
//!
//! Filtering by marker annotation happens locally in the trackers; the
//! cluster is always listed and watched unfiltered across all namespaces.

use std::fmt;
use std::future::Future;
use std::pin::pin;

use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ListParams};
use kube::runtime::{watcher, WatchStreamExt};
use kube::Client;

use grafwatch_core::types::{AnnotatedResource, Namespace, ResourceName};

use crate::coalescer::{CoalescerHandle, Notification};
use crate::error::DaemonError;

/// Lists every resource of the watched type.
pub trait ResourceSource: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<AnnotatedResource>, DaemonError>> + Send;
}

/// `ConfigMap`s in every namespace of the cluster.
#[derive(Clone)]
pub struct ClusterConfigMaps {
    api: Api<ConfigMap>,
}

impl ClusterConfigMaps {
    /// Connect using the in-cluster or kubeconfig credentials.
    pub async fn connect() -> Result<Self, DaemonError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Add/update/delete event stream. Reconnects with backoff on errors and
    /// never ends on its own.
    pub fn watch(
        &self,
    ) -> impl Stream<Item = Result<watcher::Event<ConfigMap>, watcher::Error>> + Send + 'static
    {
        watcher(self.api.clone(), watcher::Config::default()).default_backoff()
    }
}

impl ResourceSource for ClusterConfigMaps {
    async fn list(&self) -> Result<Vec<AnnotatedResource>, DaemonError> {
        let maps = self.api.list(&ListParams::default()).await?;
        Ok(maps.items.into_iter().map(annotated_resource).collect())
    }
}

/// Strip a `ConfigMap` down to what the trackers look at.
pub fn annotated_resource(map: ConfigMap) -> AnnotatedResource {
    let meta = map.metadata;
    AnnotatedResource {
        namespace: Namespace(meta.namespace.unwrap_or_default()),
        name: ResourceName(meta.name.unwrap_or_default()),
        annotations: meta.annotations.unwrap_or_default(),
        data: map.data.unwrap_or_default(),
    }
}

/// Turn every item of `events` into one notification. Errors are logged and
/// skipped. Returns the number forwarded once the stream ends or the
/// coalescer is closed.
pub async fn forward_events<S, T, E>(events: S, coalescer: CoalescerHandle) -> usize
where
    S: Stream<Item = Result<T, E>>,
    E: fmt::Display,
{
    let mut events = pin!(events);
    let mut forwarded = 0;
    while let Some(event) = events.next().await {
        if let Err(err) = event {
            tracing::warn!(error = %err, "resource watch error");
            continue;
        }
        if coalescer.submit(Notification).await.is_err() {
            tracing::debug!("coalescer closed, watcher stops forwarding");
            break;
        }
        forwarded += 1;
    }
    forwarded
}
