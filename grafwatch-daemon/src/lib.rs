//! grafwatch daemon: cluster watcher + coalescer + worker loop + metrics.

pub mod cluster;
pub mod coalescer;
mod error;
pub mod metrics_server;
mod runtime;
pub mod worker;

pub use cluster::{forward_events, ClusterConfigMaps, ResourceSource};
pub use coalescer::{Batch, Coalescer, CoalescerHandle, Notification};
pub use error::DaemonError;
pub use runtime::{run, start_blocking, LogFormat};
pub use worker::{PassReport, Worker, WorkerSummary};
