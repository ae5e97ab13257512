//! # grafwatch-sync
//!
//! Content-addressed change detection and dispatch to the dashboard service.
//!
//! A [`ChangeTracker`] turns a listing of annotated resources into the
//! entries whose content changed since its last scan; a [`Dispatcher`] pushes
//! those entries through a [`GrafanaApi`] and counts the outcomes in
//! [`SyncMetrics`].

pub mod catalog;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod tracker;

pub use client::{GrafanaApi, GrafanaClient};
pub use dispatch::{DispatchOutcome, DispatchReport, DispatchStatus, Dispatcher};
pub use error::{ApiError, SyncError};
pub use metrics::SyncMetrics;
pub use tracker::ChangeTracker;
