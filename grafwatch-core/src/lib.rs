//! grafwatch core library: domain types, configuration, errors.
//!
//! - [`types`]: resources, entries and their identities
//! - [`config`]: [`WatcherConfig`] and its validation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{GrafanaConfig, WatcherConfig};
pub use error::ConfigError;
pub use types::{AnnotatedResource, Entry, EntryId, EntryKind, Namespace, ResourceName};
