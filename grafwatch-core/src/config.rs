//! Startup configuration.
//!
//! A [`WatcherConfig`] is built once by the binary, validated, and handed by
//! reference to every component constructor.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{invalid, ConfigError};
use crate::types::EntryKind;

pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_secs(5);
pub const DEFAULT_PASS_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;
pub const DEFAULT_HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Connection settings for the external dashboard service.
#[derive(Clone, PartialEq, Eq)]
pub struct GrafanaConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl GrafanaConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// `<url>/api/dashboards/db`
    pub fn dashboard_url(&self) -> String {
        format!("{}/api/dashboards/db", self.base())
    }

    /// `<url>/api/datasources`
    pub fn datasource_url(&self) -> String {
        format!("{}/api/datasources", self.base())
    }

    /// `<url>/api/health`
    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Missing("grafana url"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(invalid("grafana url", "expected an http:// or https:// URL"));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Missing("grafana username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("grafana password"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request timeout", "must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for GrafanaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrafanaConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Full process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Annotation key marking a resource as holding dashboards.
    pub dashboard_annotation: String,
    /// Annotation key marking a resource as holding datasources.
    pub datasource_annotation: String,
    pub grafana: GrafanaConfig,
    /// Quiet period the coalescer waits after the first notification.
    pub batch_window: Duration,
    /// Minimum delay between the end of a pass and the next wait.
    pub pass_interval: Duration,
    pub buffer_capacity: usize,
    pub health_poll_interval: Duration,
    pub metrics_addr: SocketAddr,
}

impl WatcherConfig {
    /// Configuration with every optional setting at its default.
    pub fn new(
        dashboard_annotation: impl Into<String>,
        datasource_annotation: impl Into<String>,
        grafana: GrafanaConfig,
    ) -> Self {
        Self {
            dashboard_annotation: dashboard_annotation.into(),
            datasource_annotation: datasource_annotation.into(),
            grafana,
            batch_window: DEFAULT_BATCH_WINDOW,
            pass_interval: DEFAULT_PASS_INTERVAL,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            health_poll_interval: DEFAULT_HEALTH_POLL_INTERVAL,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }

    /// Marker annotation for a given kind.
    pub fn annotation_for(&self, kind: EntryKind) -> &str {
        match kind {
            EntryKind::Dashboard => &self.dashboard_annotation,
            EntryKind::Datasource => &self.datasource_annotation,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dashboard_annotation.trim().is_empty() {
            return Err(ConfigError::Missing("dashboard annotation"));
        }
        if self.datasource_annotation.trim().is_empty() {
            return Err(ConfigError::Missing("datasource annotation"));
        }
        self.grafana.validate()?;
        if self.buffer_capacity == 0 {
            return Err(invalid("buffer capacity", "must be at least 1"));
        }
        if self.batch_window.is_zero() {
            return Err(invalid("batch window", "must be greater than zero"));
        }
        if self.pass_interval.is_zero() {
            return Err(invalid("pass interval", "must be greater than zero"));
        }
        if self.health_poll_interval.is_zero() {
            return Err(invalid("health interval", "must be greater than zero"));
        }
        Ok(())
    }
}
