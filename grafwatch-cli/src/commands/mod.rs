pub mod health;
pub mod run;
pub mod scan;

use std::time::Duration;

use clap::Args;

use grafwatch_core::config::{GrafanaConfig, DEFAULT_REQUEST_TIMEOUT};

/// Marker annotation keys, shared by `run` and `scan`.
#[derive(Args, Debug, Clone)]
pub struct AnnotationArgs {
    /// Annotation key marking dashboard config maps.
    #[arg(long, env = "CONFIG_MAP_DASHBOARD_ANNOTATION")]
    pub dashboard_annotation: String,

    /// Annotation key marking datasource config maps.
    #[arg(long, env = "CONFIG_MAP_DATASOURCE_ANNOTATION")]
    pub datasource_annotation: String,
}

/// Grafana connection, shared by `run` and `health`.
#[derive(Args, Debug, Clone)]
pub struct GrafanaArgs {
    /// Base URL of the Grafana instance.
    #[arg(long, env = "GRAFANA_URL")]
    pub grafana_url: String,

    #[arg(long, env = "GRAFANA_USERNAME")]
    pub grafana_user: String,

    #[arg(long, env = "GRAFANA_PASSWORD", hide_env_values = true)]
    pub grafana_password: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout: u64,
}

impl GrafanaArgs {
    pub fn into_config(self) -> GrafanaConfig {
        let mut config =
            GrafanaConfig::new(self.grafana_url, self.grafana_user, self.grafana_password);
        config.request_timeout = Duration::from_secs(self.request_timeout);
        config
    }
}
