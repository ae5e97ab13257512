//! `grafwatch run`: the long-running sync daemon.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use grafwatch_core::config::{
    WatcherConfig, DEFAULT_BATCH_WINDOW, DEFAULT_BUFFER_CAPACITY, DEFAULT_HEALTH_POLL_INTERVAL,
    DEFAULT_METRICS_ADDR, DEFAULT_PASS_INTERVAL,
};
use grafwatch_daemon::{start_blocking, LogFormat};

use super::{AnnotationArgs, GrafanaArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub annotations: AnnotationArgs,

    #[command(flatten)]
    pub grafana: GrafanaArgs,

    /// Seconds of quiet after the first change notification before a pass.
    #[arg(long, default_value_t = DEFAULT_BATCH_WINDOW.as_secs())]
    pub batch_time: u64,

    /// Seconds to pause after each pass.
    #[arg(long, default_value_t = DEFAULT_PASS_INTERVAL.as_secs())]
    pub pass_interval: u64,

    /// Pending notifications held before the watcher blocks.
    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// Seconds between Grafana health probes at startup.
    #[arg(long, default_value_t = DEFAULT_HEALTH_POLL_INTERVAL.as_secs())]
    pub health_interval: u64,

    /// Listen address for the `/metrics` endpoint.
    #[arg(long, default_value = DEFAULT_METRICS_ADDR)]
    pub metrics_addr: SocketAddr,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let log = LogFormat { json: self.log_json };
        let config = self.into_config();
        config.validate().context("invalid configuration")?;
        start_blocking(config, log).context("daemon exited with error")
    }

    pub fn into_config(self) -> WatcherConfig {
        let mut config = WatcherConfig::new(
            self.annotations.dashboard_annotation,
            self.annotations.datasource_annotation,
            self.grafana.into_config(),
        );
        config.batch_window = Duration::from_secs(self.batch_time);
        config.pass_interval = Duration::from_secs(self.pass_interval);
        config.buffer_capacity = self.buffer_capacity;
        config.health_poll_interval = Duration::from_secs(self.health_interval);
        config.metrics_addr = self.metrics_addr;
        config
    }
}
