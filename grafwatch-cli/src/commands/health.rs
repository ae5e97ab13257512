//! `grafwatch health`: one readiness probe.

use anyhow::{Context, Result};
use clap::Args;

use grafwatch_sync::{GrafanaApi, GrafanaClient};

use super::GrafanaArgs;

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[command(flatten)]
    pub grafana: GrafanaArgs,
}

impl HealthArgs {
    pub fn run(self) -> Result<()> {
        let config = self.grafana.into_config();
        config.validate().context("invalid configuration")?;
        GrafanaClient::new(&config)
            .health()
            .with_context(|| format!("grafana at {} is not ready", config.url))?;
        println!("grafana at {} is ready", config.url);
        Ok(())
    }
}
