//! grafwatch: keeps a Grafana instance in sync with annotated config maps.
//!
//! # Usage
//!
//! ```text
//! grafwatch run --dashboard-annotation <key> --datasource-annotation <key> \
//!     --grafana-url <url> --grafana-user <user> --grafana-password <password>
//! grafwatch scan --dashboard-annotation <key> --datasource-annotation <key> [--json]
//! grafwatch health --grafana-url <url> --grafana-user <user> --grafana-password <password>
//! ```
//!
//! Every connection flag falls back to the environment variable named in its
//! `--help` text.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{health::HealthArgs, run::RunArgs, scan::ScanArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "grafwatch",
    version,
    about = "Push annotated ConfigMaps to Grafana as dashboards and datasources",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the cluster and push changed entries until interrupted.
    Run(RunArgs),

    /// List the entries a first pass would push, without pushing anything.
    Scan(ScanArgs),

    /// Probe the Grafana health endpoint once.
    Health(HealthArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Scan(args) => args.run(),
        Commands::Health(args) => args.run(),
    }
}
