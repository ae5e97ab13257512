use std::sync::Arc;

use tokio::sync::broadcast;

use grafwatch_core::config::WatcherConfig;
use grafwatch_sync::{Dispatcher, GrafanaClient, SyncMetrics};

use crate::cluster::{forward_events, ClusterConfigMaps};
use crate::coalescer::Coalescer;
use crate::error::{io_err, DaemonError};
use crate::metrics_server;
use crate::worker::Worker;

/// Logging options for [`start_blocking`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFormat {
    pub json: bool,
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(config: WatcherConfig, log: LogFormat) -> Result<(), DaemonError> {
    init_tracing(log);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the daemon: cluster watcher, worker loop, metrics endpoint and
/// ctrl-c handler.
pub async fn run(config: WatcherConfig) -> Result<(), DaemonError> {
    config.validate()?;

    tracing::info!(
        dashboard_annotation = %config.dashboard_annotation,
        datasource_annotation = %config.datasource_annotation,
        grafana_url = %config.grafana.url,
        batch_window_secs = config.batch_window.as_secs(),
        buffer_capacity = config.buffer_capacity,
        "grafwatch loaded",
    );

    let metrics = SyncMetrics::new()?;
    let dispatcher = Arc::new(Dispatcher::new(
        GrafanaClient::new(&config.grafana),
        metrics.clone(),
    ));
    let cluster = ClusterConfigMaps::connect().await?;

    let (coalescer, handle) = Coalescer::new(config.buffer_capacity);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let events = cluster.watch();
        let handle = handle.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                forwarded = forward_events(events, handle) => {
                    tracing::warn!(forwarded, "resource watch ended");
                }
            }
            Ok::<(), DaemonError>(())
        })
    };

    let worker_handle = {
        let shutdown = shutdown_tx.clone();
        let worker = Worker::new(&config, cluster, dispatcher);
        tokio::spawn(async move {
            let result = worker.run(coalescer).await.map(|summary| {
                tracing::info!(
                    passes = summary.passes,
                    dispatched = summary.dispatched,
                    "worker finished",
                );
            });
            let _ = shutdown.send(());
            result
        })
    };

    let metrics_handle = {
        let shutdown = shutdown_tx.clone();
        let addr = config.metrics_addr;
        tokio::spawn(async move {
            let result = metrics_server::serve(addr, metrics, shutdown.subscribe()).await;
            if result.is_err() {
                let _ = shutdown.send(());
            }
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let handle = handle.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    handle.close();
                    Ok(())
                }
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, draining pending updates");
                            handle.close();
                            Ok(())
                        }
                        Err(err) => {
                            handle.close();
                            Err(DaemonError::Runtime(format!("ctrl-c handler failed: {err}")))
                        }
                    }
                }
            }
        })
    };
    drop(handle);

    let (watcher_result, worker_result, metrics_result, signal_result) = tokio::join!(
        watcher_handle,
        worker_handle,
        metrics_handle,
        signal_handle
    );

    handle_join("watcher", watcher_result)?;
    handle_join("worker", worker_result)?;
    handle_join("metrics_server", metrics_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("cleaning up");
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Runtime(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn init_tracing(log: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);
    let _ = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
