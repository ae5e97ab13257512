//! `GET /metrics` endpoint for the dispatch counters.

use std::net::SocketAddr;

use tokio::sync::broadcast;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use grafwatch_sync::SyncMetrics;

use crate::error::DaemonError;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub fn routes(
    metrics: SyncMetrics,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("metrics"))
        .map(move || match metrics.render() {
            Ok(body) => warp::reply::with_status(body, StatusCode::OK),
            Err(err) => {
                tracing::error!(error = %err, "could not encode metrics");
                warp::reply::with_status(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        })
        .map(|reply| warp::reply::with_header(reply, "content-type", CONTENT_TYPE))
}

/// Serve until the shutdown broadcast fires.
pub async fn serve(
    addr: SocketAddr,
    metrics: SyncMetrics,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let (bound, server) =
        warp::serve(routes(metrics)).try_bind_with_graceful_shutdown(addr, async move {
            let _ = shutdown_rx.recv().await;
        })?;
    tracing::info!(addr = %bound, "serving metrics");
    server.await;
    Ok(())
}
