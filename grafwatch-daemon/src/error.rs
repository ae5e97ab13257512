use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watcher, worker loop and runtime wiring.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] grafwatch_core::ConfigError),

    #[error("cluster error: {0}")]
    Kube(#[from] kube::Error),

    #[error("sync error: {0}")]
    Sync(#[from] grafwatch_sync::SyncError),

    #[error("metrics server error: {0}")]
    Serve(#[from] warp::Error),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("daemon runtime error: {0}")]
    Runtime(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
