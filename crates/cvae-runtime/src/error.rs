use cvae_core::CvaeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to read manifest '{path}': {source}")]
    ManifestLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Decoder loading failed: {0}")]
    ModelLoad(anyhow::Error),
    #[error("Session is not ready, load the model first")]
    NotReady,
    #[error(transparent)]
    Engine(#[from] CvaeError),
    #[error("Animation cancelled")]
    Cancelled,
    #[error("Decoder host is no longer running")]
    HostUnavailable,
    #[error("Worker thread panicked: {0}")]
    ThreadPanicked(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RuntimeError {
    /// `true` for the unknown-label validation failure.
    pub fn is_invalid_label(&self) -> bool {
        matches!(self, RuntimeError::Engine(CvaeError::InvalidLabel(_)))
    }
}
