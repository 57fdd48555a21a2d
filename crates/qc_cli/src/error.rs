use std::io;

use camino::Utf8PathBuf;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] qc_config::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] qc_transport::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message rejected: {0}")]
    Rejected(#[from] qc_conversation::Rejection),

    #[error("Answer failed: {0}")]
    Answer(String),

    #[error("Answer cancelled")]
    Cancelled,

    #[error("{0} already exists")]
    Exists(Utf8PathBuf),
}

impl Error {
    /// Process exit code for this error.
    pub(crate) fn code(&self) -> u8 {
        match self {
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}
