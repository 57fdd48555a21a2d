use std::time::Duration;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Failures of the streaming transport.
///
/// These never escape a [`Session`] directly: the session converts them into
/// a terminal [`StreamEvent::Error`] carrying the error's display text.
///
/// [`Session`]: crate::Session
/// [`StreamEvent::Error`]: crate::StreamEvent::Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {}): {}", .code, .message)]
    Api { code: u16, message: String },

    #[error("Stream processing error: {0}")]
    Stream(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("timed out after {0:?} waiting for the response")]
    Timeout(Duration),

    #[error("client config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedFrame(error.to_string())
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
