use qc_source::SourceRef;

/// An event yielded by a streaming session.
///
/// Every session ends with exactly one [`StreamEvent::End`] or
/// [`StreamEvent::Error`]; nothing follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of the answer text, forwarded as received.
    TextDelta { content: String },

    /// The full, ordered list of sources backing the answer so far.
    SourceList { sources: Vec<SourceRef> },

    /// The answer is complete.
    End,

    /// The exchange failed.
    Error { message: String },
}

impl StreamEvent {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::TextDelta {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn sources(sources: impl Into<Vec<SourceRef>>) -> Self {
        Self::SourceList {
            sources: sources.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns `true` if no event can follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error { .. })
    }

    /// Name of the event variant, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text_delta",
            Self::SourceList { .. } => "source_list",
            Self::End => "end",
            Self::Error { .. } => "error",
        }
    }
}

impl From<crate::Error> for StreamEvent {
    fn from(error: crate::Error) -> Self {
        Self::error(error.to_string())
    }
}
