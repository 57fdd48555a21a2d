//! See [`Turn`].

use std::fmt;

use qc_source::SourceCatalog;
use time::OffsetDateTime;

/// Identifier of a turn.
///
/// Derived from the creation time in nanoseconds since the Unix epoch, and
/// strictly increasing within a conversation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(i128);

impl TurnId {
    /// The next identifier after `previous`, based on the current time.
    pub(crate) fn next(previous: Option<Self>) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos();

        match previous {
            Some(Self(last)) if last >= now => Self(last + 1),
            _ => Self(now),
        }
    }

    #[must_use]
    pub fn as_nanos(&self) -> i128 {
        self.0
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(self.0).ok()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qc-t{}", self.0)
    }
}

impl fmt::Debug for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TurnId").field(&self.to_string()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message of a conversation.
///
/// Turns are immutable once finalized. The only turn that ever changes is
/// the in-flight assistant turn, and only through the
/// [`MessageAccumulator`].
///
/// [`MessageAccumulator`]: crate::MessageAccumulator
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    id: TurnId,
    role: Role,
    text: String,
    sources: SourceCatalog,
    created_at: OffsetDateTime,
    in_flight: bool,
}

impl Turn {
    pub(crate) fn user(id: TurnId, text: String) -> Self {
        Self::new(id, Role::User, text, false)
    }

    pub(crate) fn placeholder(id: TurnId) -> Self {
        Self::new(id, Role::Assistant, String::new(), true)
    }

    fn new(id: TurnId, role: Role, text: String, in_flight: bool) -> Self {
        Self {
            id,
            role,
            text,
            sources: SourceCatalog::new(),
            created_at: id.timestamp().unwrap_or_else(OffsetDateTime::now_utc),
            in_flight,
        }
    }

    #[must_use]
    pub fn id(&self) -> TurnId {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sources(&self) -> &SourceCatalog {
        &self.sources
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns `true` while the turn is still being streamed.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn push_text(&mut self, content: &str) {
        self.text.push_str(content);
    }

    pub(crate) fn sources_mut(&mut self) -> &mut SourceCatalog {
        &mut self.sources
    }

    pub(crate) fn finalize(&mut self) {
        self.in_flight = false;
    }
}
