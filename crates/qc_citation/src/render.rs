//! Display form of a single source.

use std::{borrow::Cow, fmt};

use qc_source::{Locator, SourceRef};

/// Longest excerpt shown, in characters.
pub const MAX_EXCERPT_CHARS: usize = 200;

/// Label of a source with neither a document name nor an identifier.
pub const PLACEHOLDER_LABEL: &str = "Untitled document";

/// A source, prepared for display.
///
/// Built from a borrowed [`SourceRef`], which is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry<'a> {
    /// The ordinal the source is cited by.
    pub ordinal: usize,
    pub label: Cow<'a, str>,
    pub locator: Option<&'a Locator>,

    /// Heading trail, joined with ` > `.
    pub headings: Option<String>,

    /// The excerpt, truncated to [`MAX_EXCERPT_CHARS`].
    pub excerpt: Option<Cow<'a, str>>,
}

impl<'a> SourceEntry<'a> {
    #[must_use]
    pub fn new(ordinal: usize, source: &'a SourceRef) -> Self {
        let label = match (&source.document_name, source.document_id) {
            (Some(name), _) if !name.trim().is_empty() => Cow::Borrowed(name.as_str()),
            (_, Some(id)) => Cow::Owned(format!("Document #{id}")),
            _ => Cow::Borrowed(PLACEHOLDER_LABEL),
        };

        let headings = source
            .headings
            .iter()
            .map(|heading| heading.trim())
            .filter(|heading| !heading.is_empty())
            .collect::<Vec<_>>();

        Self {
            ordinal,
            label,
            locator: source.location.as_ref(),
            headings: (!headings.is_empty()).then(|| headings.join(" > ")),
            excerpt: source
                .excerpt
                .as_deref()
                .map(str::trim)
                .filter(|excerpt| !excerpt.is_empty())
                .map(|excerpt| truncate(excerpt, MAX_EXCERPT_CHARS)),
        }
    }
}

impl fmt::Display for SourceEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.ordinal, self.label)?;
        if let Some(locator) = self.locator {
            write!(f, ", {locator}")?;
        }

        if let Some(headings) = &self.headings {
            write!(f, "\n    {headings}")?;
        }

        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n    \"{excerpt}\"")?;
        }

        Ok(())
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max) {
        None => Cow::Borrowed(text),
        Some((end, _)) => Cow::Owned(format!("{}...", &text[..end])),
    }
}
