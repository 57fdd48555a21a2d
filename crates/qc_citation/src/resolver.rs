//! Citation marker resolution.
//!
//! Answer text refers to its sources with bracketed ordinals: `[2]` cites the
//! second source of the turn. [`resolve`] splits a text into plain text and
//! the markers that resolve against the given sources. Markers that do not
//! resolve, because the ordinal is out of range or the sources have not
//! arrived yet, stay part of the surrounding text.

use std::{ops::Range, slice, sync::LazyLock};

use fancy_regex::Regex;
use qc_conversation::Turn;
use qc_source::SourceRef;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+)\]").expect("valid citation marker pattern"));

/// A piece of resolved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text without resolvable markers.
    Text(&'a str),

    /// A marker that resolved to a source.
    Citation(Citation<'a>),
}

impl<'a> Segment<'a> {
    /// The text covered by this segment, exactly as it appears in the input.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Text(text) => text,
            Self::Citation(citation) => citation.marker,
        }
    }

    #[must_use]
    pub fn as_citation(&self) -> Option<&Citation<'a>> {
        match self {
            Self::Text(_) => None,
            Self::Citation(citation) => Some(citation),
        }
    }
}

/// A resolved citation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation<'a> {
    /// The 1-based ordinal of the marker.
    pub ordinal: usize,

    /// The marker text, e.g. `[2]`.
    pub marker: &'a str,

    /// Byte range of the marker in the resolved text.
    pub span: Range<usize>,

    /// The cited source, as a single element slice.
    pub sources: &'a [SourceRef],
}

impl<'a> Citation<'a> {
    /// The cited source.
    #[must_use]
    pub fn source(&self) -> Option<&'a SourceRef> {
        self.sources.first()
    }
}

/// Split `text` into plain text and resolved citation markers.
///
/// Concatenating the segments yields `text` again. Adjacent plain text is
/// always merged into a single segment, so an unresolved marker never splits
/// the text around it.
#[must_use]
pub fn resolve<'a>(text: &'a str, sources: &'a [SourceRef]) -> Vec<Segment<'a>> {
    let mut segments = vec![];
    let mut text_start = 0;

    for captures in MARKER.captures_iter(text).map_while(Result::ok) {
        let (Some(marker), Some(digits)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let Some((ordinal, source)) = lookup(digits.as_str(), sources) else {
            continue;
        };

        if text_start < marker.start() {
            segments.push(Segment::Text(&text[text_start..marker.start()]));
        }

        segments.push(Segment::Citation(Citation {
            ordinal,
            marker: marker.as_str(),
            span: marker.range(),
            sources: slice::from_ref(source),
        }));

        text_start = marker.end();
    }

    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }

    segments
}

/// Resolve the markers of `turn` against its own sources.
#[must_use]
pub fn resolve_turn(turn: &Turn) -> Vec<Segment<'_>> {
    resolve(turn.text(), turn.sources().as_slice())
}

/// The citations in `text`, in order of appearance.
pub fn citations<'a>(
    text: &'a str,
    sources: &'a [SourceRef],
) -> impl Iterator<Item = Citation<'a>> {
    resolve(text, sources)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Citation(citation) => Some(citation),
            Segment::Text(_) => None,
        })
}

fn lookup<'a>(digits: &str, sources: &'a [SourceRef]) -> Option<(usize, &'a SourceRef)> {
    let ordinal = digits.parse::<usize>().ok()?;
    let source = sources.get(ordinal.checked_sub(1)?)?;

    Some((ordinal, source))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
