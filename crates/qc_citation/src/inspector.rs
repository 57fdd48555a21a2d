//! See [`SourceInspector`].

use std::ops::Range;

use qc_conversation::{Turn, TurnId};
use qc_source::SourceRef;
use tracing::debug;

use crate::{Citation, SourceEntry};

/// What the inspector is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// A citation marker in the text of a turn.
    Citation { turn: TurnId, span: Range<usize> },

    /// All sources of a turn.
    Turn(TurnId),
}

impl Anchor {
    #[must_use]
    pub fn turn(&self) -> TurnId {
        match self {
            Self::Citation { turn, .. } | Self::Turn(turn) => *turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Open {
    anchor: Anchor,
    sources: Vec<SourceRef>,

    /// Ordinal of the first source.
    first_ordinal: usize,
}

/// Display state for the sources behind a citation.
///
/// The inspector is either closed, or open on an [`Anchor`] with the sources
/// that were resolved when it opened. Activating the anchor it is open on
/// keeps it open; activating any other anchor closes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInspector {
    open: Option<Open>,
}

impl SourceInspector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    #[must_use]
    pub fn anchor(&self) -> Option<&Anchor> {
        self.open.as_ref().map(|open| &open.anchor)
    }

    /// The active sources; empty while closed.
    #[must_use]
    pub fn sources(&self) -> &[SourceRef] {
        self.open.as_ref().map_or(&[], |open| open.sources.as_slice())
    }

    /// The active sources prepared for display.
    #[must_use]
    pub fn entries(&self) -> Vec<SourceEntry<'_>> {
        let Some(open) = &self.open else {
            return vec![];
        };

        open.sources
            .iter()
            .enumerate()
            .map(|(index, source)| SourceEntry::new(open.first_ordinal + index, source))
            .collect()
    }

    /// Activate a citation of `turn`.
    ///
    /// Returns `true` if the inspector is open afterwards.
    pub fn activate(&mut self, turn: TurnId, citation: &Citation<'_>) -> bool {
        let anchor = Anchor::Citation {
            turn,
            span: citation.span.clone(),
        };

        self.toggle(anchor, citation.sources, citation.ordinal)
    }

    /// Activate the "all sources" affordance of `turn`.
    ///
    /// Returns `true` if the inspector is open afterwards.
    pub fn show_all(&mut self, turn: &Turn) -> bool {
        self.toggle(Anchor::Turn(turn.id()), turn.sources().as_slice(), 1)
    }

    pub fn dismiss(&mut self) {
        if self.open.take().is_some() {
            debug!("Source inspector closed.");
        }
    }

    fn toggle(&mut self, anchor: Anchor, sources: &[SourceRef], first_ordinal: usize) -> bool {
        match &self.open {
            Some(open) if open.anchor == anchor => true,
            Some(_) => {
                self.dismiss();
                false
            }
            None => {
                debug!(?anchor, count = sources.len(), "Source inspector opened.");
                self.open = Some(Open {
                    anchor,
                    sources: sources.to_vec(),
                    first_ordinal,
                });
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "inspector_tests.rs"]
mod tests;
