//! Citation markers and the sources behind them.
//!
//! [`resolve`] turns answer text into plain text and activatable citations,
//! [`SourceInspector`] holds the display state of the sources behind an
//! activated citation, and [`SourceEntry`] is a source prepared for display.

mod inspector;
mod render;
mod resolver;

pub use inspector::{Anchor, SourceInspector};
pub use render::{MAX_EXCERPT_CHARS, PLACEHOLDER_LABEL, SourceEntry, truncate};
pub use resolver::{Citation, Segment, citations, resolve, resolve_turn};
