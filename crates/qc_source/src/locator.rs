use std::fmt;

use serde::{Deserialize, Serialize};

/// Where in a document an excerpt was found.
///
/// Documents are located by whatever the parser could recover: a page for
/// paginated formats, a paragraph for flowing text, or a cell reference for
/// spreadsheets. At most one of them is ever carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Page(u32),
    Paragraph(u32),
    Cell(String),
}

impl Locator {
    /// Pick a locator from the individually optional fields, preferring the
    /// page, then the paragraph, then the cell.
    #[must_use]
    pub fn from_parts(
        page: Option<u32>,
        paragraph: Option<u32>,
        cell: Option<String>,
    ) -> Option<Self> {
        page.map(Self::Page)
            .or_else(|| paragraph.map(Self::Paragraph))
            .or_else(|| cell.filter(|c| !c.trim().is_empty()).map(Self::Cell))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "page {page}"),
            Self::Paragraph(paragraph) => write!(f, "paragraph {paragraph}"),
            Self::Cell(cell) => write!(f, "cell {cell}"),
        }
    }
}
