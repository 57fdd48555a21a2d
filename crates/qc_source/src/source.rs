use serde::{Deserialize, Serialize};

use crate::Locator;

/// Metadata describing one retrieved excerpt that backs an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Human readable name of the document, usually its file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,

    /// Backend identifier of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Locator>,

    /// Heading trail of the section the excerpt was taken from, outermost
    /// first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl SourceRef {
    #[must_use]
    pub fn new(document_name: impl Into<String>) -> Self {
        Self {
            document_name: Some(document_name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_document_id(mut self, id: u64) -> Self {
        self.document_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Locator) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_headings(mut self, headings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.headings = headings.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}
