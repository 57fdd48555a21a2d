use std::{ops, slice};

use serde::{Deserialize, Serialize};

use crate::SourceRef;

/// The sources backing a single answer, in the order the backend supplied
/// them.
///
/// Identity is positional: ordinal `N` (1-indexed) answers citation marker
/// `[N]`. The catalog never reorders or deduplicates entries; the only way
/// to change it is to [`replace`] the whole list.
///
/// [`replace`]: SourceCatalog::replace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog(Vec<SourceRef>);

impl SourceCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Replace every entry with `sources`, keeping their order.
    pub fn replace(&mut self, sources: Vec<SourceRef>) {
        self.0 = sources;
    }

    /// Look up the source answering marker `[ordinal]`.
    ///
    /// Returns `None` for ordinal `0` and for ordinals beyond the end of the
    /// catalog.
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&SourceRef> {
        ordinal.checked_sub(1).and_then(|index| self.0.get(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, SourceRef> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SourceRef] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl ops::Deref for SourceCatalog {
    type Target = [SourceRef];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<SourceRef>> for SourceCatalog {
    fn from(sources: Vec<SourceRef>) -> Self {
        Self(sources)
    }
}

impl FromIterator<SourceRef> for SourceCatalog {
    fn from_iter<T: IntoIterator<Item = SourceRef>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SourceCatalog {
    type Item = &'a SourceRef;
    type IntoIter = slice::Iter<'a, SourceRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
