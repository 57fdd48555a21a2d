//! Source metadata backing an assistant answer.
//!
//! A [`SourceRef`] describes one retrieved excerpt. The sources of a single
//! answer are kept in a [`SourceCatalog`], whose order is the order in which
//! the backend supplied them: the Nth entry answers citation marker `[N]`.

mod catalog;
mod locator;
mod source;

pub use catalog::SourceCatalog;
pub use locator::Locator;
pub use source::SourceRef;
