use pretty_assertions::assert_eq;

use super::*;
use crate::Locator;

fn catalog() -> SourceCatalog {
    vec![
        SourceRef::new("policy.pdf").with_location(Locator::Page(2)),
        SourceRef::new("faq.docx"),
        SourceRef::new("prices.xlsx").with_location(Locator::Cell("B3".into())),
    ]
    .into()
}

#[test_log::test]
fn test_get_is_one_indexed() {
    let catalog = catalog();

    assert_eq!(catalog.get(0), None);
    assert_eq!(
        catalog.get(1).and_then(|s| s.document_name.as_deref()),
        Some("policy.pdf")
    );
    assert_eq!(
        catalog.get(3).and_then(|s| s.document_name.as_deref()),
        Some("prices.xlsx")
    );
    assert_eq!(catalog.get(4), None);
    assert_eq!(catalog.get(usize::MAX), None);
}

#[test_log::test]
fn test_replace_does_not_merge() {
    let mut catalog = catalog();
    catalog.replace(vec![SourceRef::new("other.txt")]);

    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.get(1).and_then(|s| s.document_name.as_deref()),
        Some("other.txt")
    );
    assert_eq!(catalog.get(2), None);

    catalog.replace(vec![]);
    assert!(catalog.is_empty());
}

#[test_log::test]
fn test_order_is_preserved() {
    let catalog = catalog();
    let names = catalog
        .iter()
        .filter_map(|s| s.document_name.as_deref())
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["policy.pdf", "faq.docx", "prices.xlsx"]);
}

#[test_log::test]
fn test_duplicates_are_kept() {
    let catalog = SourceCatalog::from_iter([SourceRef::new("a.pdf"), SourceRef::new("a.pdf")]);
    assert_eq!(catalog.len(), 2);
}
