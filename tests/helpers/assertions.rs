//! Loading and assertion helpers.

use arxml::refs::ReferenceManager;
use arxml::{Category, Diagnostic, Document, ElementId};

/// Load a fixture, panicking with the error on failure.
pub fn load(source: &str) -> Document {
    match Document::load(source.as_bytes()) {
        Ok(doc) => doc,
        Err(err) => panic!("fixture should load: {err}"),
    }
}

/// The aggregation wrapper of `category` directly under the element at `path`.
pub fn wrapper_of(doc: &Document, path: &str, category: Category) -> ElementId {
    let owner = doc.lookup(path).expect("owner should exist");
    owner
        .children()
        .iter()
        .copied()
        .find(|c| doc.element(*c).is_some_and(|e| e.category() == &category))
        .expect("wrapper should exist")
}

/// Serialize to a UTF-8 string.
pub fn serialize(doc: &Document) -> String {
    let bytes = doc.serialize().expect("serialize should succeed");
    String::from_utf8(bytes).expect("output should be UTF-8")
}

/// Rule ids in diagnostic order.
pub fn rule_ids(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.rule).collect()
}

/// Assert the incrementally maintained references equal a from-scratch scan.
pub fn assert_references_match_rescan(doc: &Document) {
    let fresh = ReferenceManager::scan(doc);
    assert_eq!(
        doc.references().snapshot(),
        fresh.snapshot(),
        "incremental reference state diverged from a full rescan"
    );
}

/// Assert two documents have the same tree shape, categories, short-names,
/// attribute sets and text. Attribute order is not compared.
pub fn assert_structurally_equal(a: &Document, b: &Document) {
    let left: Vec<_> = a.elements().map(|(_, e)| e).collect();
    let right: Vec<_> = b.elements().map(|(_, e)| e).collect();
    assert_eq!(left.len(), right.len(), "element counts differ");
    for (l, r) in left.iter().zip(&right) {
        assert_eq!(l.category(), r.category());
        assert_eq!(l.short_name(), r.short_name());
        let mut la = l.attributes().to_vec();
        let mut ra = r.attributes().to_vec();
        la.sort();
        ra.sort();
        assert_eq!(la, ra, "attributes of {} differ", l.category());
        assert_eq!(l.text(), r.text());
        assert_eq!(l.children().len(), r.children().len());
    }
}
