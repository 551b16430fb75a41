use arxml::{ArPath, Category, Document, ModelError, SchemaRelease};

use crate::helpers::assertions::serialize;

/// `/PackageA/Sub/Leaf` plus an empty `/PackageB`.
fn packages() -> Document {
    let mut doc = Document::new(SchemaRelease::R22_11);
    doc.create_element("/", "AR-PACKAGE", "PackageA").unwrap();
    doc.create_element("/PackageA", "AR-PACKAGE", "Sub").unwrap();
    doc.create_element("/PackageA/Sub", "ELEMENT", "Leaf").unwrap();
    doc.create_element("/", "AR-PACKAGE", "PackageB").unwrap();
    doc
}

// ── Create / delete ─────────────────────────────────────────────────

#[test]
fn created_paths_resolve_and_deleted_paths_do_not() {
    let mut doc = packages();
    let path = doc.create_element("/PackageB", "ELEMENT", "ElementX").unwrap();
    assert_eq!(path.as_str(), "/PackageB/ElementX");
    let id = doc.lookup_id(path.clone()).unwrap();
    assert_eq!(doc.element(id).unwrap().short_name(), Some("ElementX"));

    assert_eq!(doc.delete(path.clone()).unwrap(), path);
    assert!(doc.lookup(path).is_none());
    assert!(doc.element(id).is_none());
}

#[test]
fn duplicate_create_leaves_model_unchanged() {
    let mut doc = packages();
    doc.create_element("/PackageA", "ELEMENT", "ElementX").unwrap();
    let count = doc.len();
    let before = serialize(&doc);

    let err = doc
        .create_element("/PackageA", "ELEMENT", "ElementX")
        .unwrap_err();
    assert_eq!(err, ModelError::DuplicateName(ArPath::parse("/PackageA/ElementX")));
    assert_eq!(doc.len(), count);
    assert_eq!(serialize(&doc), before);
}

#[test]
fn create_accepts_camel_case_categories() {
    let mut doc = packages();
    doc.create_element("/PackageB", "applicationSwComponentType", "Swc")
        .unwrap();
    assert_eq!(
        doc.lookup("/PackageB/Swc").unwrap().category(),
        &Category::ApplicationSwComponentType
    );
}

#[test]
fn create_stamps_uuids_when_enabled() {
    let mut doc = packages();
    doc.set_assign_uuids(true);
    doc.create_element("/PackageB", "ELEMENT", "Stamped").unwrap();
    let element = doc.lookup("/PackageB/Stamped").unwrap();
    let uuid = element.attribute("UUID").unwrap().to_string();
    assert_eq!(
        doc.index().lookup_uuid(&uuid.to_uppercase()),
        doc.lookup_id("/PackageB/Stamped")
    );
}

#[test]
fn root_cannot_be_deleted() {
    let mut doc = packages();
    assert!(matches!(
        doc.delete("/"),
        Err(ModelError::InvalidCategory { .. })
    ));
    assert!(matches!(doc.delete("/Nope"), Err(ModelError::NotFound(_))));
}

// ── Rename ──────────────────────────────────────────────────────────

#[test]
fn rename_moves_every_descendant_path() {
    let mut doc = packages();
    let leaf = doc.lookup_id("/PackageA/Sub/Leaf").unwrap();

    let new_path = doc.rename("/PackageA", "PackageC").unwrap();
    assert_eq!(new_path.as_str(), "/PackageC");
    assert_eq!(doc.lookup_id("/PackageC/Sub/Leaf"), Some(leaf));
    assert_eq!(doc.path_of(leaf).unwrap().as_str(), "/PackageC/Sub/Leaf");
    assert!(doc.lookup("/PackageA").is_none());
    assert!(doc.lookup("/PackageA/Sub").is_none());
    assert!(doc.lookup("/PackageA/Sub/Leaf").is_none());
}

#[test]
fn colliding_rename_fails_atomically() {
    let mut doc = packages();
    let before = serialize(&doc);
    assert_eq!(
        doc.rename("/PackageA", "PackageB").unwrap_err(),
        ModelError::DuplicateName(ArPath::parse("/PackageB"))
    );
    assert!(matches!(
        doc.rename("/PackageA", "not valid"),
        Err(ModelError::InvalidShortName(_))
    ));
    assert_eq!(serialize(&doc), before);
    assert!(doc.lookup("/PackageA/Sub/Leaf").is_some());
}

// ── Move ────────────────────────────────────────────────────────────

#[test]
fn move_into_own_subtree_is_cyclic() {
    let mut doc = packages();
    let before = serialize(&doc);
    assert!(matches!(
        doc.move_element("/PackageA", "/PackageA/Sub"),
        Err(ModelError::Cyclic { .. })
    ));
    assert!(matches!(
        doc.move_element("/PackageA", "/PackageA"),
        Err(ModelError::Cyclic { .. })
    ));
    assert_eq!(serialize(&doc), before);
}

#[test]
fn move_reparents_and_prunes_wrapper() {
    let mut doc = packages();
    let leaf = doc.lookup_id("/PackageA/Sub/Leaf").unwrap();

    let new_path = doc.move_element("/PackageA/Sub/Leaf", "/PackageB").unwrap();
    assert_eq!(new_path.as_str(), "/PackageB/Leaf");
    assert_eq!(doc.lookup_id("/PackageB/Leaf"), Some(leaf));
    assert!(doc.lookup("/PackageA/Sub/Leaf").is_none());
    assert!(doc.lookup("/PackageA/Sub").unwrap().children().is_empty());
}

#[test]
fn move_checks_parent_and_collisions() {
    let mut doc = packages();
    assert!(matches!(
        doc.move_element("/PackageA/Sub/Leaf", "/"),
        Err(ModelError::InvalidParent { .. })
    ));
    doc.create_element("/PackageB", "ELEMENT", "Leaf").unwrap();
    assert_eq!(
        doc.move_element("/PackageA/Sub/Leaf", "/PackageB").unwrap_err(),
        ModelError::DuplicateName(ArPath::parse("/PackageB/Leaf"))
    );
}

// ── Attributes and text ─────────────────────────────────────────────

#[test]
fn attributes_and_text_round_trip_through_the_api() {
    let mut doc = packages();
    assert_eq!(doc.set_attribute("/PackageB", "T", "2024-01-01").unwrap(), None);
    assert_eq!(
        doc.set_attribute("/PackageB", "T", "2025-01-01").unwrap(),
        Some("2024-01-01".to_string())
    );
    assert_eq!(
        doc.remove_attribute("/PackageB", "T").unwrap(),
        Some("2025-01-01".to_string())
    );
    assert!(matches!(
        doc.set_attribute("/PackageB", "1x", "v"),
        Err(ModelError::InvalidAttribute(_))
    ));

    let site = doc
        .add_reference("/PackageA/Sub/Leaf", "REF", "ELEMENT", "/PackageA/Sub/Leaf")
        .unwrap();
    doc.set_text_node(site, Some("/PackageB")).unwrap();
    assert_eq!(doc.element(site).unwrap().text(), Some("/PackageB"));
    doc.set_text_node(site, Some("")).unwrap();
    assert_eq!(doc.element(site).unwrap().text(), None);
}
