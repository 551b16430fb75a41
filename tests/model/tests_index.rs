use arxml::{ArPath, Category, Document, ElementId, SchemaRelease};

use crate::helpers::assertions::load;
use crate::helpers::fixtures::{COMPONENTS, DUPLICATES};

#[test]
fn prefix_scan_is_document_ordered_and_restartable() {
    let doc = load(COMPONENTS);
    let paths: Vec<String> = doc
        .prefix_scan("/Components")
        .map(|(path, _)| path.to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/Components",
            "/Components/Sensor",
            "/Components/Sensor/SpeedOut",
            "/Components/Sensor/SpeedIn",
        ]
    );

    let again: Vec<String> = doc
        .prefix_scan("/Components")
        .map(|(path, _)| path.to_string())
        .collect();
    assert_eq!(again, paths);
    assert_eq!(doc.prefix_scan("/Missing").count(), 0);
}

#[test]
fn prefix_scan_from_root_covers_every_identifiable_element() {
    let doc = load(COMPONENTS);
    // The root plus 3 packages, 3 packaged elements, 1 data element, 2 ports.
    assert_eq!(doc.prefix_scan("/").count(), 10);
    assert_eq!(doc.index().len(), 10);
}

#[test]
fn uuid_lookup_ignores_case_and_braces() {
    let doc = load(COMPONENTS);
    let speed = doc.lookup_id("/Types/Speed");
    assert!(speed.is_some());
    assert_eq!(
        doc.index().lookup_uuid("0f8fad5b-d9cb-469f-a165-70867728950e"),
        speed
    );
    assert_eq!(
        doc.index().lookup_uuid("{0F8FAD5B-D9CB-469F-A165-70867728950E}"),
        speed
    );
}

#[test]
fn duplicated_input_is_indexed_not_rejected() {
    let doc = load(DUPLICATES);
    let dup = ArPath::parse("/Dup");
    assert_eq!(doc.index().lookup_all(&dup).len(), 2);
    assert_eq!(doc.index().lookup(&dup), Some(doc.index().lookup_all(&dup)[0]));
    let duplicates = doc.index().duplicates();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].0, &dup);
}

#[test]
fn owning_path_skips_wrappers() {
    let doc = load(COMPONENTS);
    let port = doc.lookup("/Components/Sensor/SpeedIn").unwrap();
    let tref = port.children()[0];
    assert_eq!(doc.path_of(tref), None);
    assert_eq!(doc.owning_path(tref).as_str(), "/Components/Sensor/SpeedIn");
}

#[test]
fn rebuild_subtree_reports_unknown_paths() {
    let mut doc = Document::new(SchemaRelease::R20_11);
    doc.create_element("/", "AR-PACKAGE", "Pkg").unwrap();
    assert!(doc.rebuild_subtree("/Pkg"));
    assert!(doc.lookup("/Pkg").is_some());
    assert!(!doc.rebuild_subtree("/Missing"));
}

fn paths(doc: &Document, ids: &[ElementId]) -> Vec<String> {
    ids.iter()
        .map(|id| doc.path_of(*id).unwrap().to_string())
        .collect()
}

#[test]
fn short_name_and_category_lookups_follow_mutations() {
    let mut doc = load(COMPONENTS);
    let speed = doc.lookup_id("/Types/Speed").unwrap();
    assert_eq!(doc.index().lookup_by_short_name("Speed"), vec![speed]);
    assert!(doc.index().lookup_by_short_name("speed").is_empty());
    assert_eq!(
        paths(&doc, &doc.index().lookup_by_category(&Category::ArPackage)),
        vec!["/Components", "/Interfaces", "/Types"]
    );

    doc.rename("/Types/Speed", "Velocity").unwrap();
    assert!(doc.index().lookup_by_short_name("Speed").is_empty());
    assert_eq!(doc.index().lookup_by_short_name("Velocity"), vec![speed]);

    doc.delete("/Components").unwrap();
    assert_eq!(
        paths(&doc, &doc.index().lookup_by_category(&Category::ArPackage)),
        vec!["/Interfaces", "/Types"]
    );
    assert!(doc.index().lookup_by_category(&Category::PPortPrototype).is_empty());
}

#[test]
fn name_search_is_a_case_insensitive_substring_match() {
    let doc = load(COMPONENTS);
    assert_eq!(
        paths(&doc, &doc.index().search_by_name("SPEED")),
        vec![
            "/Components/Sensor/SpeedIn",
            "/Components/Sensor/SpeedOut",
            "/Interfaces/SpeedIf",
            "/Types/Speed",
        ]
    );
    assert_eq!(
        paths(&doc, &doc.index().search_by_name("sens")),
        vec!["/Components/Sensor"]
    );
    assert!(doc.index().search_by_name("brake").is_empty());
}

#[test]
fn rebuilding_a_duplicate_keeps_document_order() {
    let mut doc = load(DUPLICATES);
    let dup = ArPath::parse("/Dup");
    let ids = doc.index().lookup_all(&dup).to_vec();
    assert!(doc.rebuild_subtree("/Dup"));
    assert_eq!(doc.index().lookup_all(&dup), ids.as_slice());
    assert_eq!(doc.index().lookup(&dup), Some(ids[0]));
}
