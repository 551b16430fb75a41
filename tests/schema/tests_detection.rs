use arxml::{LoadError, SchemaDetectionError, SchemaRelease, registry};
use rstest::rstest;

use crate::helpers::assertions::load;

fn root_with(attributes: &str) -> String {
    format!("<AUTOSAR {attributes}><AR-PACKAGES/></AUTOSAR>")
}

#[rstest]
#[case(r#"xmlns="http://autosar.org/schema/r4.0""#, SchemaRelease::R20_11)]
#[case(r#"xmlns="http://autosar.org/schema/r4.1""#, SchemaRelease::R21_11)]
#[case(r#"xmlns="http://autosar.org/schema/r4.2""#, SchemaRelease::R22_11)]
#[case(r#"xmlns="http://autosar.org/schema/r4.4""#, SchemaRelease::R24_11)]
#[case(
    r#"xmlns="urn:vendor" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:vendor AUTOSAR_4-4-0.xsd""#,
    SchemaRelease::R24_11
)]
#[case(r#"xsi:schemaLocation="urn:vendor AUTOSAR_R21.11.xsd""#, SchemaRelease::R21_11)]
fn release_is_detected_from_the_root(#[case] attributes: &str, #[case] expected: SchemaRelease) {
    let doc = load(&root_with(attributes));
    assert_eq!(doc.release(), expected);
    let root = doc.element(doc.root()).unwrap();
    assert_eq!(root.release(), expected);
}

#[test]
fn unknown_schema_is_a_load_error() {
    let source = root_with(r#"xmlns="http://autosar.org/schema/r3.2""#);
    match arxml::Document::load(source.as_bytes()) {
        Err(LoadError::Schema(SchemaDetectionError::UnknownSchema { namespace, .. })) => {
            assert_eq!(namespace.as_deref(), Some("http://autosar.org/schema/r3.2"));
        }
        other => panic!("expected a schema detection error, got {other:?}"),
    }
}

#[test]
fn releases_are_listed_oldest_first() {
    let releases: Vec<SchemaRelease> = registry().supported_releases().collect();
    assert_eq!(releases, SchemaRelease::ALL.to_vec());
    for release in releases {
        assert_eq!(SchemaRelease::from_name(release.name()), Some(release));
        assert_eq!(registry().detect(Some(release.namespace()), None), Ok(release));
    }
}
