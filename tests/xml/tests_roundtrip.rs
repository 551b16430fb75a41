use arxml::{Document, SchemaRelease, SerializeOptions};
use rstest::rstest;

use crate::helpers::assertions::{assert_structurally_equal, load, serialize};
use crate::helpers::fixtures::{COMPONENTS, CROSS_PACKAGE, DUPLICATES, ECUC};

#[rstest]
#[case::cross_package(CROSS_PACKAGE)]
#[case::components(COMPONENTS)]
#[case::ecuc(ECUC)]
#[case::duplicates(DUPLICATES)]
fn saving_twice_gives_identical_bytes(#[case] source: &str) {
    let first = load(source);
    let once = serialize(&first);
    let second = load(&once);
    assert_eq!(serialize(&second), once);
    assert_structurally_equal(&first, &second);
}

#[test]
fn edited_documents_round_trip() {
    let mut doc = load(COMPONENTS);
    doc.rename("/Types/Speed", "VehicleSpeed").unwrap();
    doc.set_attribute("/Components/Sensor", "T", "2024-06-01T00:00:00").unwrap();
    doc.create_element("/Interfaces", "SENDER-RECEIVER-INTERFACE", "StatusIf")
        .unwrap();
    doc.delete("/Components/Sensor/SpeedOut").unwrap();

    let once = serialize(&doc);
    let reloaded = load(&once);
    assert_structurally_equal(&doc, &reloaded);
    assert_eq!(serialize(&reloaded), once);
    assert!(reloaded.lookup("/Types/VehicleSpeed").is_some());
    assert!(reloaded.lookup("/Interfaces/StatusIf").is_some());
}

#[test]
fn output_is_canonical() {
    let source = CROSS_PACKAGE.replace(
        "<ELEMENT>\n          <SHORT-NAME>ElementX</SHORT-NAME>",
        "<ELEMENT T=\"now\" UUID=\"{6f9619ff-8b86-d011-b42d-00c04fc964ff}\">\n          <SHORT-NAME>ElementX</SHORT-NAME>",
    );
    let output = serialize(&load(&source));
    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(output.ends_with("</AUTOSAR>\n"));
    assert!(output.contains("<ELEMENT UUID=\"{6f9619ff-8b86-d011-b42d-00c04fc964ff}\" T=\"now\">"));
    assert!(output.contains("<REF DEST=\"ELEMENT\">/PackageA/ElementX</REF>"));
    assert!(!output.contains('\t'));
}

#[test]
fn special_characters_are_escaped() {
    let mut doc = Document::new(SchemaRelease::R22_11);
    doc.create_element("/", "AR-PACKAGE", "Pkg").unwrap();
    doc.set_attribute("/Pkg", "S", "a<b & \"c\"").unwrap();
    let output = serialize(&doc);
    assert!(output.contains("S=\"a&lt;b &amp; &quot;c&quot;\""));
    let reloaded = load(&output);
    assert_eq!(reloaded.lookup("/Pkg").unwrap().attribute("S"), Some("a<b & \"c\""));
}

#[test]
fn indent_width_is_configurable() {
    let mut doc = Document::new(SchemaRelease::R20_11);
    doc.create_element("/", "AR-PACKAGE", "Pkg").unwrap();
    let options = SerializeOptions {
        indent: 4,
        ..SerializeOptions::default()
    };
    let output = String::from_utf8(doc.serialize_with(&options).unwrap()).unwrap();
    assert!(output.contains(
        "\n    <AR-PACKAGES>\n        <AR-PACKAGE>\n            <SHORT-NAME>Pkg</SHORT-NAME>\n        </AR-PACKAGE>\n    </AR-PACKAGES>\n"
    ));
    let reloaded = Document::load(output.as_bytes()).unwrap();
    assert_structurally_equal(&doc, &reloaded);
}
