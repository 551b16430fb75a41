use arxml::validate::codes;
use arxml::{ConversionError, Document, SchemaRelease, Severity, validate};

use crate::helpers::assertions::{assert_references_match_rescan, load, rule_ids, serialize};
use crate::helpers::fixtures::COMPONENTS;

const SECURED: &str = r#"<AUTOSAR xmlns="http://autosar.org/schema/r4.2">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Sec</SHORT-NAME>
      <ELEMENTS>
        <SECURE-COM-PROPS-SET>
          <SHORT-NAME>Props</SHORT-NAME>
        </SECURE-COM-PROPS-SET>
        <ELEMENT>
          <SHORT-NAME>User</SHORT-NAME>
          <REF DEST="SECURE-COM-PROPS-SET">/Sec/Props</REF>
        </ELEMENT>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>
"#;

#[test]
fn unchanged_categories_convert_silently() {
    let doc = load(COMPONENTS);
    let (converted, diagnostics) = doc.convert(SchemaRelease::R20_11).unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(converted.release(), SchemaRelease::R20_11);
    assert_eq!(converted.references().statistics().resolved, 3);
    assert!(validate(&converted).is_empty());

    let reloaded = load(&serialize(&converted));
    assert_eq!(reloaded.release(), SchemaRelease::R20_11);
}

#[test]
fn downgrade_restores_the_old_tag() {
    let doc = load(SECURED);
    let (converted, diagnostics) = doc.convert(SchemaRelease::R21_11).unwrap();
    assert_eq!(
        rule_ids(&diagnostics),
        vec![codes::REMAPPED_CATEGORY, codes::REMAPPED_CATEGORY]
    );
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Info));
    assert_eq!(
        converted.lookup("/Sec/Props").unwrap().category().tag(),
        "SECURE-COM-PROPS"
    );
    assert_eq!(converted.references().statistics().resolved, 1);
    assert_references_match_rescan(&converted);

    let output = serialize(&converted);
    assert!(output.contains("<REF DEST=\"SECURE-COM-PROPS\">/Sec/Props</REF>"));
    assert!(output.contains("xmlns=\"http://autosar.org/schema/r4.1\""));

    // The source document is untouched.
    assert_eq!(doc.release(), SchemaRelease::R22_11);
    assert_eq!(
        doc.lookup("/Sec/Props").unwrap().category().tag(),
        "SECURE-COM-PROPS-SET"
    );
}

#[test]
fn converting_to_the_same_release_is_rejected() {
    let doc = Document::new(SchemaRelease::R24_11);
    assert_eq!(
        doc.convert(SchemaRelease::R24_11).unwrap_err(),
        ConversionError::UnsupportedConversion {
            from: SchemaRelease::R24_11,
            to: SchemaRelease::R24_11,
        }
    );
}
