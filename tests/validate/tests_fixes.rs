use arxml::validate::{FixKind, codes};
use arxml::{Document, validate};

use crate::helpers::assertions::{assert_references_match_rescan, load, rule_ids, serialize};

/// One finding per quick-fix kind.
const FIXABLE: &str = r#"<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Pkg</SHORT-NAME>
      <ELEMENTS>
        <ELEMENT>
          <SHORT-NAME>Target</SHORT-NAME>
        </ELEMENT>
        <ELEMENT>
          <SHORT-NAME>1bad</SHORT-NAME>
          <REF DEST="CONTAINER">/Pkg/Target</REF>
          <REF DEST="ELEMENT">  /Pkg/Target </REF>
          <REF DEST="ELEMENT"></REF>
        </ELEMENT>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>
"#;

fn apply_all(doc: &mut Document) -> usize {
    let mut applied = 0;
    for diagnostic in validate(doc) {
        if let Some(fix) = diagnostic.fix {
            if fix.apply(doc).unwrap() {
                applied += 1;
            }
        }
    }
    applied
}

#[test]
fn every_finding_offers_its_fix() {
    let doc = load(FIXABLE);
    let diagnostics = validate(&doc);
    assert_eq!(
        rule_ids(&diagnostics),
        vec![
            codes::SHORT_NAME_FORMAT,
            codes::DEST_MISMATCH,
            codes::SURROUNDING_WHITESPACE,
            codes::EMPTY_REFERENCE,
        ]
    );
    let kinds: Vec<FixKind> = diagnostics
        .iter()
        .map(|d| d.fix.map(|f| f.kind).unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            FixKind::SanitizeShortName,
            FixKind::RetargetDest,
            FixKind::TrimText,
            FixKind::RemoveReference,
        ]
    );
}

#[test]
fn applying_fixes_clears_the_findings() {
    let mut doc = load(FIXABLE);
    assert_eq!(apply_all(&mut doc), 4);
    assert!(validate(&doc).is_empty());
    assert_references_match_rescan(&doc);

    let renamed = doc.lookup("/Pkg/N1bad").unwrap();
    assert_eq!(renamed.children().len(), 2);
    let dests: Vec<_> = renamed
        .children()
        .iter()
        .map(|c| doc.element(*c).unwrap().attribute("DEST").unwrap())
        .collect();
    assert_eq!(dests, vec!["ELEMENT", "ELEMENT"]);
    assert_eq!(doc.references().statistics().resolved, 2);
}

#[test]
fn fixes_are_idempotent() {
    let mut doc = load(FIXABLE);
    let fixes: Vec<_> = validate(&doc).into_iter().filter_map(|d| d.fix).collect();
    for fix in &fixes {
        assert!(fix.apply(&mut doc).unwrap(), "{} should apply once", fix.name());
    }
    let after = serialize(&doc);
    for fix in &fixes {
        assert_eq!(fix.plan(&doc), None);
        assert!(!fix.apply(&mut doc).unwrap());
    }
    assert_eq!(serialize(&doc), after);
}

#[test]
fn sanitized_names_avoid_siblings() {
    let source = FIXABLE.replace(
        "<SHORT-NAME>Target</SHORT-NAME>",
        "<SHORT-NAME>N1bad</SHORT-NAME>",
    );
    let mut doc = load(&source);
    let diagnostic = validate(&doc)
        .into_iter()
        .find(|d| d.rule == codes::SHORT_NAME_FORMAT)
        .unwrap();
    assert!(diagnostic.fix.unwrap().apply(&mut doc).unwrap());
    assert!(doc.lookup("/Pkg/N1bad_1").is_some());
    assert!(doc.lookup("/Pkg/N1bad").is_some());
}
