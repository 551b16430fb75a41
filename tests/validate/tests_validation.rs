use arxml::validate::codes;
use arxml::{Document, SchemaRelease, Severity, Validator, ValidatorConfig, validate};

use crate::helpers::assertions::{load, rule_ids};
use crate::helpers::fixtures::{COMPONENTS, CROSS_PACKAGE, DUPLICATES, ECUC};

#[test]
fn clean_fixtures_have_no_findings() {
    assert!(validate(&load(CROSS_PACKAGE)).is_empty());
    assert!(validate(&load(COMPONENTS)).is_empty());
    assert!(validate(&Document::new(SchemaRelease::R24_11)).is_empty());
}

#[test]
fn ecuc_values_are_checked() {
    let doc = load(ECUC);
    let diagnostics = validate(&doc);
    assert_eq!(
        rule_ids(&diagnostics),
        vec![codes::NON_NUMERIC_VALUE, codes::MISSING_DEFINITION_REF]
    );
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].path.as_str(), "/EcucValues/CanIfValues/General");
    assert!(diagnostics[0].message.contains("fast"));
    assert_eq!(diagnostics[1].severity, Severity::Error);
}

#[test]
fn duplicates_report_each_element_and_the_ambiguous_reference() {
    let doc = load(DUPLICATES);
    let diagnostics = validate(&doc);
    assert_eq!(
        rule_ids(&diagnostics),
        vec![
            codes::DUPLICATE_PATH,
            codes::DUPLICATE_PATH,
            codes::AMBIGUOUS_REFERENCE
        ]
    );
    assert_ne!(diagnostics[0].element, diagnostics[1].element);
    assert_eq!(diagnostics[2].path.as_str(), "/User/Holder");
}

#[test]
fn repeated_runs_are_identical() {
    for fixture in [CROSS_PACKAGE, COMPONENTS, ECUC, DUPLICATES] {
        let doc = load(fixture);
        assert_eq!(validate(&doc), validate(&doc));
    }
}

#[test]
fn disabled_rules_are_skipped() {
    let doc = load(ECUC);
    let mut config = ValidatorConfig::default();
    config.disable(codes::NON_NUMERIC_VALUE);
    let diagnostics = Validator::new().with_config(config).validate(&doc);
    assert_eq!(rule_ids(&diagnostics), vec![codes::MISSING_DEFINITION_REF]);

    let mut validator = Validator::new();
    validator
        .config_mut()
        .disable(codes::NON_NUMERIC_VALUE)
        .disable(codes::MISSING_DEFINITION_REF);
    assert!(validator.validate(&doc).is_empty());
    validator.config_mut().enable(codes::NON_NUMERIC_VALUE);
    assert_eq!(
        rule_ids(&validator.validate(&doc)),
        vec![codes::NON_NUMERIC_VALUE]
    );
}

#[test]
fn schema_tier_runs_without_semantic_rules() {
    let source = CROSS_PACKAGE.replace("<REF DEST=\"ELEMENT\">", "<REF>");
    let doc = load(&source);
    let diagnostics = Validator::empty().validate(&doc);
    assert_eq!(rule_ids(&diagnostics), vec![codes::MISSING_ATTRIBUTE]);
    assert_eq!(diagnostics[0].path.as_str(), "/PackageB/Ref");
    assert!(Validator::empty().validate(&load(ECUC)).is_empty());
}

#[test]
fn unregistered_categories_are_open_content() {
    let source = CROSS_PACKAGE.replace(
        "<SHORT-NAME>ElementX</SHORT-NAME>",
        "<SHORT-NAME>ElementX</SHORT-NAME><VENDOR-DATA><ANYTHING x=\"1\"/></VENDOR-DATA>",
    );
    let doc = load(&source);
    let diagnostics = validate(&doc);
    assert_eq!(rule_ids(&diagnostics), vec![codes::UNREGISTERED_CATEGORY]);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].path.as_str(), "/PackageA/ElementX");
    assert!(!diagnostics[0].provisional);
}

#[test]
fn integer_attributes_are_range_checked() {
    let with_index = |value: &str| {
        ECUC.replace(
            "<ECUC-NUMERICAL-PARAM-VALUE>",
            &format!("<ECUC-NUMERICAL-PARAM-VALUE INDEX=\"{value}\">"),
        )
    };
    assert!(Validator::empty().validate(&load(&with_index("3"))).is_empty());

    let diagnostics = Validator::empty().validate(&load(&with_index("-1")));
    assert_eq!(rule_ids(&diagnostics), vec![codes::INVALID_ATTRIBUTE_VALUE]);
    assert_eq!(diagnostics[0].path.as_str(), "/EcucValues/CanIfValues/General");
    assert!(diagnostics[0].message.contains("INDEX"));
    assert!(diagnostics[0].message.contains("outside"));

    let diagnostics = Validator::empty().validate(&load(&with_index("first")));
    assert!(diagnostics[0].message.contains("not an integer"));
}
