use arxml::error::ParseErrorKind;
use arxml::{Document, LoadError, ParseError};
use tempfile::tempdir;

use crate::helpers::assertions::{load, serialize};
use crate::helpers::fixtures::COMPONENTS;

#[test]
fn save_and_load_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("components.arxml");
    let doc = load(COMPONENTS);
    doc.save_file(&path).unwrap();

    let reloaded = Document::load_file(&path).unwrap();
    assert_eq!(serialize(&reloaded), serialize(&doc));
    assert_eq!(std::fs::read(&path).unwrap(), doc.serialize().unwrap());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = Document::load_file(dir.path().join("absent.arxml")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

fn parse_error(input: &[u8]) -> ParseError {
    match Document::load(input) {
        Err(LoadError::Parse(err)) => err,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn wrong_root_is_rejected() {
    let err = parse_error(b"<PROJECT/>");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedRoot("PROJECT".to_string()));
    assert_eq!(err.position.offset, 0);
    assert_eq!(err.to_string(), "parse error at 1:1: expected root <AUTOSAR>, found <PROJECT>");
}

#[test]
fn invalid_utf8_is_reported_at_the_first_bad_byte() {
    let mut input = b"<AUTOSAR>\n  <".to_vec();
    input.push(0xC3);
    input.push(b'(');
    let err = parse_error(&input);
    assert_eq!(err.kind, ParseErrorKind::InvalidUtf8);
    assert_eq!(err.position.offset, 13);
    assert_eq!((err.position.line, err.position.column), (2, 4));
}

#[test]
fn malformed_markup_is_a_syntax_error() {
    let input = br#"<AUTOSAR xmlns="http://autosar.org/schema/r4.0"><AR-PACKAGES></AR-PACKAGE></AUTOSAR>"#;
    assert!(matches!(parse_error(input).kind, ParseErrorKind::Syntax(_)));
}
