//! Error types for loading, editing and converting ARXML documents.
//!
//! Integrity problems found by validation are never errors: they are
//! accumulated as diagnostics (see [`crate::validate`]). The types here cover
//! failures that abort a single operation and leave the document untouched.

use std::fmt;

use thiserror::Error;

use crate::base::ArPath;
use crate::schema::{Category, SchemaRelease};

/// Byte offset and line/column (1-based) of a parse failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourcePosition {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Compute line and column of `offset` in `source`.
    pub fn locate(source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Self {
            offset,
            line,
            column: (offset - line_start) as u32 + 1,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What went wrong while parsing ARXML bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input is not valid UTF-8.
    InvalidUtf8,
    /// Malformed XML (mismatched tags, bad attribute syntax, ...).
    Syntax(String),
    /// Input ended with open elements.
    UnclosedElement(String),
    /// No root element at all.
    NoRootElement,
    /// Content after the root element was closed.
    MultipleRoots,
    /// Root element is not `AUTOSAR`.
    UnexpectedRoot(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => f.write_str("invalid UTF-8"),
            Self::Syntax(message) => write!(f, "syntax error: {message}"),
            Self::UnclosedElement(tag) => write!(f, "unclosed element <{tag}>"),
            Self::NoRootElement => f.write_str("no root element"),
            Self::MultipleRoots => f.write_str("more than one root element"),
            Self::UnexpectedRoot(tag) => write!(f, "expected root <AUTOSAR>, found <{tag}>"),
        }
    }
}

/// Malformed input. Fatal to a load attempt; no document is created.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("parse error at {position}: {kind}")]
pub struct ParseError {
    pub position: SourcePosition,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a parse error at a byte offset of `source`.
    pub fn at(source: &[u8], offset: usize, kind: ParseErrorKind) -> Self {
        Self {
            position: SourcePosition::locate(source, offset),
            kind,
        }
    }

    /// Create a syntax error at a byte offset of `source`.
    pub fn syntax(source: &[u8], offset: usize, message: impl Into<String>) -> Self {
        Self::at(source, offset, ParseErrorKind::Syntax(message.into()))
    }
}

/// The document does not identify a registered schema release.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaDetectionError {
    #[error("unknown AUTOSAR schema (namespace: {namespace:?}, schemaLocation: {schema_location:?})")]
    UnknownSchema {
        namespace: Option<String>,
        schema_location: Option<String>,
    },
}

impl SchemaDetectionError {
    pub fn unknown(namespace: Option<&str>, schema_location: Option<&str>) -> Self {
        Self::UnknownSchema {
            namespace: namespace.map(str::to_string),
            schema_location: schema_location.map(str::to_string),
        }
    }
}

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaDetectionError),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A mutation precondition was violated. The document is unchanged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("no element at path {0}")]
    NotFound(String),

    #[error("<{parent}> cannot contain <{child}>")]
    InvalidParent { parent: Category, child: Category },

    #[error("path {0} already exists")]
    DuplicateName(ArPath),

    #[error("invalid category '{category}': {reason}")]
    InvalidCategory { category: String, reason: &'static str },

    #[error("cannot move {path} into its own subtree at {target}")]
    Cyclic { path: ArPath, target: ArPath },

    #[error("'{0}' is not a valid short-name")]
    InvalidShortName(String),

    #[error("'{0}' is not a valid attribute name")]
    InvalidAttribute(String),
}

impl ModelError {
    pub fn not_found(path: impl fmt::Display) -> Self {
        Self::NotFound(path.to_string())
    }

    pub fn invalid_parent(parent: &Category, child: &Category) -> Self {
        Self::InvalidParent {
            parent: parent.clone(),
            child: child.clone(),
        }
    }

    pub fn invalid_category(category: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidCategory {
            category: category.into(),
            reason,
        }
    }
}

/// Errors that can occur during release conversion.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert from {from} to {to}")]
    UnsupportedConversion {
        from: SchemaRelease,
        to: SchemaRelease,
    },
}
