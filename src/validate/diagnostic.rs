//! Diagnostic records produced by validation and conversion.

use std::fmt;

use super::fixes::QuickFix;
use crate::base::ArPath;
use crate::model::ElementId;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// One finding about one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable rule identifier (see [`codes`]).
    pub rule: &'static str,
    pub message: String,
    /// Path of the offending element, or of its nearest identifiable ancestor.
    pub path: ArPath,
    /// Handle of the offending element.
    pub element: Option<ElementId>,
    /// Optional corrective edit.
    pub fix: Option<QuickFix>,
    /// Reported inside a subtree that failed the schema tier.
    pub provisional: bool,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        rule: &'static str,
        path: ArPath,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            rule,
            message: message.into(),
            path,
            element: None,
            fix: None,
            provisional: false,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(rule: &'static str, path: ArPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, rule, path, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(rule: &'static str, path: ArPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, rule, path, message)
    }

    /// Create a new info diagnostic.
    pub fn info(rule: &'static str, path: ArPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, rule, path, message)
    }

    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_fix(mut self, fix: QuickFix) -> Self {
        self.fix = Some(fix);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}: {}", self.severity, self.rule, self.path, self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable rule identifiers.
///
/// ## Ranges
///
/// - **SCH**: schema conformance
/// - **NAM / UNI**: naming and uniqueness
/// - **REF**: reference integrity
/// - **CONT**: text content
/// - **ECUC**: ECU configuration values
/// - **CNV**: release conversion
pub mod codes {
    /// Child category not permitted under its parent.
    pub const CHILD_NOT_PERMITTED: &str = "SCH001";
    /// Required attribute missing.
    pub const MISSING_ATTRIBUTE: &str = "SCH002";
    /// Attribute value fails its lexical constraint.
    pub const INVALID_ATTRIBUTE_VALUE: &str = "SCH003";
    /// Category not registered in the document's release.
    pub const UNREGISTERED_CATEGORY: &str = "SCH004";
    /// Attribute not declared for the category.
    pub const UNDECLARED_ATTRIBUTE: &str = "SCH005";

    pub const SHORT_NAME_FORMAT: &str = "NAM001";
    pub const DUPLICATE_PATH: &str = "UNI001";

    pub const DANGLING_REFERENCE: &str = "REF001";
    pub const DEST_MISMATCH: &str = "REF002";
    pub const AMBIGUOUS_REFERENCE: &str = "REF003";
    pub const EMPTY_REFERENCE: &str = "REF004";

    pub const EMPTY_LEAF: &str = "CONT001";
    pub const SURROUNDING_WHITESPACE: &str = "CONT002";

    pub const MISSING_DEFINITION_REF: &str = "ECUC001";
    pub const NON_NUMERIC_VALUE: &str = "ECUC002";

    /// Category has no counterpart in the target release.
    pub const UNMAPPED_CATEGORY: &str = "CNV001";
    /// Category (or a DEST naming it) was remapped.
    pub const REMAPPED_CATEGORY: &str = "CNV002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during one pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
