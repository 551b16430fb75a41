//! Semantic rules.
//!
//! Each rule is a pure function of the document, its element index and its
//! reference manager. Rules never mutate; corrective edits travel as
//! [`QuickFix`] values on the diagnostics they produce.

use super::diagnostic::{Diagnostic, Severity, codes};
use super::fixes::{FixKind, QuickFix};
use crate::base::naming::is_valid_short_name;
use crate::model::{Document, Element, ElementId, ElementIndex};
use crate::refs::{Occurrence, ReferenceManager, Resolution};
use crate::schema::{Category, registry};

/// Read-only view handed to every rule.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub index: &'a ElementIndex,
    pub references: &'a ReferenceManager,
}

impl<'a> RuleContext<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            index: document.index(),
            references: document.references(),
        }
    }

    fn diagnostic(
        &self,
        rule: &dyn Rule,
        id: ElementId,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(
            rule.severity(),
            rule.id(),
            self.document.owning_path(id),
            message,
        )
        .with_element(id)
    }
}

/// A registrable semantic check.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `REF001`.
    fn id(&self) -> &'static str;

    fn severity(&self) -> Severity;

    /// One-line description of what the rule checks.
    fn description(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

/// The built-in rules in registration order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ShortNameFormat),
        Box::new(DuplicatePath),
        Box::new(DanglingReference),
        Box::new(DestMismatch),
        Box::new(AmbiguousReference),
        Box::new(EmptyReference),
        Box::new(EmptyLeaf),
        Box::new(SurroundingWhitespace),
        Box::new(MissingDefinitionRef),
        Box::new(NonNumericValue),
    ]
}

// ============================================================================
// NAMING
// ============================================================================

struct ShortNameFormat;

impl Rule for ShortNameFormat {
    fn id(&self) -> &'static str {
        codes::SHORT_NAME_FORMAT
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "SHORT-NAME must start with a letter and contain only letters, digits and '_'"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.document
            .elements()
            .filter_map(|(id, element)| {
                let name = element.short_name()?;
                if is_valid_short_name(name) {
                    return None;
                }
                Some(
                    ctx.diagnostic(self, id, format!("invalid SHORT-NAME '{name}'"))
                        .with_fix(QuickFix::new(FixKind::SanitizeShortName, id)),
                )
            })
            .collect()
    }
}

struct DuplicatePath;

impl Rule for DuplicatePath {
    fn id(&self) -> &'static str {
        codes::DUPLICATE_PATH
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "no two elements may share a path"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (path, ids) in ctx.index.duplicates() {
            for id in ids {
                out.push(ctx.diagnostic(
                    self,
                    *id,
                    format!("path {path} is shared by {} elements", ids.len()),
                ));
            }
        }
        out
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// Occurrences with their current resolution, ordered by site.
fn resolved_sites(
    references: &ReferenceManager,
) -> impl Iterator<Item = (&Occurrence, &str, &Resolution)> + '_ {
    references.occurrences().into_iter().filter_map(move |occurrence| {
        let resolution = references.resolution_of(occurrence)?;
        Some((occurrence, occurrence.text.trim(), resolution))
    })
}

/// Fixes rewrite the reference element, so attribute sites get none.
fn text_site_fix(occurrence: &Occurrence, kind: FixKind) -> Option<QuickFix> {
    (!occurrence.is_attribute()).then(|| QuickFix::new(kind, occurrence.site))
}

fn describe(occurrence: &Occurrence, text: &str) -> String {
    match &occurrence.attribute {
        Some(name) => format!("reference '{text}' in attribute {name}"),
        None => format!("reference '{text}'"),
    }
}

struct DanglingReference;

impl Rule for DanglingReference {
    fn id(&self) -> &'static str {
        codes::DANGLING_REFERENCE
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "every reference must point at an existing element"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        resolved_sites(ctx.references)
            .filter(|(_, text, resolution)| {
                !text.is_empty() && matches!(resolution, Resolution::Dangling)
            })
            .map(|(occurrence, text, _)| {
                ctx.diagnostic(
                    self,
                    occurrence.site,
                    format!("{} does not resolve", describe(occurrence, text)),
                )
            })
            .collect()
    }
}

struct DestMismatch;

impl Rule for DestMismatch {
    fn id(&self) -> &'static str {
        codes::DEST_MISMATCH
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "the target category must match DEST"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        resolved_sites(ctx.references)
            .filter_map(|(occurrence, text, resolution)| match resolution {
                Resolution::TypeMismatch {
                    expected, found, ..
                } => {
                    let diagnostic = ctx.diagnostic(
                        self,
                        occurrence.site,
                        format!(
                            "{} expects {expected} but targets {found}",
                            describe(occurrence, text)
                        ),
                    );
                    Some(match text_site_fix(occurrence, FixKind::RetargetDest) {
                        Some(fix) => diagnostic.with_fix(fix),
                        None => diagnostic,
                    })
                }
                _ => None,
            })
            .collect()
    }
}

struct AmbiguousReference;

impl Rule for AmbiguousReference {
    fn id(&self) -> &'static str {
        codes::AMBIGUOUS_REFERENCE
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "a reference must name exactly one element"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        resolved_sites(ctx.references)
            .filter_map(|(occurrence, text, resolution)| match resolution {
                Resolution::Ambiguous(candidates) => Some(ctx.diagnostic(
                    self,
                    occurrence.site,
                    format!(
                        "{} matches {} elements",
                        describe(occurrence, text),
                        candidates.len()
                    ),
                )),
                _ => None,
            })
            .collect()
    }
}

struct EmptyReference;

impl Rule for EmptyReference {
    fn id(&self) -> &'static str {
        codes::EMPTY_REFERENCE
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "a reference element must contain a path"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        resolved_sites(ctx.references)
            .filter(|(_, text, _)| text.is_empty())
            .map(|(occurrence, _, _)| {
                let diagnostic =
                    ctx.diagnostic(self, occurrence.site, "reference has no target path");
                match text_site_fix(occurrence, FixKind::RemoveReference) {
                    Some(fix) => diagnostic.with_fix(fix),
                    None => diagnostic,
                }
            })
            .collect()
    }
}

// ============================================================================
// CONTENT
// ============================================================================

/// Registered leaf categories (no SHORT-NAME, no children) that are not references.
fn is_plain_leaf(doc: &Document, element: &Element) -> bool {
    registry()
        .content_model(doc.release(), element.category())
        .is_some_and(|m| !m.identifiable && !m.reference && m.allowed_children.is_empty())
}

struct EmptyLeaf;

impl Rule for EmptyLeaf {
    fn id(&self) -> &'static str {
        codes::EMPTY_LEAF
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &'static str {
        "leaf elements usually carry a value"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.document
            .elements()
            .filter(|(_, element)| {
                element.text().is_none()
                    && element.children().is_empty()
                    && is_plain_leaf(ctx.document, element)
            })
            .map(|(id, element)| {
                ctx.diagnostic(self, id, format!("{} is empty", element.category()))
            })
            .collect()
    }
}

struct SurroundingWhitespace;

impl Rule for SurroundingWhitespace {
    fn id(&self) -> &'static str {
        codes::SURROUNDING_WHITESPACE
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &'static str {
        "text content should not start or end with whitespace"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.document
            .elements()
            .filter_map(|(id, element)| {
                let text = element.text()?;
                if !element.children().is_empty() || text.trim() == text {
                    return None;
                }
                Some(
                    ctx.diagnostic(
                        self,
                        id,
                        format!("{} text has surrounding whitespace", element.category()),
                    )
                    .with_fix(QuickFix::new(FixKind::TrimText, id)),
                )
            })
            .collect()
    }
}

// ============================================================================
// ECUC
// ============================================================================

/// Direct child of `element` with the given category.
fn child_of<'a>(doc: &'a Document, element: &Element, category: &Category) -> Option<&'a Element> {
    element
        .children()
        .iter()
        .filter_map(|c| doc.element(*c))
        .find(|c| c.category() == category)
}

struct MissingDefinitionRef;

impl Rule for MissingDefinitionRef {
    fn id(&self) -> &'static str {
        codes::MISSING_DEFINITION_REF
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn description(&self) -> &'static str {
        "ECUC values must name their definition"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.document
            .elements()
            .filter(|(_, element)| {
                element.category().is_ecuc_value()
                    && child_of(ctx.document, element, &Category::DefinitionRef).is_none()
            })
            .map(|(id, element)| {
                ctx.diagnostic(self, id, format!("{} has no DEFINITION-REF", element.category()))
            })
            .collect()
    }
}

/// Decimal, float, `INF`/`NaN`, or a `0x`/`0b` prefixed integer.
fn is_numeric(text: &str) -> bool {
    let text = text.trim();
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).is_ok();
    }
    if let Some(bin) = unsigned.strip_prefix("0b").or_else(|| unsigned.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).is_ok();
    }
    text.parse::<f64>().is_ok()
}

struct NonNumericValue;

impl Rule for NonNumericValue {
    fn id(&self) -> &'static str {
        codes::NON_NUMERIC_VALUE
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn description(&self) -> &'static str {
        "numerical parameter values must be numbers"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.document
            .elements()
            .filter(|(_, element)| element.category() == &Category::EcucNumericalParamValue)
            .filter_map(|(id, element)| {
                let value = child_of(ctx.document, element, &Category::Value)?.text()?;
                (!is_numeric(value)).then(|| {
                    ctx.diagnostic(self, id, format!("'{}' is not a number", value.trim()))
                })
            })
            .collect()
    }
}
