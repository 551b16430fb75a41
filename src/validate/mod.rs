//! Two-tier validation.
//!
//! The schema tier checks every element against the content model of the
//! document's release. The semantic tier runs a registry of [`Rule`]s over
//! the document, its element index and its reference manager. Semantic
//! findings inside a subtree that failed the schema tier are marked
//! `provisional` (or dropped, see [`ValidatorConfig::semantic_on_invalid`]).
//!
//! Validation is a pure function of the document state. Diagnostics come
//! back ordered by document order of the offending element, then tier, then
//! rule registration order, so two runs over the same state are identical.

mod diagnostic;
mod fixes;
mod rules;
mod schema_rules;

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

pub use diagnostic::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use fixes::{FixKind, QuickFix};
pub use rules::{Rule, RuleContext, builtin_rules};

use crate::base::Name;
use crate::model::{Document, ElementId};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Which rules run and how the semantic tier treats invalid subtrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorConfig {
    disabled: FxHashSet<Name>,
    /// Run semantic rules inside subtrees with schema errors, marking their
    /// diagnostics provisional. When false those diagnostics are dropped.
    pub semantic_on_invalid: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            disabled: FxHashSet::default(),
            semantic_on_invalid: true,
        }
    }
}

impl ValidatorConfig {
    pub fn disable(&mut self, rule: &str) -> &mut Self {
        self.disabled.insert(Name::new(rule));
        self
    }

    pub fn enable(&mut self, rule: &str) -> &mut Self {
        self.disabled.remove(rule);
        self
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        !self.disabled.contains(rule)
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Schema checks plus a registry of semantic rules.
pub struct Validator {
    rules: IndexMap<&'static str, Box<dyn Rule>>,
    config: ValidatorConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl Validator {
    /// A validator with every built-in rule registered.
    pub fn new() -> Self {
        let mut validator = Self::empty();
        for rule in builtin_rules() {
            validator.register_boxed(rule);
        }
        validator
    }

    /// A validator running only the schema tier until rules are registered.
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ValidatorConfig {
        &mut self.config
    }

    /// Register a semantic rule. A rule with the same id is replaced in place.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.register_boxed(Box::new(rule));
    }

    fn register_boxed(&mut self, rule: Box<dyn Rule>) {
        self.rules.insert(rule.id(), rule);
    }

    /// Ids of the registered semantic rules, in registration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    /// Run both tiers over `doc`.
    pub fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        let positions: FxHashMap<ElementId, usize> = doc
            .elements()
            .enumerate()
            .map(|(position, (id, _))| (id, position))
            .collect();
        let position_of =
            |d: &Diagnostic| d.element.and_then(|e| positions.get(&e).copied()).unwrap_or(usize::MAX);

        let mut keyed: Vec<(usize, u8, usize, Diagnostic)> = Vec::new();
        let mut invalid = FxHashSet::default();
        for diagnostic in schema_rules::check(doc, &self.config) {
            if diagnostic.severity == Severity::Error {
                invalid.extend(diagnostic.element);
            }
            let rank = schema_rules::SCHEMA_RULES
                .iter()
                .position(|r| *r == diagnostic.rule)
                .unwrap_or(schema_rules::SCHEMA_RULES.len());
            keyed.push((position_of(&diagnostic), 0, rank, diagnostic));
        }

        let ctx = RuleContext::new(doc);
        for (rank, rule) in self.rules.values().enumerate() {
            if !self.config.is_enabled(rule.id()) {
                continue;
            }
            for mut diagnostic in rule.check(&ctx) {
                if in_invalid_subtree(doc, &invalid, diagnostic.element) {
                    if !self.config.semantic_on_invalid {
                        continue;
                    }
                    diagnostic.provisional = true;
                }
                keyed.push((position_of(&diagnostic), 1, rank, diagnostic));
            }
        }

        keyed.sort_by_key(|(position, tier, rank, _)| (*position, *tier, *rank));
        let diagnostics: Vec<Diagnostic> = keyed.into_iter().map(|(.., d)| d).collect();
        debug!(
            diagnostics = diagnostics.len(),
            errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count(),
            "validation complete"
        );
        diagnostics
    }
}

/// Whether `element` or one of its ancestors failed the schema tier.
fn in_invalid_subtree(
    doc: &Document,
    invalid: &FxHashSet<ElementId>,
    element: Option<ElementId>,
) -> bool {
    if invalid.is_empty() {
        return false;
    }
    let mut current = element;
    while let Some(id) = current {
        if invalid.contains(&id) {
            return true;
        }
        current = doc.element(id).and_then(|e| e.parent());
    }
    false
}

/// Validate with the built-in rules and default configuration.
pub fn validate(doc: &Document) -> Vec<Diagnostic> {
    Validator::new().validate(doc)
}
