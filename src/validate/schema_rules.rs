//! Schema-conformance tier.
//!
//! Checks every element against the content model of its release: child
//! placement, required attributes, attribute lexical constraints and
//! undeclared attributes. An unregistered category is reported once and its
//! whole subtree is treated as open content.

use super::ValidatorConfig;
use super::diagnostic::{Diagnostic, codes};
use crate::model::{Document, ElementId};
use crate::schema::{Category, registry};

/// Schema rule identifiers in registration order.
pub(super) const SCHEMA_RULES: [&str; 5] = [
    codes::CHILD_NOT_PERMITTED,
    codes::MISSING_ATTRIBUTE,
    codes::INVALID_ATTRIBUTE_VALUE,
    codes::UNREGISTERED_CATEGORY,
    codes::UNDECLARED_ATTRIBUTE,
];

pub(super) fn check(doc: &Document, config: &ValidatorConfig) -> Vec<Diagnostic> {
    let registry = registry();
    let release = doc.release();
    let mut out = Vec::new();
    let mut emit = |diagnostic: Diagnostic| {
        if config.is_enabled(diagnostic.rule) {
            out.push(diagnostic);
        }
    };

    let mut stack: Vec<(ElementId, Option<&Category>)> = vec![(doc.root(), None)];
    while let Some((id, parent_category)) = stack.pop() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        let category = element.category();
        let path = doc.owning_path(id);

        let Some(model) = registry.content_model(release, category) else {
            emit(
                Diagnostic::warning(
                    codes::UNREGISTERED_CATEGORY,
                    path,
                    format!("{category} is not part of {release}; its content is not checked"),
                )
                .with_element(id),
            );
            continue;
        };

        if let Some(parent) = parent_category {
            let allowed = registry
                .content_model(release, parent)
                .is_some_and(|m| m.allows(category));
            if !allowed {
                emit(
                    Diagnostic::error(
                        codes::CHILD_NOT_PERMITTED,
                        path.clone(),
                        format!("{category} is not allowed inside {parent}"),
                    )
                    .with_element(id),
                );
            }
        }

        for required in &model.required_attributes {
            if element.attribute(required).is_none() {
                emit(
                    Diagnostic::error(
                        codes::MISSING_ATTRIBUTE,
                        path.clone(),
                        format!("{category} requires attribute {required}"),
                    )
                    .with_element(id),
                );
            }
        }

        for (name, value) in element.attributes() {
            match model.attribute_constraints.get(name) {
                Some(constraint) => {
                    if let Err(reason) = constraint.check(value) {
                        emit(
                            Diagnostic::error(
                                codes::INVALID_ATTRIBUTE_VALUE,
                                path.clone(),
                                format!("attribute {name}: {reason}"),
                            )
                            .with_element(id),
                        );
                    }
                }
                None => emit(
                    Diagnostic::warning(
                        codes::UNDECLARED_ATTRIBUTE,
                        path.clone(),
                        format!("attribute {name} is not declared for {category}"),
                    )
                    .with_element(id),
                ),
            }
        }

        stack.extend(element.children().iter().rev().map(|c| (*c, Some(category))));
    }
    out
}
