//! Quick-fixes: named corrective edits attached to diagnostics.
//!
//! A fix never mutates anything itself. [`QuickFix::plan`] looks at the
//! current document and describes the mutation as an [`Edit`], or returns
//! `None` when there is nothing left to do. Applying goes through
//! [`Document::apply`], the same path as any other mutation, so a fixed
//! document is indistinguishable from one edited by hand. Once applied, the
//! plan comes back empty, which makes every fix idempotent.

use std::fmt;

use crate::base::ArPath;
use crate::base::naming::{is_valid_short_name, sanitize_short_name};
use crate::error::ModelError;
use crate::model::{Document, Edit, ElementId};
use crate::refs::Resolution;

/// The available corrective transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixKind {
    /// Rewrite an invalid SHORT-NAME into a valid, unused one.
    SanitizeShortName,
    /// Set `DEST` to the category actually found at the target.
    RetargetDest,
    /// Delete a reference element with no target text.
    RemoveReference,
    /// Strip leading and trailing whitespace from text content.
    TrimText,
}

impl FixKind {
    pub fn name(self) -> &'static str {
        match self {
            FixKind::SanitizeShortName => "sanitize-short-name",
            FixKind::RetargetDest => "retarget-dest",
            FixKind::RemoveReference => "remove-reference",
            FixKind::TrimText => "trim-text",
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fix bound to the element it corrects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuickFix {
    pub kind: FixKind,
    pub node: ElementId,
}

impl QuickFix {
    pub fn new(kind: FixKind, node: ElementId) -> Self {
        Self { kind, node }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The edit this fix would make to `doc` right now.
    pub fn plan(&self, doc: &Document) -> Option<Edit> {
        let element = doc.element(self.node)?;
        match self.kind {
            FixKind::SanitizeShortName => {
                let current = element.short_name()?;
                if is_valid_short_name(current) {
                    return None;
                }
                let base = match element.parent() {
                    Some(parent) => doc.owning_path(parent),
                    None => ArPath::root(),
                };
                Some(Edit::Rename {
                    node: self.node,
                    short_name: unused_name(doc, &base, &sanitize_short_name(current)),
                })
            }
            FixKind::RetargetDest => match doc.references().resolution(self.node)? {
                Resolution::TypeMismatch { found, .. } => Some(Edit::SetAttribute {
                    node: self.node,
                    name: "DEST".to_string(),
                    value: found.tag().to_string(),
                }),
                _ => None,
            },
            FixKind::RemoveReference => {
                let blank = element.text().is_none_or(|t| t.trim().is_empty());
                blank.then_some(Edit::Delete { node: self.node })
            }
            FixKind::TrimText => {
                let text = element.text()?;
                let trimmed = text.trim();
                (trimmed != text).then(|| Edit::SetText {
                    node: self.node,
                    text: Some(trimmed.to_string()).filter(|t| !t.is_empty()),
                })
            }
        }
    }

    /// Plan and apply. Returns false when there was nothing to do.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, ModelError> {
        match self.plan(doc) {
            Some(edit) => {
                doc.apply(&edit)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// `name` if `base/name` is free, else the first free `name_1`, `name_2`, ...
fn unused_name(doc: &Document, base: &ArPath, name: &str) -> String {
    if !doc.index().contains(&base.join(name)) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !doc.index().contains(&base.join(candidate)))
        .unwrap_or_else(|| name.to_string())
}
