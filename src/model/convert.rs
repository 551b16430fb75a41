//! Conversion of a document to another schema release.

use tracing::debug;

use super::Document;
use crate::error::ConversionError;
use crate::schema::{Category, CategoryMapping, SchemaRelease, registry};
use crate::validate::{Diagnostic, DiagnosticCollector, codes};

impl Document {
    /// Copy this document into `target`, remapping categories per the static
    /// release table.
    ///
    /// Every element is re-tagged with `target`. Renamed categories take their
    /// new tag, and `DEST` values naming a renamed category follow it; both
    /// are reported as info diagnostics. Categories with no counterpart in
    /// `target` are kept and flagged with a warning. Subscribers are not
    /// carried over. Handles and paths are unchanged, so the diagnostics
    /// address the converted document as well as this one.
    pub fn convert(
        &self,
        target: SchemaRelease,
    ) -> Result<(Document, Vec<Diagnostic>), ConversionError> {
        let registry = registry();
        let from = self.release;
        if !registry.can_convert(from, target) {
            return Err(ConversionError::UnsupportedConversion { from, to: target });
        }

        let mut arena = self.arena.clone();
        let mut diagnostics = DiagnosticCollector::new();
        for id in self.arena.subtree(self.root) {
            let path = self.owning_path(id);
            let Some(element) = arena.get_mut(id) else {
                continue;
            };
            element.release = target;

            match registry.map_category(from, target, &element.category) {
                CategoryMapping::Same => {}
                CategoryMapping::Renamed(new) => {
                    diagnostics.add(
                        Diagnostic::info(
                            codes::REMAPPED_CATEGORY,
                            path.clone(),
                            format!("{} became {new} in {target}", element.category),
                        )
                        .with_element(id),
                    );
                    element.category = new;
                }
                CategoryMapping::Missing => diagnostics.add(
                    Diagnostic::warning(
                        codes::UNMAPPED_CATEGORY,
                        path.clone(),
                        format!("{} has no counterpart in {target}", element.category),
                    )
                    .with_element(id),
                ),
            }

            if !registry.is_reference(from, &element.category) {
                continue;
            }
            let Some(dest) = element.attribute("DEST").map(|d| Category::from_tag(d.trim())) else {
                continue;
            };
            if let CategoryMapping::Renamed(new) = registry.map_category(from, target, &dest) {
                diagnostics.add(
                    Diagnostic::info(
                        codes::REMAPPED_CATEGORY,
                        path,
                        format!("DEST {dest} became {new} in {target}"),
                    )
                    .with_element(id),
                );
                element.set_attribute("DEST", new.tag().to_string());
            }
        }

        if let Some(root) = arena.get_mut(self.root) {
            root.set_attribute("xmlns", target.namespace().to_string());
            if root.attribute("xsi:schemaLocation").is_some() {
                root.set_attribute("xsi:schemaLocation", target.schema_location());
            }
        }

        let diagnostics = diagnostics.finish();
        debug!(
            %from,
            to = %target,
            remarks = diagnostics.len(),
            "converted document"
        );
        Ok((Document::from_parts(target, arena, self.root), diagnostics))
    }
}
