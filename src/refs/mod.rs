//! Reference occurrences and their resolution.
//!
//! A reference occurrence is a path value sited in an element. Most live in
//! element text, for example
//! `<TYPE-TREF DEST="APPLICATION-PRIMITIVE-DATA-TYPE">/Types/Speed</TYPE-TREF>`;
//! a few live in attributes the content model declares as reference-bearing,
//! in which case the model also fixes the expected category.
//! Resolution is two-phase: [`ReferenceManager::scan`] collects occurrences,
//! then each one is resolved through the element index. After a mutation,
//! [`ReferenceManager::refresh`] rescans only the changed sites and
//! re-resolves only occurrences whose target path lies under an affected
//! prefix, found with an ordered range scan over target paths.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::base::{ArPath, Name};
use crate::model::{ChangeTracker, Document, ElementId};
use crate::schema::{Category, registry};

// ============================================================================
// TYPES
// ============================================================================

/// An element plus the attribute holding the path; `None` means text content.
type SiteKey = (ElementId, Option<Name>);

/// One reference sited in a document element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    /// The element carrying the reference.
    pub site: ElementId,
    /// Attribute holding the path; `None` for text content.
    pub attribute: Option<Name>,
    /// Category of the site element (`REF`, `TYPE-TREF`, ...).
    pub category: Category,
    /// Path relative references are resolved against.
    pub base: ArPath,
    /// Raw path value.
    pub text: String,
    /// Absolute target path; `None` when the value is blank.
    pub target: Option<ArPath>,
    /// Expected target category: the `DEST` attribute for text sites, the
    /// content model for attribute sites.
    pub dest: Option<Category>,
}

impl Occurrence {
    fn key(&self) -> SiteKey {
        (self.site, self.attribute.clone())
    }

    pub fn is_attribute(&self) -> bool {
        self.attribute.is_some()
    }
}

/// Outcome of resolving one occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ElementId),
    /// No element at the target path (or no target at all).
    Dangling,
    /// The target exists but its category differs from `DEST`.
    TypeMismatch {
        target: ElementId,
        expected: Category,
        found: Category,
    },
    /// Several elements share the target path. Handles are sorted.
    Ambiguous(Vec<ElementId>),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The element the reference points at, if there is exactly one.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Resolved(id) | Self::TypeMismatch { target: id, .. } => Some(*id),
            Self::Dangling | Self::Ambiguous(_) => None,
        }
    }
}

/// Counts by resolution outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReferenceStatistics {
    pub total: usize,
    pub resolved: usize,
    pub dangling: usize,
    pub mismatched: usize,
    pub ambiguous: usize,
}

// ============================================================================
// MANAGER
// ============================================================================

/// Every reference occurrence of one document, with cached resolutions.
#[derive(Clone, Debug, Default)]
pub struct ReferenceManager {
    /// Occurrences per site element, text site first.
    occurrences: FxHashMap<ElementId, Vec<Occurrence>>,
    resolutions: FxHashMap<SiteKey, Resolution>,
    /// Target path → sites, ordered for prefix range scans.
    by_target: BTreeMap<ArPath, FxHashSet<SiteKey>>,
}

impl ReferenceManager {
    /// Collect and resolve every occurrence in the document.
    pub fn scan(doc: &Document) -> Self {
        let mut manager = Self::default();
        for (id, _) in doc.elements() {
            for occurrence in Self::occurrences_at(doc, id) {
                manager.insert(doc, occurrence);
            }
        }
        debug!(
            occurrences = manager.len(),
            dangling = manager.statistics().dangling,
            "reference scan complete"
        );
        manager
    }

    /// Build the occurrences sited at `id`: its text when the element is a
    /// reference, then each reference-bearing attribute that is present.
    pub fn occurrences_at(doc: &Document, id: ElementId) -> Vec<Occurrence> {
        let Some(element) = doc.element(id) else {
            return Vec::new();
        };
        let registry = registry();
        let mut out = Vec::new();
        if registry.is_reference(doc.release(), element.category()) {
            let base = match element.parent() {
                Some(parent) => doc.owning_path(parent),
                None => ArPath::root(),
            };
            let text = element.text().unwrap_or_default().to_string();
            let dest = element
                .attribute("DEST")
                .map(|d| Category::from_tag(d.trim()));
            out.push(Self::make_occurrence(id, None, element.category(), base, text, dest));
        }
        let Some(model) = registry.content_model(doc.release(), element.category()) else {
            return out;
        };
        for (name, dest) in &model.reference_attributes {
            let Some(value) = element.attribute(name) else {
                continue;
            };
            out.push(Self::make_occurrence(
                id,
                Some(name.clone()),
                element.category(),
                doc.owning_path(id),
                value.to_string(),
                Some(dest.clone()),
            ));
        }
        out
    }

    fn make_occurrence(
        site: ElementId,
        attribute: Option<Name>,
        category: &Category,
        base: ArPath,
        text: String,
        dest: Option<Category>,
    ) -> Occurrence {
        let trimmed = text.trim();
        let target = (!trimmed.is_empty()).then(|| ArPath::resolve(&base, trimmed));
        Occurrence {
            site,
            attribute,
            category: category.clone(),
            base,
            text,
            target,
            dest,
        }
    }

    /// Resolve an occurrence against the current index. Pure.
    pub fn resolve(doc: &Document, occurrence: &Occurrence) -> Resolution {
        let Some(target) = &occurrence.target else {
            return Resolution::Dangling;
        };
        let resolution = match doc.index().lookup_all(target) {
            [] => Resolution::Dangling,
            [single] => match (doc.element(*single), &occurrence.dest) {
                (Some(found), Some(expected)) if found.category() != expected => {
                    Resolution::TypeMismatch {
                        target: *single,
                        expected: expected.clone(),
                        found: found.category().clone(),
                    }
                }
                _ => Resolution::Resolved(*single),
            },
            many => {
                let mut handles = many.to_vec();
                handles.sort();
                Resolution::Ambiguous(handles)
            }
        };
        trace!(site = %occurrence.site, attribute = ?occurrence.attribute, %target, ?resolution, "resolve reference");
        resolution
    }

    /// Bring the manager up to date after one committed mutation.
    pub fn refresh(&mut self, doc: &Document, changes: &ChangeTracker) {
        for id in changes.removed_elements() {
            self.remove(id);
        }
        let dirty = changes.dirty_elements();
        for id in &dirty {
            self.remove(*id);
            for occurrence in Self::occurrences_at(doc, *id) {
                self.insert(doc, occurrence);
            }
        }
        let mut stale: Vec<SiteKey> = changes
            .affected_prefixes()
            .iter()
            .flat_map(|prefix| self.sites_under(prefix))
            .collect();
        stale.sort();
        stale.dedup();
        for key in &stale {
            if let Some(occurrence) = self.find(key) {
                let resolution = Self::resolve(doc, occurrence);
                self.resolutions.insert(key.clone(), resolution);
            }
        }
        debug!(
            rescanned = dirty.len(),
            reresolved = stale.len(),
            "references refreshed"
        );
    }

    fn insert(&mut self, doc: &Document, occurrence: Occurrence) {
        let key = occurrence.key();
        let resolution = Self::resolve(doc, &occurrence);
        if let Some(target) = &occurrence.target {
            self.by_target
                .entry(target.clone())
                .or_default()
                .insert(key.clone());
        }
        self.resolutions.insert(key, resolution);
        self.occurrences
            .entry(occurrence.site)
            .or_default()
            .push(occurrence);
    }

    /// Drop every occurrence sited at `site`.
    fn remove(&mut self, site: ElementId) {
        let Some(occurrences) = self.occurrences.remove(&site) else {
            return;
        };
        for occurrence in occurrences {
            let key = occurrence.key();
            self.resolutions.remove(&key);
            if let Some(target) = occurrence.target {
                if let Some(sites) = self.by_target.get_mut(&target) {
                    sites.remove(&key);
                    if sites.is_empty() {
                        self.by_target.remove(&target);
                    }
                }
            }
        }
    }

    fn find(&self, key: &SiteKey) -> Option<&Occurrence> {
        self.occurrences
            .get(&key.0)?
            .iter()
            .find(|o| o.attribute == key.1)
    }

    /// Sites whose target is `prefix` or lies below it.
    fn sites_under(&self, prefix: &ArPath) -> Vec<SiteKey> {
        if prefix.is_root() {
            return self.by_target.values().flatten().cloned().collect();
        }
        let mut out: Vec<SiteKey> = self
            .by_target
            .get(prefix)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        // '0' sorts right after '/', so this range is exactly "prefix/...".
        let lower = ArPath::bound(format!("{prefix}/"));
        let upper = ArPath::bound(format!("{prefix}0"));
        for sites in self.by_target.range(lower..upper).map(|(_, s)| s) {
            out.extend(sites.iter().cloned());
        }
        out
    }

    // ── Query ───────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// The text occurrence sited at `site`.
    pub fn occurrence(&self, site: ElementId) -> Option<&Occurrence> {
        self.find(&(site, None))
    }

    /// Resolution of the text occurrence sited at `site`.
    pub fn resolution(&self, site: ElementId) -> Option<&Resolution> {
        self.resolutions.get(&(site, None))
    }

    /// Resolution of the occurrence in attribute `name` of `site`.
    pub fn attribute_resolution(&self, site: ElementId, name: &str) -> Option<&Resolution> {
        self.resolutions.get(&(site, Some(Name::new(name))))
    }

    pub fn resolution_of(&self, occurrence: &Occurrence) -> Option<&Resolution> {
        self.resolutions.get(&occurrence.key())
    }

    /// All occurrences, ordered by site handle, text before attributes.
    pub fn occurrences(&self) -> Vec<&Occurrence> {
        let mut out: Vec<_> = self.occurrences.values().flatten().collect();
        out.sort_by(|a, b| (a.site, &a.attribute).cmp(&(b.site, &b.attribute)));
        out
    }

    /// Occurrences that point at the element at `path` (find-all-references).
    pub fn reverse_lookup(&self, path: &ArPath) -> Vec<&Occurrence> {
        let mut sites: Vec<&SiteKey> = self
            .by_target
            .get(path)
            .into_iter()
            .flatten()
            .filter(|key| {
                self.resolutions
                    .get(*key)
                    .and_then(Resolution::target)
                    .is_some()
            })
            .collect();
        sites.sort();
        sites.into_iter().filter_map(|key| self.find(key)).collect()
    }

    /// `(site, attribute, text, resolution)` for every occurrence, in
    /// [`occurrences`](Self::occurrences) order.
    ///
    /// Two managers over the same document state produce equal snapshots.
    pub fn snapshot(&self) -> Vec<(ElementId, Option<Name>, String, Resolution)> {
        self.occurrences()
            .into_iter()
            .map(|o| {
                let resolution = self
                    .resolution_of(o)
                    .cloned()
                    .unwrap_or(Resolution::Dangling);
                (o.site, o.attribute.clone(), o.text.clone(), resolution)
            })
            .collect()
    }

    pub fn statistics(&self) -> ReferenceStatistics {
        let mut stats = ReferenceStatistics {
            total: self.len(),
            ..ReferenceStatistics::default()
        };
        for resolution in self.resolutions.values() {
            match resolution {
                Resolution::Resolved(_) => stats.resolved += 1,
                Resolution::Dangling => stats.dangling += 1,
                Resolution::TypeMismatch { .. } => stats.mismatched += 1,
                Resolution::Ambiguous(_) => stats.ambiguous += 1,
            }
        }
        stats
    }
}
