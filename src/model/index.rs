//! Path index over a document's identifiable elements.
//!
//! Paths are a cache keyed by handle: `path_of` remembers each handle's path
//! so entries can be dropped without recomputing, and `by_path` maps back to
//! handles. A path maps to several handles only when loaded input contains
//! duplicates; mutations never create them.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::{Arena, Document, ElementId};
use crate::base::{ArPath, Name};
use crate::schema::Category;

/// Mapping between AUTOSAR paths and element handles.
#[derive(Clone, Debug, Default)]
pub struct ElementIndex {
    /// Handles per path, in document order.
    by_path: FxHashMap<ArPath, Vec<ElementId>>,
    path_of: FxHashMap<ElementId, ArPath>,
    by_short_name: FxHashMap<Name, Vec<ElementId>>,
    by_category: FxHashMap<Category, Vec<ElementId>>,
    by_uuid: FxHashMap<Name, ElementId>,
    uuid_of: FxHashMap<ElementId, Name>,
}

impl ElementIndex {
    pub(crate) fn build(arena: &Arena, root: ElementId) -> Self {
        let mut index = Self::default();
        index.insert_subtree(arena, root);
        index
    }

    // ── Query ───────────────────────────────────────────────────────

    /// First element at `path`, in document order.
    pub fn lookup(&self, path: &ArPath) -> Option<ElementId> {
        self.by_path.get(path)?.first().copied()
    }

    /// Every element at `path`. More than one only for duplicated input.
    pub fn lookup_all(&self, path: &ArPath) -> &[ElementId] {
        self.by_path.get(path).map_or(&[], Vec::as_slice)
    }

    /// Element carrying the given `UUID` attribute (case-insensitive, braces optional).
    pub fn lookup_uuid(&self, uuid: &str) -> Option<ElementId> {
        self.by_uuid.get(&normalize_uuid(uuid)).copied()
    }

    /// Indexed elements with exactly this SHORT-NAME, sorted by path.
    pub fn lookup_by_short_name(&self, short_name: &str) -> Vec<ElementId> {
        self.sorted_by_path(self.by_short_name.get(short_name).into_iter().flatten())
    }

    /// Indexed elements of one category, sorted by path.
    pub fn lookup_by_category(&self, category: &Category) -> Vec<ElementId> {
        self.sorted_by_path(self.by_category.get(category).into_iter().flatten())
    }

    /// Indexed elements whose SHORT-NAME contains `query`, ignoring ASCII
    /// case. Sorted by path.
    pub fn search_by_name(&self, query: &str) -> Vec<ElementId> {
        let query = query.to_ascii_lowercase();
        self.sorted_by_path(
            self.by_short_name
                .iter()
                .filter(|(name, _)| name.to_ascii_lowercase().contains(&query))
                .flat_map(|(_, ids)| ids),
        )
    }

    fn sorted_by_path<'a>(&self, ids: impl Iterator<Item = &'a ElementId>) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = ids.copied().collect();
        out.sort_by(|a, b| self.path_of.get(a).cmp(&self.path_of.get(b)).then(a.cmp(b)));
        out
    }

    pub fn path_of(&self, id: ElementId) -> Option<&ArPath> {
        self.path_of.get(&id)
    }

    pub fn contains(&self, path: &ArPath) -> bool {
        self.by_path.contains_key(path)
    }

    /// Number of distinct paths, the root included.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Paths shared by more than one element, sorted by path.
    pub fn duplicates(&self) -> Vec<(&ArPath, &[ElementId])> {
        let mut out: Vec<_> = self
            .by_path
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(path, ids)| (path, ids.as_slice()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Path of the nearest ancestor-or-self that has one.
    pub(crate) fn owning_path(&self, arena: &Arena, id: ElementId) -> ArPath {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(path) = self.path_of.get(&node) {
                return path.clone();
            }
            current = arena.get(node).and_then(|e| e.parent);
        }
        ArPath::root()
    }

    // ── Maintenance ─────────────────────────────────────────────────

    /// Index an attached subtree. Its parent chain must already be indexed.
    pub(crate) fn insert_subtree(&mut self, arena: &Arena, id: ElementId) {
        let base = match arena.get(id).and_then(|e| e.parent) {
            Some(parent) => self.owning_path(arena, parent),
            None => ArPath::root(),
        };
        let mut stack = vec![(id, base)];
        while let Some((node, base)) = stack.pop() {
            let Some(element) = arena.get(node) else {
                continue;
            };
            let own = if element.parent.is_none() {
                Some(ArPath::root())
            } else if element.has_path_segment() {
                element.short_name.as_deref().map(|name| base.join(name))
            } else {
                None
            };
            if let Some(path) = &own {
                trace!(%path, handle = %node, "index insert");
                self.path_of.insert(node, path.clone());
                let ids = self.by_path.entry(path.clone()).or_default();
                let at = ids.partition_point(|other| {
                    document_order(arena, *other, node) == Ordering::Less
                });
                ids.insert(at, node);
                if let Some(name) = path.name() {
                    self.by_short_name.entry(Name::new(name)).or_default().push(node);
                }
                self.by_category
                    .entry(element.category.clone())
                    .or_default()
                    .push(node);
            }
            self.insert_uuid(node, element.attribute("UUID"));
            let child_base = own.unwrap_or(base);
            for child in element.children.iter().rev() {
                stack.push((*child, child_base.clone()));
            }
        }
    }

    /// Drop every entry of a subtree. Call before its slots are freed.
    pub(crate) fn remove_subtree(&mut self, arena: &Arena, id: ElementId) {
        for node in arena.subtree(id) {
            self.remove_node(arena, node);
        }
    }

    /// Recompute paths for a subtree after a rename or move.
    pub(crate) fn rebuild_subtree(&mut self, arena: &Arena, id: ElementId) {
        self.remove_subtree(arena, id);
        self.insert_subtree(arena, id);
    }

    /// Re-read the `UUID` attribute of one element.
    pub(crate) fn refresh_uuid(&mut self, arena: &Arena, id: ElementId) {
        self.remove_uuid(id);
        self.insert_uuid(id, arena.get(id).and_then(|e| e.attribute("UUID")));
    }

    fn remove_node(&mut self, arena: &Arena, node: ElementId) {
        if let Some(path) = self.path_of.remove(&node) {
            trace!(%path, handle = %node, "index remove");
            remove_handle(&mut self.by_path, &path, node);
            // The stored path still carries the old SHORT-NAME during a rename.
            if let Some(name) = path.name() {
                remove_handle(&mut self.by_short_name, name, node);
            }
            if let Some(element) = arena.get(node) {
                remove_handle(&mut self.by_category, &element.category, node);
            }
        }
        self.remove_uuid(node);
    }

    fn insert_uuid(&mut self, node: ElementId, uuid: Option<&str>) {
        if let Some(uuid) = uuid {
            let key = normalize_uuid(uuid);
            self.by_uuid.entry(key.clone()).or_insert(node);
            self.uuid_of.insert(node, key);
        }
    }

    fn remove_uuid(&mut self, node: ElementId) {
        if let Some(key) = self.uuid_of.remove(&node) {
            if self.by_uuid.get(&key) == Some(&node) {
                self.by_uuid.remove(&key);
            }
        }
    }
}

fn remove_handle<K, Q>(map: &mut FxHashMap<K, Vec<ElementId>>, key: &Q, node: ElementId)
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + ?Sized,
{
    if let Some(ids) = map.get_mut(key) {
        ids.retain(|h| *h != node);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

/// Order two attached handles by their position in the tree.
fn document_order(arena: &Arena, a: ElementId, b: ElementId) -> Ordering {
    let chain = |id: ElementId| {
        let mut out = vec![id];
        let mut current = id;
        while let Some(parent) = arena.get(current).and_then(|e| e.parent) {
            out.push(parent);
            current = parent;
        }
        out.reverse();
        out
    };
    let (left, right) = (chain(a), chain(b));
    let shared = left.iter().zip(&right).take_while(|(x, y)| x == y).count();
    match (left.get(shared), right.get(shared)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let siblings = shared
                .checked_sub(1)
                .and_then(|i| arena.get(left[i]))
                .map_or(&[][..], |e| e.children.as_slice());
            let position = |id: &ElementId| siblings.iter().position(|c| c == id);
            position(x).cmp(&position(y)).then(x.cmp(y))
        }
    }
}

fn normalize_uuid(uuid: &str) -> Name {
    Name::new(
        uuid.trim()
            .trim_matches(|c| c == '{' || c == '}')
            .to_ascii_lowercase(),
    )
}

/// Lazy document-order walk of the identifiable elements under a prefix.
///
/// Yields the prefix element itself first. Restart by calling
/// [`Document::prefix_scan`] again.
pub struct PrefixScan<'a> {
    doc: &'a Document,
    stack: Vec<ElementId>,
}

impl<'a> PrefixScan<'a> {
    pub(crate) fn new(doc: &'a Document, prefix: &ArPath) -> Self {
        let mut stack = doc.index.lookup_all(prefix).to_vec();
        stack.reverse();
        Self { doc, stack }
    }
}

impl<'a> Iterator for PrefixScan<'a> {
    type Item = (&'a ArPath, ElementId);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(element) = self.doc.arena.get(id) else {
                continue;
            };
            self.stack.extend(element.children.iter().rev());
            if let Some(path) = self.doc.index.path_of(id) {
                return Some((path, id));
            }
        }
        None
    }
}
