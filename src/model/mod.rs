//! Document model: an arena of ARXML elements with stable handles.
//!
//! Elements live in a `Vec<Option<Element>>` owned by the [`Document`] and are
//! addressed by [`ElementId`]. Deleting a subtree empties its slots; handles
//! are never reused, so a stale handle simply finds nothing.
//!
//! Paths are not stored on elements. The [`ElementIndex`] derives them from
//! the SHORT-NAME chain and caches them per handle. Every mutation updates
//! the index, then refreshes the reference manager, then notifies
//! subscribers, so no intermediate state is observable.

mod convert;
mod editing;
mod events;
mod index;

use std::fmt;
use std::path::Path;

use tracing::debug;

pub use editing::{ChangeTracker, Edit};
pub use events::{ChangeKind, ModelChange, SubscriptionId};
pub use index::{ElementIndex, PrefixScan};

use self::events::Subscribers;
use crate::base::{ArPath, Name};
use crate::error::LoadError;
use crate::refs::ReferenceManager;
use crate::schema::{Category, SchemaRelease};
use crate::xml::{self, SerializeOptions};

/// Namespace of the `xsi:` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

// ============================================================================
// ELEMENTS
// ============================================================================

/// Stable handle to an element of one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub(crate) category: Category,
    pub(crate) attributes: Vec<(Name, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) short_name: Option<Name>,
    pub(crate) release: SchemaRelease,
}

impl Element {
    pub(crate) fn new(category: Category, release: SchemaRelease) -> Self {
        Self {
            category,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            short_name: None,
            release,
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Attributes in document (insertion) order.
    pub fn attributes(&self) -> &[(Name, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// The SHORT-NAME, if this element is identifiable.
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn release(&self) -> SchemaRelease {
        self.release
    }

    /// Whether this element contributes a segment to paths.
    pub(crate) fn has_path_segment(&self) -> bool {
        self.short_name.as_ref().is_some_and(|n| !n.is_empty())
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: String) -> Option<String> {
        match self.attributes.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.attributes.push((Name::new(name), value));
                None
            }
        }
    }

    pub(crate) fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(n, _)| n.as_str() == name)?;
        Some(self.attributes.remove(pos).1)
    }
}

// ============================================================================
// ARENA
// ============================================================================

/// Slot storage for elements. Freed slots stay `None`.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<Option<Element>>,
}

impl Arena {
    pub fn alloc(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Some(element));
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    pub fn free(&mut self, id: ElementId) -> Option<Element> {
        self.nodes.get_mut(id.index())?.take()
    }

    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Handles of `id` and all its descendants, in document order.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.get(next) {
                out.push(next);
                stack.extend(element.children.iter().rev());
            }
        }
        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).and_then(|e| e.parent);
        }
        false
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// An ARXML document with its element index and reference manager.
#[derive(Debug)]
pub struct Document {
    release: SchemaRelease,
    pub(crate) arena: Arena,
    root: ElementId,
    pub(crate) index: ElementIndex,
    references: ReferenceManager,
    subscribers: Subscribers,
    assign_uuids: bool,
}

impl Document {
    /// Create an empty document: an `AUTOSAR` root with namespace attributes.
    pub fn new(release: SchemaRelease) -> Self {
        let mut root = Element::new(Category::Autosar, release);
        root.set_attribute("xmlns", release.namespace().to_string());
        root.set_attribute("xmlns:xsi", XSI_NAMESPACE.to_string());
        root.set_attribute("xsi:schemaLocation", release.schema_location());
        let mut arena = Arena::default();
        let root = arena.alloc(root);
        Self::from_parts(release, arena, root)
    }

    /// Assemble a document from a filled arena and build its derived state.
    pub(crate) fn from_parts(release: SchemaRelease, arena: Arena, root: ElementId) -> Self {
        let index = ElementIndex::build(&arena, root);
        let mut doc = Self {
            release,
            arena,
            root,
            index,
            references: ReferenceManager::default(),
            subscribers: Subscribers::default(),
            assign_uuids: false,
        };
        doc.references = ReferenceManager::scan(&doc);
        debug!(
            release = %release,
            elements = doc.len(),
            paths = doc.index.len(),
            references = doc.references.len(),
            "document ready"
        );
        doc
    }

    /// Parse ARXML bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, LoadError> {
        xml::parse(bytes)
    }

    /// Read and parse an ARXML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::load(&bytes)
    }

    /// Serialize with default options.
    pub fn serialize(&self) -> std::io::Result<Vec<u8>> {
        self.serialize_with(&SerializeOptions::default())
    }

    pub fn serialize_with(&self, options: &SerializeOptions) -> std::io::Result<Vec<u8>> {
        xml::write(self, options)
    }

    /// Serialize and write to a file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path, bytes)
    }

    // ── Query ───────────────────────────────────────────────────────

    pub fn release(&self) -> SchemaRelease {
        self.release
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.arena.get(id)
    }

    /// Number of live elements (SHORT-NAME children are not counted).
    pub fn len(&self) -> usize {
        self.arena.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> &ElementIndex {
        &self.index
    }

    pub fn references(&self) -> &ReferenceManager {
        &self.references
    }

    /// Element at `path`. `/` is the root.
    pub fn lookup(&self, path: impl Into<ArPath>) -> Option<&Element> {
        self.lookup_id(path).and_then(|id| self.element(id))
    }

    /// Handle of the element at `path`.
    pub fn lookup_id(&self, path: impl Into<ArPath>) -> Option<ElementId> {
        self.index.lookup(&path.into())
    }

    /// Cached path of an identifiable element (or `/` for the root).
    pub fn path_of(&self, id: ElementId) -> Option<&ArPath> {
        self.index.path_of(id)
    }

    /// Path of the nearest identifiable ancestor-or-self.
    pub fn owning_path(&self, id: ElementId) -> ArPath {
        self.index.owning_path(&self.arena, id)
    }

    /// Identifiable elements at or below `prefix`, lazily, in document order.
    pub fn prefix_scan(&self, prefix: impl Into<ArPath>) -> PrefixScan<'_> {
        PrefixScan::new(self, &prefix.into())
    }

    /// Every live element in document order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.arena
            .subtree(self.root)
            .into_iter()
            .filter_map(|id| self.arena.get(id).map(|e| (id, e)))
    }

    /// Recompute cached paths for the element at `path` and its descendants.
    pub fn rebuild_subtree(&mut self, path: impl Into<ArPath>) -> bool {
        match self.lookup_id(path) {
            Some(id) => {
                self.index.rebuild_subtree(&self.arena, id);
                true
            }
            None => false,
        }
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Stamp a fresh v4 `UUID` on identifiable elements created from now on.
    pub fn set_assign_uuids(&mut self, enabled: bool) {
        self.assign_uuids = enabled;
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Register a callback run after every committed mutation.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&ModelChange) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Refresh references for a tracked change set, then notify subscribers.
    fn commit(&mut self, tracker: &ChangeTracker, change: ModelChange) {
        let mut references = std::mem::take(&mut self.references);
        references.refresh(self, tracker);
        self.references = references;
        debug!(kind = ?change.kind, paths = ?change.paths, "mutation committed");
        self.subscribers.notify(&change);
    }
}
