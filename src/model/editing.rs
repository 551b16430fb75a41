//! Change tracking and the mutation API for [`Document`].
//!
//! Every mutation runs in two phases. The check phase validates all
//! preconditions against the current tree and index and returns a
//! [`ModelError`] without touching anything. The apply phase changes the
//! arena, updates the index, records what it touched in a [`ChangeTracker`],
//! and hands the tracker to [`Document::commit`].

use rustc_hash::FxHashSet;
use uuid::Uuid;

use super::{ChangeKind, Document, Element, ElementId, ModelChange};
use crate::base::naming::{is_valid_short_name, is_valid_tag_name, normalize_tag_name};
use crate::base::{ArPath, Name};
use crate::error::ModelError;
use crate::schema::{Category, Placement, registry};

/// Records which elements and path prefixes one mutation touched.
///
/// The reference manager reads it to rescan changed reference sites and to
/// re-resolve occurrences whose target lies under an affected prefix.
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    /// Element handles that have been created.
    created: FxHashSet<ElementId>,
    /// Element handles whose content or path changed.
    modified: FxHashSet<ElementId>,
    /// Element handles that have been removed.
    removed: FxHashSet<ElementId>,
    /// Old and new paths whose subtrees changed.
    prefixes: Vec<ArPath>,
}

impl ChangeTracker {
    /// Create a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Query ───────────────────────────────────────────────────────

    /// Whether an element was modified (creation included).
    pub fn is_dirty(&self, id: ElementId) -> bool {
        self.modified.contains(&id) || self.created.contains(&id)
    }

    pub fn is_removed(&self, id: ElementId) -> bool {
        self.removed.contains(&id)
    }

    /// Created and modified handles, sorted.
    pub fn dirty_elements(&self) -> Vec<ElementId> {
        let mut out: Vec<_> = self.created.union(&self.modified).copied().collect();
        out.sort();
        out
    }

    /// Removed handles, sorted.
    pub fn removed_elements(&self) -> Vec<ElementId> {
        let mut out: Vec<_> = self.removed.iter().copied().collect();
        out.sort();
        out
    }

    /// Paths whose subtrees appeared, disappeared or moved.
    pub fn affected_prefixes(&self) -> &[ArPath] {
        &self.prefixes
    }

    // ── Recording ───────────────────────────────────────────────────

    pub(crate) fn mark_created(&mut self, id: ElementId) {
        self.created.insert(id);
    }

    pub(crate) fn mark_modified(&mut self, id: ElementId) {
        self.modified.insert(id);
    }

    pub(crate) fn mark_removed(&mut self, id: ElementId) {
        self.created.remove(&id);
        self.modified.remove(&id);
        self.removed.insert(id);
    }

    pub(crate) fn add_prefix(&mut self, path: ArPath) {
        if !self.prefixes.contains(&path) {
            self.prefixes.push(path);
        }
    }
}

/// A mutation described as data, applied with [`Document::apply`].
///
/// Quick-fixes produce these so the validator never mutates anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    Rename { node: ElementId, short_name: String },
    SetAttribute { node: ElementId, name: String, value: String },
    RemoveAttribute { node: ElementId, name: String },
    SetText { node: ElementId, text: Option<String> },
    Delete { node: ElementId },
}

impl Edit {
    /// The element the edit targets.
    pub fn node(&self) -> ElementId {
        match self {
            Self::Rename { node, .. }
            | Self::SetAttribute { node, .. }
            | Self::RemoveAttribute { node, .. }
            | Self::SetText { node, .. }
            | Self::Delete { node } => *node,
        }
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

impl Document {
    /// Apply an [`Edit`] through the ordinary mutation API.
    pub fn apply(&mut self, edit: &Edit) -> Result<(), ModelError> {
        match edit {
            Edit::Rename { node, short_name } => self.rename_node(*node, short_name).map(|_| ()),
            Edit::SetAttribute { node, name, value } => {
                self.set_attribute_node(*node, name, value).map(|_| ())
            }
            Edit::RemoveAttribute { node, name } => {
                self.remove_attribute_node(*node, name).map(|_| ())
            }
            Edit::SetText { node, text } => self.set_text_node(*node, text.as_deref()),
            Edit::Delete { node } => self.delete_node(*node).map(|_| ()),
        }
    }

    fn resolve_path(&self, path: &ArPath) -> Result<ElementId, ModelError> {
        self.index
            .lookup(path)
            .ok_or_else(|| ModelError::not_found(path))
    }

    fn get_checked(&self, id: ElementId) -> Result<&Element, ModelError> {
        self.arena.get(id).ok_or_else(|| ModelError::not_found(id))
    }

    // ── Create ──────────────────────────────────────────────────────

    /// Create an identifiable element under the element at `parent_path`.
    ///
    /// `category` is normalized (`arPackage` → `AR-PACKAGE`). When the parent
    /// only accepts the category inside an aggregation wrapper such as
    /// `ELEMENTS`, the wrapper is reused or created.
    pub fn create_element(
        &mut self,
        parent_path: impl Into<ArPath>,
        category: &str,
        short_name: &str,
    ) -> Result<ArPath, ModelError> {
        let parent = self.resolve_path(&parent_path.into())?;
        let id = self.create_node(parent, Category::parse(category), short_name)?;
        Ok(self.owning_path(id))
    }

    pub fn create_node(
        &mut self,
        parent: ElementId,
        category: Category,
        short_name: &str,
    ) -> Result<ElementId, ModelError> {
        let registry = registry();
        let parent_category = self.get_checked(parent)?.category.clone();
        let model = registry
            .content_model(self.release, &category)
            .ok_or_else(|| {
                ModelError::invalid_category(category.tag(), "not registered in this schema release")
            })?;
        if !model.identifiable {
            return Err(ModelError::invalid_category(
                category.tag(),
                "category has no SHORT-NAME",
            ));
        }
        if !is_valid_short_name(short_name) {
            return Err(ModelError::InvalidShortName(short_name.to_string()));
        }
        let placement = registry
            .placement(self.release, &parent_category, &category)
            .ok_or_else(|| ModelError::invalid_parent(&parent_category, &category))?;
        let path = self.owning_path(parent).join(short_name);
        if self.index.contains(&path) {
            return Err(ModelError::DuplicateName(path));
        }

        let mut tracker = ChangeTracker::new();
        let container = self.container_for(parent, placement, &mut tracker);
        let mut element = Element::new(category, self.release);
        element.short_name = Some(Name::new(short_name));
        if self.assign_uuids {
            element.set_attribute("UUID", Uuid::new_v4().to_string());
        }
        let id = self.arena.alloc(element);
        self.link(container, id);
        self.index.insert_subtree(&self.arena, id);
        tracker.mark_created(id);
        tracker.add_prefix(path.clone());
        self.commit(&tracker, ModelChange::new(ChangeKind::Created, vec![path]));
        Ok(id)
    }

    /// Add a reference element (`REF`, `TYPE-TREF`, ...) under the element at
    /// `path`, pointing at `target` and declaring `dest` as the expected category.
    pub fn add_reference(
        &mut self,
        path: impl Into<ArPath>,
        category: &str,
        dest: &str,
        target: &str,
    ) -> Result<ElementId, ModelError> {
        let owner = self.resolve_path(&path.into())?;
        self.add_reference_node(owner, Category::parse(category), dest, target)
    }

    pub fn add_reference_node(
        &mut self,
        owner: ElementId,
        category: Category,
        dest: &str,
        target: &str,
    ) -> Result<ElementId, ModelError> {
        let registry = registry();
        let owner_category = self.get_checked(owner)?.category.clone();
        if !registry.is_reference(self.release, &category) {
            return Err(ModelError::invalid_category(
                category.tag(),
                "not a reference category",
            ));
        }
        let placement = registry
            .placement(self.release, &owner_category, &category)
            .ok_or_else(|| ModelError::invalid_parent(&owner_category, &category))?;
        let dest = normalize_tag_name(dest);
        if !is_valid_tag_name(&dest) {
            return Err(ModelError::invalid_category(dest, "DEST is not a category name"));
        }

        let mut tracker = ChangeTracker::new();
        let container = self.container_for(owner, placement, &mut tracker);
        let mut element = Element::new(category, self.release);
        element.set_attribute("DEST", dest);
        element.text = Some(target.to_string()).filter(|t| !t.is_empty());
        let id = self.arena.alloc(element);
        self.link(container, id);
        tracker.mark_created(id);
        let owner_path = self.owning_path(id);
        self.commit(&tracker, ModelChange::new(ChangeKind::Created, vec![owner_path]));
        Ok(id)
    }

    // ── Rename ──────────────────────────────────────────────────────

    /// Change the SHORT-NAME of the element at `path`. Every descendant path
    /// changes with it.
    pub fn rename(
        &mut self,
        path: impl Into<ArPath>,
        new_short_name: &str,
    ) -> Result<ArPath, ModelError> {
        let id = self.resolve_path(&path.into())?;
        self.rename_node(id, new_short_name)
    }

    pub fn rename_node(&mut self, id: ElementId, new_short_name: &str) -> Result<ArPath, ModelError> {
        let element = self.get_checked(id)?;
        if element.short_name.is_none() {
            return Err(ModelError::invalid_category(
                element.category.tag(),
                "category has no SHORT-NAME",
            ));
        }
        if !is_valid_short_name(new_short_name) {
            return Err(ModelError::InvalidShortName(new_short_name.to_string()));
        }
        let base = match element.parent {
            Some(parent) => self.owning_path(parent),
            None => ArPath::root(),
        };
        let old_path = self.index.path_of(id).cloned();
        let new_path = base.join(new_short_name);
        if old_path.as_ref() == Some(&new_path) {
            return Ok(new_path);
        }
        // Descendant paths all live under `new_path`, so checking it covers them.
        if self.index.contains(&new_path) {
            return Err(ModelError::DuplicateName(new_path));
        }
        // An empty SHORT-NAME in loaded input leaves descendants directly
        // under `base`; their paths move too.
        let old_paths = self.topmost_paths(id);

        let mut tracker = ChangeTracker::new();
        if let Some(element) = self.arena.get_mut(id) {
            element.short_name = Some(Name::new(new_short_name));
        }
        self.index.rebuild_subtree(&self.arena, id);
        for node in self.arena.subtree(id) {
            tracker.mark_modified(node);
        }
        for old in old_paths {
            tracker.add_prefix(old);
        }
        let mut paths = Vec::with_capacity(2);
        if let Some(old) = old_path {
            paths.push(old);
        }
        tracker.add_prefix(new_path.clone());
        paths.push(new_path.clone());
        self.commit(&tracker, ModelChange::new(ChangeKind::Renamed, paths));
        Ok(new_path)
    }

    // ── Move ────────────────────────────────────────────────────────

    /// Reparent the element at `path` under the element at `new_parent_path`.
    pub fn move_element(
        &mut self,
        path: impl Into<ArPath>,
        new_parent_path: impl Into<ArPath>,
    ) -> Result<ArPath, ModelError> {
        let id = self.resolve_path(&path.into())?;
        let new_parent = self.resolve_path(&new_parent_path.into())?;
        self.move_node(id, new_parent)
    }

    pub fn move_node(&mut self, id: ElementId, new_parent: ElementId) -> Result<ArPath, ModelError> {
        let element = self.get_checked(id)?;
        let target = self.get_checked(new_parent)?;
        if self.arena.is_ancestor_or_self(id, new_parent) {
            return Err(ModelError::Cyclic {
                path: self.owning_path(id),
                target: self.owning_path(new_parent),
            });
        }
        let placement = registry()
            .placement(self.release, &target.category, &element.category)
            .ok_or_else(|| ModelError::invalid_parent(&target.category, &element.category))?;
        let old_base = match element.parent {
            Some(parent) => self.owning_path(parent),
            None => ArPath::root(),
        };
        let new_base = self.owning_path(new_parent);
        // Wrappers and empty SHORT-NAMEs carry no path of their own: the
        // highest identifiable descendants are what changes path.
        let old_paths = self.topmost_paths(id);
        let new_paths: Vec<ArPath> = old_paths
            .iter()
            .filter_map(|path| path.rebase(&old_base, &new_base))
            .collect();
        if !old_paths.is_empty() && old_paths == new_paths {
            return Ok(self.owning_path(id));
        }
        if let Some(taken) = new_paths
            .iter()
            .find(|path| !old_paths.contains(path) && self.index.contains(path))
        {
            return Err(ModelError::DuplicateName(taken.clone()));
        }
        let old_owner = self.owning_path(id);

        let mut tracker = ChangeTracker::new();
        if let Some(old_parent) = self.unlink(id) {
            self.prune_empty_wrapper(old_parent, &mut tracker);
        }
        let container = self.container_for(new_parent, placement, &mut tracker);
        match self.same_wrapper_under(container, id) {
            Some(existing) => self.merge_wrapper(id, existing, &mut tracker),
            None => {
                self.link(container, id);
                self.index.rebuild_subtree(&self.arena, id);
                for node in self.arena.subtree(id) {
                    tracker.mark_modified(node);
                }
            }
        }
        for path in old_paths.into_iter().chain(new_paths) {
            tracker.add_prefix(path);
        }
        let new_owner = match self.index.path_of(id) {
            Some(path) => path.clone(),
            None => self.owning_path(container),
        };
        self.commit(
            &tracker,
            ModelChange::new(ChangeKind::Moved, vec![old_owner, new_owner.clone()]),
        );
        Ok(new_owner)
    }

    // ── Delete ──────────────────────────────────────────────────────

    /// Remove the element at `path` with its whole subtree.
    ///
    /// References elsewhere that pointed into the subtree stay in place and
    /// resolve as dangling from now on.
    pub fn delete(&mut self, path: impl Into<ArPath>) -> Result<ArPath, ModelError> {
        let id = self.resolve_path(&path.into())?;
        self.delete_node(id)
    }

    pub fn delete_node(&mut self, id: ElementId) -> Result<ArPath, ModelError> {
        let element = self.get_checked(id)?;
        if id == self.root {
            return Err(ModelError::invalid_category(
                element.category.tag(),
                "the document root cannot be deleted",
            ));
        }
        let reported = self
            .index
            .path_of(id)
            .cloned()
            .unwrap_or_else(|| self.owning_path(id));
        let removed_paths = self.topmost_paths(id);

        let mut tracker = ChangeTracker::new();
        let subtree = self.arena.subtree(id);
        self.index.remove_subtree(&self.arena, id);
        let parent = self.unlink(id);
        for node in &subtree {
            self.arena.free(*node);
            tracker.mark_removed(*node);
        }
        if let Some(parent) = parent {
            self.prune_empty_wrapper(parent, &mut tracker);
        }
        for path in removed_paths {
            tracker.add_prefix(path);
        }
        self.commit(&tracker, ModelChange::new(ChangeKind::Deleted, vec![reported.clone()]));
        Ok(reported)
    }

    // ── Attributes and text ─────────────────────────────────────────

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        path: impl Into<ArPath>,
        name: &str,
        value: &str,
    ) -> Result<Option<String>, ModelError> {
        let id = self.resolve_path(&path.into())?;
        self.set_attribute_node(id, name, value)
    }

    pub fn set_attribute_node(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<Option<String>, ModelError> {
        self.get_checked(id)?;
        if !is_valid_attribute_name(name) {
            return Err(ModelError::InvalidAttribute(name.to_string()));
        }
        let old = self
            .arena
            .get_mut(id)
            .and_then(|element| element.set_attribute(name, value.to_string()));
        self.attribute_changed(id, name);
        Ok(old)
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove_attribute(
        &mut self,
        path: impl Into<ArPath>,
        name: &str,
    ) -> Result<Option<String>, ModelError> {
        let id = self.resolve_path(&path.into())?;
        self.remove_attribute_node(id, name)
    }

    pub fn remove_attribute_node(
        &mut self,
        id: ElementId,
        name: &str,
    ) -> Result<Option<String>, ModelError> {
        self.get_checked(id)?;
        let old = self
            .arena
            .get_mut(id)
            .and_then(|element| element.remove_attribute(name));
        if old.is_some() {
            self.attribute_changed(id, name);
        }
        Ok(old)
    }

    fn attribute_changed(&mut self, id: ElementId, name: &str) {
        if name == "UUID" {
            self.index.refresh_uuid(&self.arena, id);
        }
        let mut tracker = ChangeTracker::new();
        tracker.mark_modified(id);
        let path = self.owning_path(id);
        self.commit(&tracker, ModelChange::new(ChangeKind::AttributeChanged, vec![path]));
    }

    /// Replace the text content. Empty text clears it.
    pub fn set_text(&mut self, path: impl Into<ArPath>, text: Option<&str>) -> Result<(), ModelError> {
        let id = self.resolve_path(&path.into())?;
        self.set_text_node(id, text)
    }

    pub fn set_text_node(&mut self, id: ElementId, text: Option<&str>) -> Result<(), ModelError> {
        let element = self.get_checked(id)?;
        let text = text.filter(|t| !t.is_empty());
        if element.text.as_deref() == text {
            return Ok(());
        }
        if let Some(element) = self.arena.get_mut(id) {
            element.text = text.map(str::to_string);
        }
        let mut tracker = ChangeTracker::new();
        tracker.mark_modified(id);
        let path = self.owning_path(id);
        self.commit(&tracker, ModelChange::new(ChangeKind::TextChanged, vec![path]));
        Ok(())
    }

    // ── Tree plumbing ───────────────────────────────────────────────

    /// The element that receives a child placed under `parent`: `parent`
    /// itself, or its aggregation wrapper (created if missing).
    fn container_for(
        &mut self,
        parent: ElementId,
        placement: Placement,
        tracker: &mut ChangeTracker,
    ) -> ElementId {
        let Placement::Wrapped(wrapper) = placement else {
            return parent;
        };
        let existing = self.arena.get(parent).and_then(|p| {
            p.children
                .iter()
                .copied()
                .find(|c| self.arena.get(*c).is_some_and(|e| e.category == wrapper))
        });
        if let Some(found) = existing {
            return found;
        }
        let id = self.arena.alloc(Element::new(wrapper, self.release));
        self.link(parent, id);
        tracker.mark_created(id);
        id
    }

    /// Attach `id` under `parent`, keeping children in schema order.
    fn link(&mut self, parent: ElementId, id: ElementId) {
        let Some(parent_el) = self.arena.get(parent) else {
            return;
        };
        let Some(child) = self.arena.get(id) else {
            return;
        };
        let model = registry().content_model(self.release, &parent_el.category);
        let rank = |category: &Category| {
            model
                .and_then(|m| m.allowed_children.iter().position(|c| c == category))
                .unwrap_or(usize::MAX)
        };
        let own_rank = rank(&child.category);
        let position = parent_el
            .children
            .iter()
            .position(|c| {
                self.arena
                    .get(*c)
                    .is_some_and(|e| rank(&e.category) > own_rank)
            })
            .unwrap_or(parent_el.children.len());

        if let Some(parent_el) = self.arena.get_mut(parent) {
            parent_el.children.insert(position, id);
        }
        if let Some(child) = self.arena.get_mut(id) {
            child.parent = Some(parent);
        }
    }

    /// Detach `id` from its parent, returning the old parent.
    fn unlink(&mut self, id: ElementId) -> Option<ElementId> {
        let parent = self.arena.get_mut(id)?.parent.take()?;
        if let Some(parent_el) = self.arena.get_mut(parent) {
            parent_el.children.retain(|c| *c != id);
        }
        Some(parent)
    }

    /// Paths of the highest indexed elements in the subtree of `id`: `id`'s
    /// own path when it has one, else those of its nearest identifiable
    /// descendants.
    fn topmost_paths(&self, id: ElementId) -> Vec<ArPath> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(path) = self.index.path_of(node) {
                out.push(path.clone());
                continue;
            }
            if let Some(element) = self.arena.get(node) {
                stack.extend(element.children.iter().rev());
            }
        }
        out
    }

    fn is_wrapper(&self, category: &Category) -> bool {
        registry()
            .content_model(self.release, category)
            .is_some_and(|m| !m.identifiable && !m.reference && !m.allowed_children.is_empty())
    }

    /// An existing wrapper under `container` with the same category as the
    /// detached wrapper `id`.
    fn same_wrapper_under(&self, container: ElementId, id: ElementId) -> Option<ElementId> {
        let category = &self.arena.get(id)?.category;
        if !self.is_wrapper(category) {
            return None;
        }
        self.arena.get(container)?.children.iter().copied().find(|c| {
            *c != id && self.arena.get(*c).is_some_and(|e| &e.category == category)
        })
    }

    /// Move the children of the detached wrapper `id` into `existing`, then
    /// drop `id`.
    fn merge_wrapper(&mut self, id: ElementId, existing: ElementId, tracker: &mut ChangeTracker) {
        let children = self
            .arena
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default();
        for child in children {
            self.unlink(child);
            self.link(existing, child);
            self.index.rebuild_subtree(&self.arena, child);
            for node in self.arena.subtree(child) {
                tracker.mark_modified(node);
            }
        }
        self.index.remove_subtree(&self.arena, id);
        self.arena.free(id);
        tracker.mark_removed(id);
    }

    /// Remove an aggregation wrapper that a delete or move left empty.
    fn prune_empty_wrapper(&mut self, id: ElementId, tracker: &mut ChangeTracker) {
        let Some(element) = self.arena.get(id) else {
            return;
        };
        let is_wrapper = self.is_wrapper(&element.category);
        let empty = element.children.is_empty()
            && element.text.is_none()
            && element.attributes.is_empty()
            && element.short_name.is_none();
        if !is_wrapper || !empty || id == self.root {
            return;
        }
        self.index.remove_subtree(&self.arena, id);
        self.unlink(id);
        self.arena.free(id);
        tracker.mark_removed(id);
    }
}
