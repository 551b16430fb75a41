//! Change notification for committed mutations.

use std::fmt;

use crate::base::ArPath;

/// What kind of mutation a [`ModelChange`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Renamed,
    Moved,
    Deleted,
    AttributeChanged,
    TextChanged,
}

/// A committed mutation, delivered to subscribers after the index and the
/// reference manager are consistent again.
///
/// `paths` holds the affected element paths: the new path for creations,
/// old then new for renames and moves, the removed path for deletions, and
/// the owning element's path for attribute and text edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelChange {
    pub kind: ChangeKind,
    pub paths: Vec<ArPath>,
}

impl ModelChange {
    pub fn new(kind: ChangeKind, paths: Vec<ArPath>) -> Self {
        Self { kind, paths }
    }
}

/// Handle returned by [`crate::Document::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ModelChange) + Send>;

/// Registered change callbacks, notified in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, change: &ModelChange) {
        for (_, callback) in &mut self.entries {
            callback(change);
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}
