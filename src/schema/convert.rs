//! Static category remap table between releases.

use super::SchemaRelease;
use super::category::Category;

/// Categories renamed by a release: `(release introducing the rename, old tag, new tag)`.
const RENAMES: &[(SchemaRelease, &str, &str)] = &[(
    SchemaRelease::R22_11,
    "SECURE-COM-PROPS",
    "SECURE-COM-PROPS-SET",
)];

/// Result of mapping a category into another release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryMapping {
    /// Same tag in both releases (or unregistered in both).
    Same,
    /// The target release uses another tag.
    Renamed(Category),
    /// The target release has no counterpart.
    Missing,
}

/// Apply every rename between `from` and `to`, in either direction.
pub(super) fn rename_category(
    from: SchemaRelease,
    to: SchemaRelease,
    category: &Category,
) -> Option<Category> {
    let mut tag = category.tag().to_string();
    if from < to {
        for &(at, old, new) in RENAMES {
            if from < at && at <= to && tag == old {
                tag = new.to_string();
            }
        }
    } else {
        for &(at, old, new) in RENAMES.iter().rev() {
            if to < at && at <= from && tag == new {
                tag = old.to_string();
            }
        }
    }
    (tag != category.tag()).then(|| Category::from_tag(&tag))
}
