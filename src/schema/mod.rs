//! Schema registry: supported AUTOSAR releases and their content models.
//!
//! The registry is process-wide immutable state, built on first use and shared
//! by every open document. Lookups never allocate.

mod category;
mod content;
mod convert;

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

pub use category::Category;
pub use content::{AttributeConstraint, ContentModel, Placement};
pub use convert::CategoryMapping;

use crate::error::SchemaDetectionError;

/// A supported AUTOSAR schema release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaRelease {
    R20_11,
    R21_11,
    R22_11,
    R24_11,
}

impl SchemaRelease {
    /// All releases, oldest first.
    pub const ALL: [SchemaRelease; 4] = [Self::R20_11, Self::R21_11, Self::R22_11, Self::R24_11];

    /// Release name as written in AUTOSAR documents (`R20-11`).
    pub fn name(self) -> &'static str {
        match self {
            Self::R20_11 => "R20-11",
            Self::R21_11 => "R21-11",
            Self::R22_11 => "R22-11",
            Self::R24_11 => "R24-11",
        }
    }

    fn dotted_name(self) -> &'static str {
        match self {
            Self::R20_11 => "R20.11",
            Self::R21_11 => "R21.11",
            Self::R22_11 => "R22.11",
            Self::R24_11 => "R24.11",
        }
    }

    /// Namespace URI of the root element.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::R20_11 => "http://autosar.org/schema/r4.0",
            Self::R21_11 => "http://autosar.org/schema/r4.1",
            Self::R22_11 => "http://autosar.org/schema/r4.2",
            Self::R24_11 => "http://autosar.org/schema/r4.4",
        }
    }

    /// File name of the release's XSD.
    pub fn xsd_file(self) -> &'static str {
        match self {
            Self::R20_11 => "AUTOSAR_4-0-0.xsd",
            Self::R21_11 => "AUTOSAR_4-1-0.xsd",
            Self::R22_11 => "AUTOSAR_4-2-0.xsd",
            Self::R24_11 => "AUTOSAR_4-4-0.xsd",
        }
    }

    /// Value for the root's `xsi:schemaLocation` attribute.
    pub fn schema_location(self) -> String {
        format!("{} {}", self.namespace(), self.xsd_file())
    }

    /// Parse a release name (`R22-11`, `R22.11` or `R22_11`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace(['.', '_'], "-").to_ascii_uppercase();
        Self::ALL.into_iter().find(|r| r.name() == normalized)
    }
}

impl fmt::Display for SchemaRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes that sort first, in this order. Everything else follows by name.
const CANONICAL_ATTRIBUTE_ORDER: &[&str] = &[
    "xmlns",
    "xmlns:xsi",
    "xsi:schemaLocation",
    "DEST",
    "BASE",
    "UUID",
    "S",
    "T",
    "L",
];

struct ReleaseTable {
    models: FxHashMap<Category, ContentModel>,
}

/// Immutable table of every supported release.
pub struct SchemaRegistry {
    releases: IndexMap<SchemaRelease, ReleaseTable>,
}

static REGISTRY: LazyLock<SchemaRegistry> = LazyLock::new(SchemaRegistry::build);

/// The process-wide schema registry.
pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

impl SchemaRegistry {
    fn build() -> Self {
        let releases = SchemaRelease::ALL
            .into_iter()
            .map(|release| {
                let models = content::table_for(release).into_iter().collect();
                (release, ReleaseTable { models })
            })
            .collect();
        Self { releases }
    }

    /// Registered releases, oldest first.
    pub fn supported_releases(&self) -> impl Iterator<Item = SchemaRelease> + '_ {
        self.releases.keys().copied()
    }

    /// Work out which release a document uses from its root element.
    ///
    /// The namespace decides when it matches exactly; otherwise the
    /// `xsi:schemaLocation` is searched for an XSD file name or release name.
    pub fn detect(
        &self,
        namespace: Option<&str>,
        schema_location: Option<&str>,
    ) -> Result<SchemaRelease, SchemaDetectionError> {
        if let Some(ns) = namespace.map(str::trim) {
            if let Some(release) = self.supported_releases().find(|r| r.namespace() == ns) {
                return Ok(release);
            }
        }
        if let Some(location) = schema_location {
            let found = self.supported_releases().find(|r| {
                location.contains(r.xsd_file()) || location.contains(r.dotted_name())
            });
            if let Some(release) = found {
                return Ok(release);
            }
        }
        Err(SchemaDetectionError::unknown(namespace, schema_location))
    }

    /// Content model of `category` in `release`, if the category is registered.
    pub fn content_model(&self, release: SchemaRelease, category: &Category) -> Option<&ContentModel> {
        self.releases.get(&release)?.models.get(category)
    }

    pub fn is_registered(&self, release: SchemaRelease, category: &Category) -> bool {
        self.content_model(release, category).is_some()
    }

    /// Whether elements of `category` carry a SHORT-NAME.
    pub fn is_identifiable(&self, release: SchemaRelease, category: &Category) -> bool {
        self.content_model(release, category)
            .is_some_and(|m| m.identifiable)
    }

    /// Whether the text content of `category` is a reference path.
    ///
    /// Unregistered categories fall back to the tag shape (`REF`, `*-REF`, `*-TREF`).
    pub fn is_reference(&self, release: SchemaRelease, category: &Category) -> bool {
        match self.content_model(release, category) {
            Some(model) => model.reference,
            None => category.looks_like_reference(),
        }
    }

    /// How `child` can be inserted under `parent`, or `None` when it cannot.
    pub fn placement(
        &self,
        release: SchemaRelease,
        parent: &Category,
        child: &Category,
    ) -> Option<Placement> {
        let model = self.content_model(release, parent)?;
        if model.allows(child) {
            return Some(Placement::Direct);
        }
        model
            .allowed_children
            .iter()
            .find(|wrapper| {
                self.content_model(release, wrapper)
                    .is_some_and(|w| !w.identifiable && !w.reference && w.allows(child))
            })
            .map(|wrapper| Placement::Wrapped(wrapper.clone()))
    }

    /// Whether `from` can be converted to `to`.
    pub fn can_convert(&self, from: SchemaRelease, to: SchemaRelease) -> bool {
        from != to && self.releases.contains_key(&from) && self.releases.contains_key(&to)
    }

    /// Map a category of release `from` to its counterpart in `to`.
    pub fn map_category(
        &self,
        from: SchemaRelease,
        to: SchemaRelease,
        category: &Category,
    ) -> CategoryMapping {
        let renamed = convert::rename_category(from, to, category);
        let target = renamed.as_ref().unwrap_or(category);
        if self.is_registered(from, category) && !self.is_registered(to, target) {
            return CategoryMapping::Missing;
        }
        match renamed {
            Some(new) => CategoryMapping::Renamed(new),
            None => CategoryMapping::Same,
        }
    }
}

/// Sort key placing attributes in canonical order.
pub fn attribute_sort_key(name: &str) -> (usize, &str) {
    let rank = CANONICAL_ATTRIBUTE_ORDER
        .iter()
        .position(|&n| n == name)
        .unwrap_or(CANONICAL_ATTRIBUTE_ORDER.len());
    (rank, name)
}
