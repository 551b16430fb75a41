//! AUTOSAR short-name paths.
//!
//! A path is the `/`-joined chain of SHORT-NAME values from the document root
//! down to an identifiable element. Paths are derived data: the element index
//! computes and caches them, they are never stored on elements.

use std::fmt;
use std::sync::Arc;

/// An absolute, normalized AUTOSAR path such as `/PackageA/ElementX`.
///
/// The document root is `/`. Normalization strips empty segments, so
/// `PackageA//ElementX/` and `/PackageA/ElementX` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArPath(Arc<str>);

impl ArPath {
    /// The document root path `/`.
    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    /// Parse and normalize a path. A missing leading `/` is added.
    pub fn parse(text: &str) -> Self {
        let segments: Vec<&str> = text.split('/').filter(|s| !s.is_empty()).collect();
        Self::from_segments(segments)
    }

    /// Build a path from its segments.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = String::new();
        for segment in segments {
            out.push('/');
            out.push_str(segment);
        }
        if out.is_empty() {
            return Self::root();
        }
        Self(Arc::from(out))
    }

    /// Range bound used for ordered-map prefix scans. Not a valid path.
    pub(crate) fn bound(text: String) -> Self {
        Self(Arc::from(text))
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == "/"
    }

    /// Iterate the short-name segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The last segment, i.e. the element's own short-name.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// The parent path. The root has no parent.
    pub fn parent(&self) -> Option<ArPath> {
        if self.is_root() {
            return None;
        }
        let cut = self.0.rfind('/')?;
        if cut == 0 {
            Some(Self::root())
        } else {
            Some(Self(Arc::from(&self.0[..cut])))
        }
    }

    /// Append one short-name segment.
    pub fn join(&self, short_name: &str) -> ArPath {
        if self.is_root() {
            Self(Arc::from(format!("/{short_name}")))
        } else {
            Self(Arc::from(format!("{}/{short_name}", self.0)))
        }
    }

    /// Segment-wise prefix test: `/A/B` starts with `/A` but not with `/A/Bx`.
    pub fn starts_with(&self, prefix: &ArPath) -> bool {
        if prefix.is_root() {
            return true;
        }
        match self.0.strip_prefix(&*prefix.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Replace the `old` prefix of this path with `new`.
    ///
    /// Returns `None` when this path does not live under `old`.
    pub fn rebase(&self, old: &ArPath, new: &ArPath) -> Option<ArPath> {
        if !self.starts_with(old) {
            return None;
        }
        let rest = if old.is_root() {
            &self.0[..]
        } else {
            &self.0[old.0.len()..]
        };
        Some(Self::parse(&format!("{}{rest}", new.0)))
    }

    /// Resolve reference text against a base path.
    ///
    /// Absolute text (leading `/`) is normalized as-is. Relative text is
    /// appended to `base`, where each `..` segment pops one segment.
    pub fn resolve(base: &ArPath, reference: &str) -> ArPath {
        let reference = reference.trim();
        if reference.starts_with('/') {
            return Self::parse(reference);
        }
        let mut parts: Vec<&str> = base.segments().collect();
        for part in reference.split('/').filter(|s| !s.is_empty()) {
            match part {
                "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        Self::from_segments(parts)
    }
}

impl fmt::Display for ArPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ArPath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl AsRef<str> for ArPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
