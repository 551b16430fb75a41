//! ARXML reading and writing on top of `quick-xml`.
//!
//! The reader builds a [`Document`] arena directly from pull events; the
//! writer emits a canonical form (fixed indentation, canonical attribute
//! order, SHORT-NAME first) so that saving an unchanged document twice
//! produces identical bytes.

mod reader;
mod writer;

pub(crate) use reader::parse;
pub(crate) use writer::write;

/// Formatting options for serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Start tags longer than this put each attribute on its own line.
    pub max_line_width: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            max_line_width: 120,
        }
    }
}

/// Tag of the element absorbed into [`crate::Element::short_name`].
pub(crate) const SHORT_NAME_TAG: &str = "SHORT-NAME";
