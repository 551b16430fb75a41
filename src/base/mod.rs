//! Foundation types for the ARXML core.
//!
//! This module provides the primitives used throughout the crate:
//! - [`ArPath`] - AUTOSAR short-name paths (`/Package/Element`)
//! - [`Name`] - Cheap-to-clone identifier strings (short-names, tags, attribute names)
//! - [`naming`] - AUTOSAR naming conventions for short-names and tag names
//!
//! This module has NO dependencies on other crate modules.

pub mod naming;
mod path;

pub use path::ArPath;

/// An identifier string: short-name, category tag or attribute name.
///
/// Most AUTOSAR identifiers fit inline, so cloning is a copy.
pub type Name = smol_str::SmolStr;
