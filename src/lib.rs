//! # arxml-core
//!
//! Core library for AUTOSAR XML (ARXML): loading, path indexing, reference
//! integrity, validation and deterministic serialization.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! validate  → Schema tier + semantic rules, diagnostics, quick-fixes
//!   ↓
//! refs      → Reference occurrences, resolution, find-all-references
//!   ↓
//! model     → Arena document, element index, mutation API, change events
//!   ↓
//! xml       → quick-xml reader (load) and writer (serialize)
//!   ↓
//! schema    → Releases, categories, content models, release conversion
//!   ↓
//! base      → Primitives (ArPath, Name, naming conventions)
//! ```
//!
//! ## Example
//!
//! ```
//! use arxml::{Document, SchemaRelease, validate};
//!
//! let mut doc = Document::new(SchemaRelease::R22_11);
//! doc.create_element("/", "AR-PACKAGE", "PackageA").unwrap();
//! doc.create_element("/PackageA", "ELEMENT", "ElementX").unwrap();
//! assert!(doc.lookup("/PackageA/ElementX").is_some());
//! assert!(validate(&doc).is_empty());
//! ```

// ============================================================================
// MODULES (dependency order: base → schema → xml → model → refs → validate)
// ============================================================================

/// Foundation types: ArPath, Name, naming conventions
pub mod base;

/// Schema registry: releases, categories, content models
pub mod schema;

/// ARXML reader and writer
pub mod xml;

/// Document model: arena, element index, mutations, change events
pub mod model;

/// Reference occurrences and resolution
pub mod refs;

/// Two-tier validation with quick-fixes
pub mod validate;

/// Error types for load, mutation and conversion
pub mod error;

// Re-export foundation types
pub use base::{ArPath, Name};

// Re-export schema types
pub use schema::{Category, SchemaRelease, registry};

// Re-export the document model
pub use model::{ChangeKind, Document, Edit, Element, ElementId, ModelChange, SubscriptionId};
pub use refs::{ReferenceManager, Resolution};
pub use xml::SerializeOptions;

// Re-export validation
pub use validate::{Diagnostic, QuickFix, Severity, Validator, ValidatorConfig, validate};

// Re-export errors
pub use error::{ConversionError, LoadError, ModelError, ParseError, SchemaDetectionError};
