//! Reference manager tests
//!
//! - Resolution outcomes (resolved, dangling, mismatch, ambiguous)
//! - Incremental refresh compared with a full rescan
//! - Find-all-references
//! - Delete and move of aggregation wrappers
//! - References held in attributes
