//! Validator tests
//!
//! - Rule findings and their ordering on realistic documents
//! - Configuration (disabled rules, provisional findings)
//! - Quick-fixes applied through the document API

mod tests_fixes;
mod tests_validation;
