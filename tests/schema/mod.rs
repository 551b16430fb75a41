//! Schema registry tests
//!
//! - Release detection from the root element
//! - Conversion between releases

mod tests_conversion;
mod tests_detection;
