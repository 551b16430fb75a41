//! Reader and writer tests
//!
//! - Canonical output is stable across load/save cycles
//! - File IO through `load_file` / `save_file`
//! - Parse errors carry positions

mod tests_files;
mod tests_roundtrip;
