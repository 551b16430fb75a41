//! Document model tests
//!
//! - Create / rename / move / delete through the public mutation API
//! - Atomicity of failed mutations
//! - Element index queries
//! - Change notification

mod tests_index;
mod tests_mutation;
