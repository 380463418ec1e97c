//! CLI library for testing purposes

pub mod validation;

pub use validation::{validate_conversion, validate_file_path};
