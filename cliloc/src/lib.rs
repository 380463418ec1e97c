#![forbid(unsafe_code)]
//! Conversion between binary cliloc localization files and semicolon-delimited CSV.
//!
//! A cliloc file stores localized strings as `(id, flag, text)` records behind a
//! fixed 6-byte header. This crate extracts them to CSV for editing and packs edited
//! CSV back into the binary form a game client expects.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cliloc::{ConvertOptions, convert_auto};
//!
//! // Direction is inferred from the extensions
//! convert_auto("cliloc.deu", "german.csv", &ConvertOptions::default())?;
//! convert_auto("german.csv", "cliloc.deu", &ConvertOptions::default())?;
//! # Ok::<(), cliloc::Error>(())
//! ```
//!
//! # Guarantees
//!
//! - Output is staged in an anonymous scratch file and only copied to the
//!   destination after every record converted; a failed run leaves no partial file.
//! - Record order is preserved one to one. Records whose text is too long for the
//!   16-bit length field are skipped with a warning, all other problems abort.
//! - Text is passed through as raw bytes; a binary record containing `\n` or `\r`
//!   is rejected because it would break the line structure of the CSV.

pub mod converter;
pub mod error;
pub mod formats;
pub mod options;
pub mod staging;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    converter::{convert, convert_auto, cliloc_to_csv_writer, csv_to_cliloc_writer},
    error::Error,
    formats::{FormatType, Locale, infer_format_from_extension},
    options::ConvertOptions,
    types::{ClilocRecord, ConversionReport, Direction, Position, Warning},
};
