//! Core data types shared by both codecs and the converter.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// One localized string keyed by a numeric identifier.
///
/// `text` is kept as raw bytes: the binary format does not declare an encoding,
/// and the converter passes the bytes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClilocRecord {
    pub id: u32,
    /// Opaque attribute byte, copied verbatim.
    pub flag: u8,
    pub text: Vec<u8>,
}

impl ClilocRecord {
    /// Creates a record from anything convertible to bytes.
    pub fn new(id: u32, flag: u8, text: impl Into<Vec<u8>>) -> Self {
        ClilocRecord {
            id,
            flag,
            text: text.into(),
        }
    }
}

/// Where in the source a record was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Byte offset of the record inside a binary cliloc file.
    Offset(u64),
    /// 1-based line number inside a CSV file.
    Line(u64),
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Offset(offset) => write!(f, "offset {}", offset),
            Position::Line(line) => write!(f, "line {}", line),
        }
    }
}

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Binary cliloc file to CSV.
    BinaryToText,
    /// CSV to binary cliloc file.
    TextToBinary,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::BinaryToText => write!(f, "cliloc => csv"),
            Direction::TextToBinary => write!(f, "csv => cliloc"),
        }
    }
}

/// A content-quality issue that did not abort the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The record has empty text; it is still written.
    ZeroLengthString { id: u32, position: Position },
    /// The record's text is longer than allowed; the record is dropped.
    SkippedRecord {
        id: u32,
        len: usize,
        max: usize,
        position: Position,
    },
    /// The record's text contains a carriage return. It is packed as is, but
    /// the resulting cliloc file cannot be extracted to CSV again.
    CarriageReturn { id: u32, position: Position },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ZeroLengthString { id, position } => {
                write!(f, "zero length string in entry {} ({}), still writing it", id, position)
            }
            Warning::SkippedRecord {
                id,
                len,
                max,
                position,
            } => write!(
                f,
                "entry {} ({}) has {} bytes of text, exceeding the maximum of {}; skipping",
                id, position, len, max
            ),
            Warning::CarriageReturn { id, position } => write!(
                f,
                "entry {} ({}) contains a carriage return; the packed file cannot be converted back to csv",
                id, position
            ),
        }
    }
}

/// Aggregate outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub direction: Direction,
    pub records_written: usize,
    pub records_skipped: usize,
    /// Size of the committed output file, including the binary header.
    pub bytes_written: u64,
    pub warnings: Vec<Warning>,
}

impl ConversionReport {
    pub fn new(direction: Direction) -> Self {
        ConversionReport {
            direction,
            records_written: 0,
            records_skipped: 0,
            bytes_written: 0,
            warnings: Vec::new(),
        }
    }

    /// Records a warning and emits it through `tracing`.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        if matches!(warning, Warning::SkippedRecord { .. }) {
            self.records_skipped += 1;
        }
        self.warnings.push(warning);
    }
}
