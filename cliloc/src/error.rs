//! All error types for the cliloc crate.
//!
//! These are returned from all fallible operations (decoding, encoding, staging, conversion).
//! Structural failures abort a conversion; [`Error::StringTooLong`] is the one
//! record-level failure the converter recovers from by skipping the record.

use std::{
    fmt::{Display, Formatter},
    io,
    path::PathBuf,
};

use thiserror::Error;

use crate::{formats::FormatType, types::Position};

/// The fixed-width field of a binary record that could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Id,
    Flag,
    Length,
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordField::Id => write!(f, "id"),
            RecordField::Flag => write!(f, "flag"),
            RecordField::Length => write!(f, "length"),
        }
    }
}

/// Line-break bytes that may never appear inside a record's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    LineFeed,
    CarriageReturn,
}

impl LineBreak {
    /// The byte value of this line break.
    pub fn byte(self) -> u8 {
        match self {
            LineBreak::LineFeed => b'\n',
            LineBreak::CarriageReturn => b'\r',
        }
    }
}

impl Display for LineBreak {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LineBreak::LineFeed => write!(f, "line feed"),
            LineBreak::CarriageReturn => write!(f, "carriage return"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not open input file `{}`: {source}", path.display())]
    SourceOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input file is too small: {len} bytes, a cliloc file needs at least {min}")]
    SourceTooSmall { len: u64, min: u64 },

    #[error(
        "truncated record at offset {offset}: could not read {field}{}",
        .id.map(|id| format!(" of entry {id}")).unwrap_or_default()
    )]
    TruncatedRecord {
        offset: u64,
        field: RecordField,
        id: Option<u32>,
    },

    #[error("entry {id} at offset {offset} declares {len} bytes of text, the limit is {max}")]
    OversizedString {
        id: u32,
        offset: u64,
        len: usize,
        max: usize,
    },

    #[error(
        "truncated string in entry {id} at offset {offset}: {len} bytes declared, {available} available"
    )]
    TruncatedString {
        id: u32,
        offset: u64,
        len: usize,
        available: usize,
    },

    #[error("entry {id} contains a {kind} at offset {offset}")]
    EmbeddedLineBreak {
        id: u32,
        offset: u64,
        kind: LineBreak,
    },

    #[error("entry {id} has {len} bytes of text, exceeding the maximum of {max}")]
    StringTooLong { id: u32, len: usize, max: usize },

    #[error("malformed line {line}: `{content}` (expected `<id>;<text>;<flag>`)")]
    MalformedLine { line: u64, content: String },

    #[error("invalid id `{value}` on line {line}")]
    InvalidId { line: u64, value: String },

    #[error("invalid flag `{value}` for entry {id} on line {line}")]
    InvalidFlag { line: u64, id: u32, value: String },

    #[error("could not open temporary scratch stream: {0}")]
    ScratchOpenFailed(#[source] io::Error),

    #[error("could not open output file `{}`: {source}", path.display())]
    DestinationOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("conversion produced no output")]
    EmptyResult,

    #[error("could not write output file: {0}")]
    CopyError(#[source] io::Error),

    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("can only convert from cliloc to csv and csv to cliloc, not {from} to {to}")]
    UnsupportedConversion { from: FormatType, to: FormatType },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` for failures that only disqualify the current record.
    ///
    /// The converter logs these as warnings, skips the record and carries on.
    pub fn is_record_skip(&self) -> bool {
        matches!(self, Error::StringTooLong { .. })
    }

    /// Byte offset or line number the error refers to, if it has one.
    pub fn position(&self) -> Option<Position> {
        match *self {
            Error::TruncatedRecord { offset, .. }
            | Error::OversizedString { offset, .. }
            | Error::TruncatedString { offset, .. }
            | Error::EmbeddedLineBreak { offset, .. } => Some(Position::Offset(offset)),
            Error::MalformedLine { line, .. }
            | Error::InvalidId { line, .. }
            | Error::InvalidFlag { line, .. } => Some(Position::Line(line)),
            _ => None,
        }
    }
}
