//! Traits for format-agnostic reading and writing of cliloc records.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::{
    error::Error,
    types::{ClilocRecord, Position},
};

/// A trait for parsing and writing a whole file of records at once.
///
/// Over-length records are skipped with a warning on both read and write,
/// the same policy the converter applies.
///
/// # Example
///
/// ```rust,no_run
/// use cliloc::traits::Parser;
/// let file = cliloc::formats::ClilocFile::read_from("cliloc.enu")?;
/// file.write_to("cliloc_copy.enu")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::SourceOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::DestinationOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}

/// A sequential source of decoded records.
///
/// Callers decide whether an error skips the record or aborts the run.
/// A source stops by itself after an error it cannot resynchronize from.
pub trait RecordSource: Iterator<Item = Result<ClilocRecord, Error>> {
    /// Position of the record most recently yielded.
    fn location(&self) -> Position;
}

/// A sink that encodes records one at a time.
pub trait RecordWriter {
    /// Encode one record.
    ///
    /// Returns [`Error::StringTooLong`] without writing anything when the
    /// record cannot be represented; the sink stays usable.
    fn write_record(&mut self, record: &ClilocRecord) -> Result<(), Error>;

    /// Flush everything written so far to the underlying writer.
    fn flush(&mut self) -> Result<(), Error>;
}
