//! Support for the binary cliloc format.
//!
//! A cliloc file is a 6-byte header followed by a flat run of records. Every
//! record is a little-endian `u32` id, a `u8` flag, a little-endian `u16` text
//! length and that many bytes of text. The header is written verbatim and only
//! its presence is checked on read.

use std::io::{BufRead, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    error::{Error, LineBreak, RecordField},
    options::ConvertOptions,
    traits::{Parser, RecordSource, RecordWriter},
    types::{ClilocRecord, Position},
};

/// Header written at the start of every cliloc file: version `2`, marker `1`.
pub const HEADER: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x01, 0x00];

/// Size of [`HEADER`] in bytes.
pub const HEADER_LEN: usize = HEADER.len();

/// Size of the id, flag and length fields that precede a record's text.
const RECORD_PREFIX_LEN: u64 = 7;

/// Decodes one record at the cursor's position.
///
/// Returns the record and the number of bytes consumed. Text longer than
/// `max_string_len` is rejected before any of it is read.
///
/// # Errors
///
/// [`Error::TruncatedRecord`] if a fixed-width field runs past the end of the input,
/// [`Error::OversizedString`], [`Error::TruncatedString`] if fewer than the declared
/// number of text bytes remain, and [`Error::EmbeddedLineBreak`] if the text contains
/// `\n` or `\r`.
pub fn decode_record(
    cursor: &mut Cursor<&[u8]>,
    max_string_len: usize,
) -> Result<(ClilocRecord, usize), Error> {
    let offset = cursor.position();
    let truncated = |field, id| Error::TruncatedRecord { offset, field, id };

    let id = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated(RecordField::Id, None))?;
    let flag = cursor
        .read_u8()
        .map_err(|_| truncated(RecordField::Flag, Some(id)))?;
    let len = cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| truncated(RecordField::Length, Some(id)))? as usize;

    if len > max_string_len {
        return Err(Error::OversizedString {
            id,
            offset,
            len,
            max: max_string_len,
        });
    }

    let available = remaining(cursor);
    if len > available {
        return Err(Error::TruncatedString {
            id,
            offset,
            len,
            available,
        });
    }

    let mut text = vec![0u8; len];
    cursor.read_exact(&mut text)?;
    reject_line_breaks(id, offset + RECORD_PREFIX_LEN, &text)?;

    let consumed = (cursor.position() - offset) as usize;
    Ok((ClilocRecord { id, flag, text }, consumed))
}

/// Encodes one record.
///
/// # Errors
///
/// [`Error::StringTooLong`] if the text is longer than `max_string_len`; nothing is
/// written in that case.
pub fn encode_record<W: Write>(
    writer: &mut W,
    record: &ClilocRecord,
    max_string_len: usize,
) -> Result<(), Error> {
    let len = record.text.len();
    if len > max_string_len {
        return Err(Error::StringTooLong {
            id: record.id,
            len,
            max: max_string_len,
        });
    }

    writer.write_u32::<LittleEndian>(record.id)?;
    writer.write_u8(record.flag)?;
    writer.write_u16::<LittleEndian>(len as u16)?;
    if len > 0 {
        writer.write_all(&record.text)?;
    }
    Ok(())
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor
        .get_ref()
        .len()
        .saturating_sub(cursor.position() as usize)
}

fn reject_line_breaks(id: u32, text_offset: u64, text: &[u8]) -> Result<(), Error> {
    for kind in [LineBreak::LineFeed, LineBreak::CarriageReturn] {
        if let Some(index) = text.iter().position(|&b| b == kind.byte()) {
            return Err(Error::EmbeddedLineBreak {
                id,
                offset: text_offset + index as u64,
                kind,
            });
        }
    }
    Ok(())
}

/// Iterates the records of an in-memory cliloc file, in file order.
pub struct ClilocReader<'a> {
    cursor: Cursor<&'a [u8]>,
    record_offset: u64,
    max_string_len: usize,
    failed: bool,
}

impl<'a> ClilocReader<'a> {
    /// Skips the header and positions the reader on the first record.
    ///
    /// # Errors
    ///
    /// [`Error::SourceTooSmall`] if `data` cannot even hold the header.
    pub fn new(data: &'a [u8], options: &ConvertOptions) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::SourceTooSmall {
                len: data.len() as u64,
                min: HEADER_LEN as u64,
            });
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(HEADER_LEN as u64);
        Ok(ClilocReader {
            cursor,
            record_offset: HEADER_LEN as u64,
            max_string_len: options.max_string_len,
            failed: false,
        })
    }
}

impl Iterator for ClilocReader<'_> {
    type Item = Result<ClilocRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || remaining(&self.cursor) == 0 {
            return None;
        }

        self.record_offset = self.cursor.position();
        match decode_record(&mut self.cursor, self.max_string_len) {
            Ok((record, _)) => Some(Ok(record)),
            Err(e) => {
                // Record boundaries are lost after a decode failure.
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl RecordSource for ClilocReader<'_> {
    fn location(&self) -> Position {
        Position::Offset(self.record_offset)
    }
}

/// Encodes records into a cliloc stream, header first.
pub struct ClilocWriter<W: Write> {
    inner: W,
    max_string_len: usize,
}

impl<W: Write> ClilocWriter<W> {
    /// Writes the header and returns a writer ready for records.
    pub fn new(mut inner: W, options: &ConvertOptions) -> Result<Self, Error> {
        inner.write_all(&HEADER)?;
        Ok(ClilocWriter {
            inner,
            max_string_len: options.max_string_len,
        })
    }
}

impl<W: Write> RecordWriter for ClilocWriter<W> {
    fn write_record(&mut self, record: &ClilocRecord) -> Result<(), Error> {
        encode_record(&mut self.inner, record, self.max_string_len)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.flush()?;
        Ok(())
    }
}

/// A complete cliloc file held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClilocFile {
    pub records: Vec<ClilocRecord>,
}

impl ClilocFile {
    pub fn new(records: Vec<ClilocRecord>) -> Self {
        ClilocFile { records }
    }
}

impl Parser for ClilocFile {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let records = ClilocReader::new(&data, &ConvertOptions::default())?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClilocFile { records })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = ClilocWriter::new(writer, &ConvertOptions::default())?;
        for record in &self.records {
            match writer.write_record(record) {
                Err(e) if e.is_record_skip() => tracing::warn!("{}; skipping", e),
                other => other?,
            }
        }
        writer.flush()
    }
}
