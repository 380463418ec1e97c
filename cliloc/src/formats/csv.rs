//! Support for the semicolon-delimited CSV form of a cliloc file.
//!
//! Each line is `<id>;<text>;<flag>`. The first and the last `;` on a line
//! delimit the fields, so the text may itself contain `;`. No quoting or
//! escaping is applied in either direction.
use std::io::{BufRead, Read, Write};

use crate::{
    error::Error,
    options::ConvertOptions,
    traits::{Parser, RecordSource, RecordWriter},
    types::{ClilocRecord, Position},
};

/// Field delimiter.
pub const DELIMITER: u8 = b';';

/// Reads CSV lines and decodes each into a [`ClilocRecord`].
///
/// Blank lines are ignored. A line whose text exceeds the configured maximum
/// yields [`Error::StringTooLong`] and reading continues with the next line.
pub struct CsvReader<R: Read> {
    inner: csv::Reader<R>,
    record: csv::ByteRecord,
    line: u64,
    options: ConvertOptions,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R, options: &ConvertOptions) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(DELIMITER)
            .quoting(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_reader(reader);
        CsvReader {
            inner,
            record: csv::ByteRecord::new(),
            line: 0,
            options: options.clone(),
        }
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<ClilocRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.line = self
                    .record
                    .position()
                    .map_or(self.line + 1, |position| position.line());
                Some(decode_fields(&self.record, self.line, &self.options))
            }
            Err(e) => Some(Err(Error::Csv(e))),
        }
    }
}

impl<R: Read> RecordSource for CsvReader<R> {
    fn location(&self) -> Position {
        Position::Line(self.line)
    }
}

/// Decodes a single line, with or without its trailing newline.
///
/// # Errors
///
/// [`Error::MalformedLine`] for fewer than two delimiters or an empty id field,
/// [`Error::InvalidId`], [`Error::InvalidFlag`], and [`Error::StringTooLong`] when
/// the text is longer than the configured maximum.
pub fn decode_line(line: &[u8], options: &ConvertOptions) -> Result<ClilocRecord, Error> {
    CsvReader::new(line, options)
        .next()
        .unwrap_or_else(|| {
            Err(Error::MalformedLine {
                line: 1,
                content: String::from_utf8_lossy(line).trim_end().to_string(),
            })
        })
}

fn decode_fields(
    fields: &csv::ByteRecord,
    line: u64,
    options: &ConvertOptions,
) -> Result<ClilocRecord, Error> {
    let malformed = || Error::MalformedLine {
        line,
        content: String::from_utf8_lossy(&join_fields(fields.iter())).to_string(),
    };

    let count = fields.len();
    if count < 3 {
        return Err(malformed());
    }
    let id_field = &fields[0];
    if id_field.is_empty() {
        return Err(malformed());
    }

    let id = parse_id(id_field).ok_or_else(|| Error::InvalidId {
        line,
        value: String::from_utf8_lossy(id_field).to_string(),
    })?;

    let flag_field = &fields[count - 1];
    let flag = parse_flag(flag_field, options.strict_flags).ok_or_else(|| Error::InvalidFlag {
        line,
        id,
        value: String::from_utf8_lossy(flag_field).trim().to_string(),
    })?;

    let text = join_fields(fields.iter().skip(1).take(count - 2));
    if text.len() > options.max_string_len {
        return Err(Error::StringTooLong {
            id,
            len: text.len(),
            max: options.max_string_len,
        });
    }

    Ok(ClilocRecord { id, flag, text })
}

/// Restores the delimiters between fields the CSV reader split apart.
fn join_fields<'a>(fields: impl Iterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut joined = Vec::new();
    for (i, field) in fields.enumerate() {
        if i > 0 {
            joined.push(DELIMITER);
        }
        joined.extend_from_slice(field);
    }
    joined
}

/// Zero is not a valid id.
fn parse_id(field: &[u8]) -> Option<u32> {
    std::str::from_utf8(field)
        .ok()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&id| id != 0)
}

fn parse_flag(field: &[u8], strict: bool) -> Option<u8> {
    let value = std::str::from_utf8(field).ok()?.trim().parse::<i64>().ok()?;
    if strict {
        u8::try_from(value).ok()
    } else {
        Some(value as u8)
    }
}

/// Writes records as `<id>;<text>;<flag>\n` lines.
pub struct CsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(DELIMITER)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        CsvWriter { inner }
    }
}

impl<W: Write> RecordWriter for CsvWriter<W> {
    fn write_record(&mut self, record: &ClilocRecord) -> Result<(), Error> {
        self.inner.write_record([
            record.id.to_string().as_bytes(),
            record.text.as_slice(),
            record.flag.to_string().as_bytes(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Encodes one record as a complete CSV line.
pub fn encode_line(record: &ClilocRecord) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    {
        let mut writer = CsvWriter::new(&mut out);
        writer.write_record(record)?;
        writer.flush()?;
    }
    Ok(out)
}

/// A complete CSV file held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvFile {
    pub records: Vec<ClilocRecord>,
}

impl CsvFile {
    pub fn new(records: Vec<ClilocRecord>) -> Self {
        CsvFile { records }
    }
}

impl Parser for CsvFile {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut records = Vec::new();
        for result in CsvReader::new(reader, &ConvertOptions::default()) {
            match result {
                Ok(record) => records.push(record),
                Err(e) if e.is_record_skip() => tracing::warn!("{}; skipping", e),
                Err(e) => return Err(e),
            }
        }
        Ok(CsvFile { records })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = CsvWriter::new(writer);
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()
    }
}
