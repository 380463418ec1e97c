//! Conversion driver: reads every record from the source with one codec,
//! re-encodes it with the other, stages the full result and commits it.
//!
//! Conversions are strictly sequential and preserve record order. Any
//! structural failure aborts before the destination is opened, so a failed run
//! never leaves a partial output file behind.

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use crate::{
    error::Error,
    formats::{
        ClilocReader, ClilocWriter, CsvReader, CsvWriter, FormatType,
        infer_format_from_extension,
    },
    options::ConvertOptions,
    staging::StagedWriter,
    traits::{RecordSource, RecordWriter},
    types::{ConversionReport, Direction, Warning},
};

impl Direction {
    /// Picks the direction from the two formats.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedConversion`] unless exactly one side is a cliloc file
    /// and the other is CSV.
    pub fn from_formats(source: FormatType, destination: FormatType) -> Result<Self, Error> {
        match (source, destination) {
            (FormatType::Cliloc(_), FormatType::Csv) => Ok(Direction::BinaryToText),
            (FormatType::Csv, FormatType::Cliloc(_)) => Ok(Direction::TextToBinary),
            (from, to) => Err(Error::UnsupportedConversion { from, to }),
        }
    }

    /// Picks the direction from the extensions of the two paths.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownFormat`] naming the first path whose extension is not
    /// recognised, or [`Error::UnsupportedConversion`].
    ///
    /// # Example
    /// ```rust
    /// use cliloc::Direction;
    /// assert_eq!(Direction::from_paths("cliloc.deu", "german.csv")?, Direction::BinaryToText);
    /// assert_eq!(Direction::from_paths("german.csv", "cliloc.deu")?, Direction::TextToBinary);
    /// assert!(Direction::from_paths("a.csv", "b.csv").is_err());
    /// # Ok::<(), cliloc::Error>(())
    /// ```
    pub fn from_paths<P: AsRef<Path>>(source: P, destination: P) -> Result<Self, Error> {
        let detect = |path: &Path| {
            infer_format_from_extension(path)
                .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))
        };
        Direction::from_formats(detect(source.as_ref())?, detect(destination.as_ref())?)
    }
}

/// Converts `source` into `destination` in the given direction.
///
/// The destination is created (or truncated) only after every record has been
/// converted successfully.
///
/// # Example
///
/// ```rust,no_run
/// use cliloc::{ConvertOptions, Direction, convert};
/// let report = convert(Direction::BinaryToText, "cliloc.enu", "english.csv", &ConvertOptions::default())?;
/// println!("{} records", report.records_written);
/// Ok::<(), cliloc::Error>(())
/// ```
pub fn convert<P: AsRef<Path>>(
    direction: Direction,
    source: P,
    destination: P,
    options: &ConvertOptions,
) -> Result<ConversionReport, Error> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    tracing::info!(
        "Converting {}: {:?} -> {:?}",
        direction,
        source,
        destination
    );

    let (mut report, staged) = match direction {
        Direction::BinaryToText => {
            let data = std::fs::read(source).map_err(|e| open_failed(source, e))?;
            tracing::debug!("Read {} bytes from {:?}", data.len(), source);
            let mut records = ClilocReader::new(&data, options)?;
            let mut staged = StagedWriter::new()?;
            let report = transcode(&mut records, CsvWriter::new(&mut staged), direction)?;
            (report, staged)
        }
        Direction::TextToBinary => {
            let file = File::open(source).map_err(|e| open_failed(source, e))?;
            let mut records = CsvReader::new(BufReader::new(file), options);
            let mut staged = StagedWriter::new()?;
            let sink = ClilocWriter::new(&mut staged, options)?;
            let report = transcode(&mut records, sink, direction)?;
            (report, staged)
        }
    };

    report.bytes_written = staged.commit(destination, options.copy_chunk_size)?;
    tracing::info!(
        "Conversion complete: {} records written, {} skipped",
        report.records_written,
        report.records_skipped
    );
    Ok(report)
}

/// Like [`convert`], with the direction inferred by [`Direction::from_paths`].
pub fn convert_auto<P: AsRef<Path>>(
    source: P,
    destination: P,
    options: &ConvertOptions,
) -> Result<ConversionReport, Error> {
    let direction = Direction::from_paths(source.as_ref(), destination.as_ref())?;
    convert(direction, source, destination, options)
}

/// Decodes an in-memory cliloc file and writes its CSV form to `writer`.
///
/// `bytes_written` in the returned report is left at zero.
pub fn cliloc_to_csv_writer<W: Write>(
    data: &[u8],
    writer: W,
    options: &ConvertOptions,
) -> Result<ConversionReport, Error> {
    let mut source = ClilocReader::new(data, options)?;
    transcode(&mut source, CsvWriter::new(writer), Direction::BinaryToText)
}

/// Reads CSV lines from `reader` and writes the cliloc form, header first, to `writer`.
///
/// `bytes_written` in the returned report is left at zero.
pub fn csv_to_cliloc_writer<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConversionReport, Error> {
    let mut source = CsvReader::new(reader, options);
    let sink = ClilocWriter::new(writer, options)?;
    transcode(&mut source, sink, Direction::TextToBinary)
}

fn transcode<S, W>(
    source: &mut S,
    mut sink: W,
    direction: Direction,
) -> Result<ConversionReport, Error>
where
    S: RecordSource,
    W: RecordWriter,
{
    let mut report = ConversionReport::new(direction);
    while let Some(next) = source.next() {
        let written = next.and_then(|record| {
            if record.text.is_empty() {
                report.warn(Warning::ZeroLengthString {
                    id: record.id,
                    position: source.location(),
                });
            }
            if record.text.contains(&b'\r') {
                report.warn(Warning::CarriageReturn {
                    id: record.id,
                    position: source.location(),
                });
            }
            sink.write_record(&record)
        });

        match written {
            Ok(()) => report.records_written += 1,
            Err(Error::StringTooLong { id, len, max }) => report.warn(Warning::SkippedRecord {
                id,
                len,
                max,
                position: source.location(),
            }),
            Err(e) => return Err(e),
        }
    }
    sink.flush()?;
    Ok(report)
}

fn open_failed(path: &Path, source: std::io::Error) -> Error {
    Error::SourceOpenFailed {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{Locale, cliloc::HEADER};
    use crate::types::Position;
    use indoc::indoc;

    const ABC_FILE: [u8; 16] = [
        0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x03, 0x00, b'A', b'B',
        b'C',
    ];

    #[test]
    fn test_direction_from_formats() {
        assert_eq!(
            Direction::from_formats(FormatType::Cliloc(Locale::Enu), FormatType::Csv).unwrap(),
            Direction::BinaryToText
        );
        assert_eq!(
            Direction::from_formats(FormatType::Csv, FormatType::Cliloc(Locale::Fra)).unwrap(),
            Direction::TextToBinary
        );
        assert!(matches!(
            Direction::from_formats(FormatType::Cliloc(Locale::Enu), FormatType::Cliloc(Locale::Deu)),
            Err(Error::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_direction_from_paths_unknown_extension() {
        let error = Direction::from_paths("cliloc.txt", "out.csv").unwrap_err();
        assert!(matches!(error, Error::UnknownFormat(ref p) if p == "cliloc.txt"));

        let error = Direction::from_paths("cliloc.enu", "out").unwrap_err();
        assert!(matches!(error, Error::UnknownFormat(ref p) if p == "out"));
    }

    #[test]
    fn test_cliloc_to_csv_in_memory() {
        let mut out = Vec::new();
        let report = cliloc_to_csv_writer(&ABC_FILE, &mut out, &ConvertOptions::default()).unwrap();
        assert_eq!(out, b"1;ABC;5\n");
        assert_eq!(report.direction, Direction::BinaryToText);
        assert_eq!(report.records_written, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_csv_to_cliloc_in_memory() {
        let mut out = Vec::new();
        let report =
            csv_to_cliloc_writer(&b"1;ABC;5\n"[..], &mut out, &ConvertOptions::default()).unwrap();
        assert_eq!(out, ABC_FILE);
        assert_eq!(report.records_written, 1);
    }

    #[test]
    fn test_zero_length_string_warns_but_is_written() {
        let mut out = Vec::new();
        let report =
            csv_to_cliloc_writer(&b"7;;1\n"[..], &mut out, &ConvertOptions::default()).unwrap();

        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[0x07, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(out, expected);
        assert_eq!(report.records_written, 1);
        assert_eq!(
            report.warnings,
            vec![Warning::ZeroLengthString {
                id: 7,
                position: Position::Line(1)
            }]
        );
    }

    #[test]
    fn test_over_length_line_is_skipped() {
        let input = format!("1;first;0\n2;{};0\n3;third;0\n", "x".repeat(70000));
        let mut out = Vec::new();
        let report =
            csv_to_cliloc_writer(input.as_bytes(), &mut out, &ConvertOptions::default()).unwrap();

        assert_eq!(report.records_written, 2);
        assert_eq!(report.records_skipped, 1);
        assert_eq!(
            report.warnings,
            vec![Warning::SkippedRecord {
                id: 2,
                len: 70000,
                max: 65535,
                position: Position::Line(2)
            }]
        );

        let mut csv = Vec::new();
        cliloc_to_csv_writer(&out, &mut csv, &ConvertOptions::default()).unwrap();
        assert_eq!(csv, b"1;first;0\n3;third;0\n");
    }

    #[test]
    fn test_warnings_carry_source_location() {
        let mut packed = Vec::new();
        let report =
            csv_to_cliloc_writer(&b"1;a;0\n2;;0\n"[..], &mut packed, &ConvertOptions::default())
                .unwrap();
        assert_eq!(
            report.warnings,
            vec![Warning::ZeroLengthString {
                id: 2,
                position: Position::Line(2)
            }]
        );

        let mut csv = Vec::new();
        let report = cliloc_to_csv_writer(&packed, &mut csv, &ConvertOptions::default()).unwrap();
        assert_eq!(
            report.warnings,
            vec![Warning::ZeroLengthString {
                id: 2,
                position: Position::Offset(14)
            }]
        );
    }

    #[test]
    fn test_carriage_return_in_csv_text_warns() {
        let mut out = Vec::new();
        let report = csv_to_cliloc_writer(
            &b"1;ok;0\n2;split\rtext;0\n"[..],
            &mut out,
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(report.records_written, 2);
        assert_eq!(
            report.warnings,
            vec![Warning::CarriageReturn {
                id: 2,
                position: Position::Line(2)
            }]
        );

        let error = cliloc_to_csv_writer(&out, &mut Vec::new(), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(error, Error::EmbeddedLineBreak { id: 2, .. }));
    }

    #[test]
    fn test_structural_error_aborts() {
        let input = indoc! {"
            1;fine;0
            broken line
            3;never reached;0
        "};
        let mut out = Vec::new();
        let error =
            csv_to_cliloc_writer(input.as_bytes(), &mut out, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(error, Error::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_header_only_cliloc_produces_no_records() {
        let mut out = Vec::new();
        let report = cliloc_to_csv_writer(&HEADER, &mut out, &ConvertOptions::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(report.records_written, 0);
    }

    #[test]
    fn test_convert_reports_bytes_written() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cliloc.enu");
        let destination = dir.path().join("english.csv");
        std::fs::write(&source, ABC_FILE).unwrap();

        let report = convert_auto(&source, &destination, &ConvertOptions::default()).unwrap();
        assert_eq!(report.bytes_written, 8);
        assert_eq!(std::fs::read(&destination).unwrap(), b"1;ABC;5\n");
    }

    #[test]
    fn test_convert_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.csv");
        let destination = dir.path().join("cliloc.enu");

        let error = convert(
            Direction::TextToBinary,
            &source,
            &destination,
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, Error::SourceOpenFailed { .. }));
        assert!(!destination.exists());
    }
}
