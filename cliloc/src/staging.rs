//! Staged output: converted bytes go to an anonymous scratch file first and
//! reach the destination path only once the whole conversion has succeeded.
//!
//! The scratch file has no name on disk and is removed by the OS when it is
//! dropped, so an aborted conversion leaves nothing behind and never touches
//! the destination.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use crate::error::Error;

/// Buffers a complete conversion result before committing it.
pub struct StagedWriter {
    scratch: BufWriter<File>,
}

impl StagedWriter {
    /// Opens a fresh anonymous scratch stream.
    pub fn new() -> Result<Self, Error> {
        let file = tempfile::tempfile().map_err(Error::ScratchOpenFailed)?;
        Ok(StagedWriter {
            scratch: BufWriter::new(file),
        })
    }

    /// Copies the staged bytes to `destination`, truncating it, and returns the
    /// number of bytes written.
    ///
    /// The emptiness check happens before the destination is opened, so an empty
    /// result leaves an existing destination untouched.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyResult`] if nothing was staged, [`Error::DestinationOpenFailed`]
    /// if the destination cannot be created, and [`Error::CopyError`] if reading
    /// back the scratch stream or writing the destination fails.
    pub fn commit<P: AsRef<Path>>(self, destination: P, chunk_size: usize) -> Result<u64, Error> {
        let mut scratch = self
            .scratch
            .into_inner()
            .map_err(|e| Error::CopyError(e.into_error()))?;

        let len = scratch.seek(SeekFrom::End(0)).map_err(Error::CopyError)?;
        if len == 0 {
            return Err(Error::EmptyResult);
        }
        scratch.seek(SeekFrom::Start(0)).map_err(Error::CopyError)?;

        let destination = destination.as_ref();
        let mut output = File::create(destination).map_err(|source| Error::DestinationOpenFailed {
            path: destination.to_path_buf(),
            source,
        })?;
        tracing::debug!("Committing {} staged bytes to {:?}", len, destination);

        copy_in_chunks(&mut scratch, &mut output, len, chunk_size).map_err(Error::CopyError)?;
        output.sync_all().map_err(Error::CopyError)?;
        Ok(len)
    }
}

impl Write for StagedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.scratch.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.scratch.flush()
    }
}

/// Copies exactly `len` bytes using a buffer of at most `chunk_size` bytes.
///
/// A source shorter than `len` is an error rather than a short copy.
pub(crate) fn copy_in_chunks<R: Read, W: Write>(
    from: &mut R,
    to: &mut W,
    len: u64,
    chunk_size: usize,
) -> io::Result<()> {
    let chunk_size = chunk_size.max(1);
    let mut buffer = vec![0u8; usize::try_from(len).map_or(chunk_size, |len| len.min(chunk_size))];
    let mut remaining = len;
    while remaining > 0 {
        let n = usize::try_from(remaining).map_or(buffer.len(), |r| r.min(buffer.len()));
        from.read_exact(&mut buffer[..n])?;
        to.write_all(&buffer[..n])?;
        remaining -= n as u64;
    }
    to.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_copy_in_chunks_copies_everything() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut out = Vec::new();
        copy_in_chunks(&mut Cursor::new(&data), &mut out, data.len() as u64, 333).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_in_chunks_fails_on_short_source() {
        let mut out = Vec::new();
        let result = copy_in_chunks(&mut Cursor::new(vec![1u8; 10]), &mut out, 20, 4);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_commit_writes_staged_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.csv");

        let mut staged = StagedWriter::new().unwrap();
        staged.write_all(b"1;ABC;5\n").unwrap();
        staged.write_all(b"2;DEF;0\n").unwrap();
        let written = staged.commit(&destination, 3).unwrap();

        assert_eq!(written, 16);
        assert_eq!(std::fs::read(&destination).unwrap(), b"1;ABC;5\n2;DEF;0\n");
    }

    #[test]
    fn test_commit_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.csv");
        std::fs::write(&destination, vec![b'x'; 4096]).unwrap();

        let mut staged = StagedWriter::new().unwrap();
        staged.write_all(b"short").unwrap();
        staged.commit(&destination, 1024).unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"short");
    }

    #[test]
    fn test_empty_result_does_not_touch_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.csv");
        std::fs::write(&destination, b"previous").unwrap();

        let staged = StagedWriter::new().unwrap();
        let result = staged.commit(&destination, 1024);

        assert!(matches!(result, Err(Error::EmptyResult)));
        assert_eq!(std::fs::read(&destination).unwrap(), b"previous");
    }

    #[test]
    fn test_destination_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing").join("out.csv");

        let mut staged = StagedWriter::new().unwrap();
        staged.write_all(b"data").unwrap();
        let result = staged.commit(&destination, 1024);

        assert!(matches!(result, Err(Error::DestinationOpenFailed { .. })));
        assert!(!destination.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_commit_write_failure_is_copy_error() {
        // Every write to /dev/full fails with ENOSPC.
        let mut staged = StagedWriter::new().unwrap();
        staged.write_all(&vec![b'x'; 4096]).unwrap();
        let result = staged.commit("/dev/full", 1024);

        match result {
            Err(Error::CopyError(e)) => assert_eq!(e.raw_os_error(), Some(28)),
            other => panic!("expected a copy error, got {:?}", other),
        }
    }
}
