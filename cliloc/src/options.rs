//! Options controlling how records are validated and how output is committed.

/// Largest text a cliloc record can carry; its length field is 16 bits wide.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Default chunk size used when copying the staged result to its destination.
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 1024 * 1024;

/// Conversion behavior options for [`crate::convert`] and the in-memory transcoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Rejects CSV flags outside `0..=255` instead of truncating them to 8 bits.
    pub strict_flags: bool,
    /// Longest text accepted, in bytes. Never above [`MAX_STRING_LEN`].
    pub max_string_len: usize,
    /// Chunk size for the final copy to the destination. Never zero.
    pub copy_chunk_size: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            strict_flags: false,
            max_string_len: MAX_STRING_LEN,
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
        }
    }
}

impl ConvertOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables strict flag range checking.
    pub fn with_strict_flags(mut self, strict_flags: bool) -> Self {
        self.strict_flags = strict_flags;
        self
    }

    /// Sets the longest accepted text, clamped to [`MAX_STRING_LEN`].
    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len.min(MAX_STRING_LEN);
        self
    }

    /// Sets the copy chunk size; zero is raised to one byte.
    pub fn with_copy_chunk_size(mut self, copy_chunk_size: usize) -> Self {
        self.copy_chunk_size = copy_chunk_size.max(1);
        self
    }
}
