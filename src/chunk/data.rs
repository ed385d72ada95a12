//! The Chunk type - a planned piece of the source file.

use std::fmt;

use crate::buffer::PooledBuffer;

/// A contiguous, line-aligned range of the source.
///
/// The bytes live in a buffer borrowed from the split's pool; dropping the
/// chunk returns the buffer. A chunk moves from the planner to exactly one
/// writer, so its buffer never has two owners.
#[derive(Debug)]
pub struct Chunk {
    ordinal: usize,
    offset: u64,
    data: PooledBuffer,
}

impl Chunk {
    pub(crate) fn new(ordinal: usize, offset: u64, data: PooledBuffer) -> Self {
        Self {
            ordinal,
            offset,
            data,
        }
    }

    /// Returns the 1-based position of this chunk in read order.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Returns the offset of the first byte in the source.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the chunk content.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a byte range of the source.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Returns true if the last byte is `terminator`.
    pub fn ends_with(&self, terminator: u8) -> bool {
        self.data.last() == Some(&terminator)
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk #{} ({} bytes @ {})",
            self.ordinal,
            self.len(),
            self.offset
        )
    }
}
