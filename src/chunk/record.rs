//! Metadata kept for every chunk that was written.

use std::fmt;
use std::path::PathBuf;

use crate::hash::ChunkHash;

/// Describes one output file produced by a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    /// 1-based chunk ordinal.
    pub ordinal: usize,
    /// Destination the chunk was written to.
    pub path: PathBuf,
    /// Offset of the chunk in the source.
    pub offset: u64,
    /// Number of bytes written.
    pub len: usize,
    /// Digest of the written bytes, if hashing was enabled.
    pub hash: Option<ChunkHash>,
}

impl ChunkRecord {
    /// Returns the end offset (exclusive) in the source.
    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}

impl fmt::Display for ChunkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.path.display(), self.len)?;
        if let Some(hash) = self.hash {
            write!(f, " blake3={}", hash)?;
        }
        Ok(())
    }
}
