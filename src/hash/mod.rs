//! Digests of written chunks.
//!
//! - [`ChunkHash`] - 32-byte digest recorded for each chunk
//! - `ChunkHasher` - per-worker BLAKE3 state (requires `hash-blake3` feature)

use std::fmt;

#[cfg(feature = "hash-blake3")]
mod blake3;

#[cfg(feature = "hash-blake3")]
pub(crate) use self::blake3::ChunkHasher;

/// A 32-byte digest of a chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkHash([u8; 32]);

impl ChunkHash {
    /// The size of the digest in bytes.
    pub const SIZE: usize = 32;

    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl AsRef<[u8]> for ChunkHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChunkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        let hash = ChunkHash::new([0xABu8; 32]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_display_prefix() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0x01, 0x23, 0xCD, 0xEF]);
        let s = ChunkHash::new(bytes).to_string();
        assert!(s.starts_with("0123cdef"));
        assert!(s.ends_with("00"));
    }
}
