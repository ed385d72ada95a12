//! BLAKE3 digest state owned by a writer thread.

use super::ChunkHash;

/// Reusable BLAKE3 state; each writer thread keeps one for all its chunks.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChunkHasher {
    state: blake3::Hasher,
}

impl ChunkHasher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Digests `data` and resets the state for the next chunk.
    pub(crate) fn digest(&mut self, data: &[u8]) -> ChunkHash {
        self.state.update(data);
        let hash = ChunkHash::new(self.state.finalize().into());
        self.state.reset();
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_one_shot() {
        let mut hasher = ChunkHasher::new();
        let hash = hasher.digest(b"a,b\nc,d\n");
        assert_eq!(hash.as_bytes(), blake3::hash(b"a,b\nc,d\n").as_bytes());
    }

    #[test]
    fn test_state_is_reset_between_chunks() {
        let mut hasher = ChunkHasher::new();
        let first = hasher.digest(b"e,f\n");
        let _ = hasher.digest(b"something else\n");
        let again = hasher.digest(b"e,f\n");
        assert_eq!(first, again);
    }
}
