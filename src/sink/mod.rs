//! Destinations for written chunks.
//!
//! - [`ChunkSink`] - Persists one chunk's bytes at a path
//! - [`FileSink`] - Writes to the filesystem, creating or truncating files
//! - [`MemorySink`] - Keeps writes in memory

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Persists chunks. Called concurrently from every writer thread.
pub trait ChunkSink: Send + Sync {
    /// Writes `bytes` to `path`, replacing whatever was there.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

impl<S: ChunkSink + ?Sized> ChunkSink for std::sync::Arc<S> {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write(path, bytes)
    }
}

impl<S: ChunkSink + ?Sized> ChunkSink for &S {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write(path, bytes)
    }
}

/// Writes each chunk to its own file.
///
/// The destination directory must already exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl ChunkSink for FileSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }
}

/// Collects chunks in memory, keyed by destination path.
///
/// # Example
///
/// ```
/// use linesplit::{ChunkSink, MemorySink};
/// use std::path::Path;
///
/// let sink = MemorySink::new();
/// sink.write(Path::new("tmp_a01.csv"), b"a,b\n")?;
/// assert_eq!(sink.get("tmp_a01.csv"), Some(b"a,b\n".to_vec()));
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of what was written to `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Number of distinct paths written.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes every written file, ordered by path.
    pub fn into_files(self) -> BTreeMap<PathBuf, Vec<u8>> {
        match self.files.into_inner() {
            Ok(files) => files,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ChunkSink for MemorySink {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.lock().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
