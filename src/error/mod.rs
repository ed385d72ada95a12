//! Error types for linesplit.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while splitting a file.
#[derive(Debug)]
pub enum SplitError {
    /// The source file could not be opened or its size could not be queried.
    SourceOpen {
        /// Path of the source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the source failed part way through a chunk.
    Read {
        /// Ordinal of the chunk being planned when the read failed.
        ordinal: usize,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// One or more chunks could not be written.
    ///
    /// Failures are sorted by ordinal and reported once, after every
    /// dispatched chunk has finished.
    ChunkWrites(Vec<ChunkFailure>),

    /// A writer thread panicked.
    WorkerPanicked {
        /// Index of the worker thread.
        worker: usize,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// Any other I/O error.
    Io(std::io::Error),
}

/// A single chunk that failed to reach its destination.
#[derive(Debug)]
pub struct ChunkFailure {
    /// 1-based chunk ordinal.
    pub ordinal: usize,
    /// Destination that could not be written.
    pub path: PathBuf,
    /// Underlying I/O error.
    pub source: std::io::Error,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk {} ({}): {}",
            self.ordinal,
            self.path.display(),
            self.source
        )
    }
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitError::SourceOpen { path, source } => {
                write!(f, "cannot open source {}: {}", path.display(), source)
            }
            SplitError::Read { ordinal, source } => {
                write!(f, "read error while planning chunk {}: {}", ordinal, source)
            }
            SplitError::ChunkWrites(failures) => {
                write!(f, "{} chunk write(s) failed", failures.len())?;
                if let Some(first) = failures.first() {
                    write!(f, "; first: {}", first)?;
                }
                Ok(())
            }
            SplitError::WorkerPanicked { worker } => {
                write!(f, "writer thread {} panicked", worker)
            }
            SplitError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            SplitError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for SplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplitError::SourceOpen { source, .. } | SplitError::Read { source, .. } => {
                Some(source)
            }
            SplitError::ChunkWrites(failures) => failures
                .first()
                .map(|f| &f.source as &(dyn std::error::Error + 'static)),
            SplitError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SplitError {
    fn from(e: std::io::Error) -> Self {
        SplitError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: SplitError = io_err.into();
        assert!(matches!(err, SplitError::Io(_)));
    }

    #[test]
    fn test_display_source_open() {
        let err = SplitError::SourceOpen {
            path: PathBuf::from("ratings.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let s = err.to_string();
        assert!(s.contains("ratings.csv"));
        assert!(s.contains("missing"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display_chunk_writes() {
        let err = SplitError::ChunkWrites(vec![
            ChunkFailure {
                ordinal: 2,
                path: PathBuf::from("out/tmp_a02.csv"),
                source: io::Error::other("disk full"),
            },
            ChunkFailure {
                ordinal: 5,
                path: PathBuf::from("out/tmp_a05.csv"),
                source: io::Error::other("disk full"),
            },
        ]);
        let s = err.to_string();
        assert!(s.starts_with("2 chunk write(s) failed"));
        assert!(s.contains("chunk 2"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_config_has_no_source() {
        let err = SplitError::InvalidConfig {
            message: "chunk_count must be at least 1",
        };
        assert!(err.to_string().contains("invalid config"));
        assert!(err.source().is_none());
    }
}
