//! Configuration for splitting behavior.
//!
//! This module provides types to configure how a source file is split:
//!
//! - [`SplitConfig`] - Chunk count, worker pool sizing, output naming and hashing
//! - [`HashConfig`] - Specifies whether to compute a digest of every chunk
//!
//! # Example
//!
//! ```
//! use linesplit::{HashConfig, SplitConfig};
//!
//! // Eight pieces written by four threads
//! let config = SplitConfig::new(8)?.with_workers(4);
//!
//! // Plain text output without digests
//! let config = SplitConfig::new(3)?
//!     .with_extension("txt")
//!     .with_hash_config(HashConfig::disabled());
//!
//! # Ok::<(), linesplit::SplitError>(())
//! ```

use crate::error::SplitError;

/// Default line terminator.
pub const DEFAULT_TERMINATOR: u8 = b'\n';

/// Default prefix marking output files as intermediate.
pub const DEFAULT_PREFIX: &str = "tmp_";

/// Default output file extension.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Default minimum number of digits in an output ordinal.
pub const DEFAULT_ORDINAL_WIDTH: usize = 2;

/// Largest accepted ordinal width (enough for any `u64`).
pub const MAX_ORDINAL_WIDTH: usize = 20;

/// Configuration for a split.
///
/// # Worker pool
///
/// Chunks are written by a fixed pool of `workers` threads fed through a
/// queue. With `queue_depth = Some(n)` the planner blocks once `n` chunks
/// are waiting, which bounds the number of live buffers to roughly
/// `workers + n + 1`. With `None` the queue is unbounded and the planner
/// never waits on writers. Unless set explicitly the depth follows the
/// worker count at `2 * workers`.
///
/// # Example
///
/// ```
/// use linesplit::SplitConfig;
///
/// let config = SplitConfig::new(4)?
///     .with_workers(2)
///     .with_queue_depth(None)
///     .with_prefix("part_")
///     .with_ordinal_width(3);
///
/// assert_eq!(config.chunk_count(), 4);
/// assert_eq!(config.queue_depth(), None);
/// # Ok::<(), linesplit::SplitError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitConfig {
    chunk_count: usize,
    workers: usize,
    queue_depth: QueueDepth,
    terminator: u8,
    prefix: String,
    extension: String,
    ordinal_width: usize,
    hash_config: HashConfig,
}

/// Queue bound as configured, resolved against the worker count on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum QueueDepth {
    PerWorker,
    Bounded(usize),
    Unbounded,
}

impl SplitConfig {
    /// Creates a configuration that splits into `chunk_count` pieces.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidConfig`] if `chunk_count` is zero.
    pub fn new(chunk_count: usize) -> Result<Self, SplitError> {
        if chunk_count == 0 {
            return Err(SplitError::InvalidConfig {
                message: "chunk_count must be at least 1",
            });
        }

        Ok(Self {
            chunk_count,
            ..Self::default()
        })
    }

    /// Sets the number of writer threads.
    ///
    /// Note: This does not validate the configuration. Use [`SplitConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets how many planned chunks may wait for a writer (`None` = unbounded).
    ///
    /// Once set, the depth no longer follows [`with_workers`](Self::with_workers).
    pub fn with_queue_depth(mut self, depth: Option<usize>) -> Self {
        self.queue_depth = match depth {
            Some(depth) => QueueDepth::Bounded(depth),
            None => QueueDepth::Unbounded,
        };
        self
    }

    /// Sets the byte that ends a line.
    pub fn with_terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets the prefix placed before the source base name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the output file extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the minimum number of digits used for the chunk ordinal.
    pub fn with_ordinal_width(mut self, width: usize) -> Self {
        self.ordinal_width = width;
        self
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Returns the requested number of chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Returns the number of writer threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the dispatch queue bound, if any.
    pub fn queue_depth(&self) -> Option<usize> {
        match self.queue_depth {
            QueueDepth::PerWorker => Some(self.workers.max(1).saturating_mul(2)),
            QueueDepth::Bounded(depth) => Some(depth),
            QueueDepth::Unbounded => None,
        }
    }

    /// Returns the line terminator byte.
    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    /// Returns the output file prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the output file extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the minimum ordinal width.
    pub fn ordinal_width(&self) -> usize {
        self.ordinal_width
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use linesplit::SplitConfig;
    ///
    /// let config = SplitConfig::default().with_workers(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.chunk_count == 0 {
            return Err(SplitError::InvalidConfig {
                message: "chunk_count must be at least 1",
            });
        }

        if self.workers == 0 {
            return Err(SplitError::InvalidConfig {
                message: "workers must be at least 1",
            });
        }

        if self.ordinal_width == 0 || self.ordinal_width > MAX_ORDINAL_WIDTH {
            return Err(SplitError::InvalidConfig {
                message: "ordinal_width must be between 1 and 20",
            });
        }

        let has_separator = |s: &str| s.contains('/') || s.contains(std::path::MAIN_SEPARATOR);
        if has_separator(&self.prefix) || has_separator(&self.extension) {
            return Err(SplitError::InvalidConfig {
                message: "prefix and extension must not contain path separators",
            });
        }

        Ok(())
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_count: 1,
            workers: num_cpus::get().max(1),
            queue_depth: QueueDepth::PerWorker,
            terminator: DEFAULT_TERMINATOR,
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            ordinal_width: DEFAULT_ORDINAL_WIDTH,
            hash_config: HashConfig::default(),
        }
    }
}

/// Configuration for chunk hashing behavior.
///
/// `HashConfig` controls whether a BLAKE3 digest is computed for each chunk
/// as it is written. Hashing is enabled by default when the `hash-blake3`
/// feature is compiled in.
///
/// # Example
///
/// ```
/// use linesplit::HashConfig;
///
/// let config = HashConfig::enabled();
/// assert!(config.enabled);
///
/// let config = HashConfig::disabled();
/// assert!(!config.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Whether to compute digests for chunks.
    pub enabled: bool,
}

impl HashConfig {
    /// Creates a hash configuration with hashing on or off.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "hash-blake3"),
        }
    }
}
