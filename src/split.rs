//! Top-level split operation.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::buffer::PoolStats;
use crate::chunk::ChunkRecord;
use crate::config::SplitConfig;
use crate::dispatch::Dispatcher;
use crate::error::SplitError;
use crate::layout::OutputLayout;
use crate::planner::ChunkPlanner;
use crate::sink::{ChunkSink, FileSink};

/// Splits `source` into at most `chunk_count` line-aligned files in `output_dir`.
///
/// Files are named `tmp_<base><NN>.csv`. The call returns once every chunk
/// has been written, or with the first fatal error after all writers have
/// stopped. `output_dir` must already exist.
///
/// # Example
///
/// ```no_run
/// let report = linesplit::split("ratings.csv", 8, "work")?;
/// for chunk in &report.chunks {
///     println!("{}", chunk);
/// }
/// # Ok::<(), linesplit::SplitError>(())
/// ```
pub fn split(
    source: impl AsRef<Path>,
    chunk_count: usize,
    output_dir: impl AsRef<Path>,
) -> Result<SplitReport, SplitError> {
    Splitter::new(SplitConfig::new(chunk_count)?).split(source, output_dir)
}

/// Result of a successful split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Length of the source in bytes.
    pub source_len: u64,
    /// Fill target used for each chunk.
    pub target_size: usize,
    /// Written chunks in ordinal order.
    pub chunks: Vec<ChunkRecord>,
    /// Buffer pool counters at the end of the split.
    pub pool: PoolStats,
    /// Most chunks that were dispatched but not yet written at one time.
    pub peak_in_flight: usize,
}

impl SplitReport {
    /// Number of files written.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the source was empty and nothing was written.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total bytes written across all chunks.
    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(|c| c.len as u64).sum()
    }

    /// Paths of the written files in ordinal order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.chunks.iter().map(|c| c.path.clone()).collect()
    }
}

/// Configurable splitter.
///
/// # Example
///
/// ```
/// use linesplit::{MemorySink, OutputLayout, SplitConfig, Splitter};
/// use std::io::Cursor;
/// use std::sync::Arc;
///
/// let source = b"a,b\nc,d\ne,f\n";
/// let sink = Arc::new(MemorySink::new());
/// let splitter = Splitter::new(SplitConfig::new(3)?.with_workers(2)).with_sink(Arc::clone(&sink));
///
/// let report = splitter.split_reader(
///     Cursor::new(&source[..]),
///     source.len() as u64,
///     OutputLayout::new("out", "tmp_ratings"),
/// )?;
///
/// assert_eq!(report.len(), 3);
/// assert_eq!(sink.get("out/tmp_ratings01.csv"), Some(b"a,b\n".to_vec()));
/// # Ok::<(), linesplit::SplitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Splitter<S = FileSink> {
    config: SplitConfig,
    sink: Arc<S>,
}

impl Splitter<FileSink> {
    /// Creates a splitter that writes files to disk.
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            sink: Arc::new(FileSink),
        }
    }
}

impl Default for Splitter<FileSink> {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

impl<S: ChunkSink + 'static> Splitter<S> {
    /// Replaces the destination for written chunks.
    pub fn with_sink<T: ChunkSink + 'static>(self, sink: T) -> Splitter<T> {
        Splitter {
            config: self.config,
            sink: Arc::new(sink),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Splits the file at `source` into `output_dir`.
    ///
    /// # Errors
    ///
    /// - [`SplitError::SourceOpen`] if the source cannot be opened or sized
    /// - [`SplitError::Read`] if reading fails part way
    /// - [`SplitError::ChunkWrites`] if any chunk could not be written
    pub fn split(
        &self,
        source: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<SplitReport, SplitError> {
        self.config.validate()?;

        let path = source.as_ref();
        let open_error = |source| SplitError::SourceOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_error)?;
        let source_len = file.metadata().map_err(open_error)?.len();

        let layout = OutputLayout::for_source(path, output_dir.as_ref(), &self.config);
        info!(
            "splitting {} ({} bytes) into {} chunk(s) under {}",
            path.display(),
            source_len,
            self.config.chunk_count(),
            layout.dir().display()
        );

        self.split_reader(file, source_len, layout)
    }

    /// Splits any reader of known length, naming chunks with `layout`.
    pub fn split_reader<R: Read>(
        &self,
        reader: R,
        source_len: u64,
        layout: OutputLayout,
    ) -> Result<SplitReport, SplitError> {
        self.config.validate()?;

        let planner = ChunkPlanner::new(reader, source_len, &self.config);
        let target_size = planner.target_size();
        let pool = planner.pool().clone();
        let dispatcher = Dispatcher::start(Arc::clone(&self.sink), layout, &self.config)?;

        let mut read_error = None;
        for planned in planner {
            match planned {
                Ok(chunk) => {
                    if !dispatcher.dispatch(chunk) {
                        break;
                    }
                }
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
        }

        let completion = dispatcher.await_all();
        if let Some(e) = read_error {
            if !completion.failures.is_empty() {
                warn!(
                    "{} chunk write(s) also failed before the read error",
                    completion.failures.len()
                );
            }
            return Err(e);
        }

        let (chunks, stats) = completion.into_result()?;
        let report = SplitReport {
            source_len,
            target_size,
            chunks,
            pool: pool.stats(),
            peak_in_flight: stats.peak_in_flight,
        };

        info!(
            "wrote {} chunk(s), {} bytes; {} buffer(s) allocated, peak {} in flight",
            report.len(),
            report.total_bytes(),
            report.pool.allocated,
            report.peak_in_flight
        );
        Ok(report)
    }
}
