//! linesplit
//!
//! Split a large line-delimited file into a fixed number of smaller files
//! without cutting any line in two.
//!
//! `linesplit` reads the source once, sequentially. Every chunk is filled to
//! `source_len / chunk_count` bytes and then extended through the next line
//! terminator. Chunks live in buffers borrowed from a per-split pool and are
//! written concurrently by a bounded pool of writer threads; a chunk's buffer
//! goes back to the pool as soon as it has been written.
//!
//! Guarantees:
//! - concatenating the outputs in ordinal order reproduces the source exactly
//! - every output except the last ends with the terminator
//! - at most `chunk_count` files are written, none for an empty source
//! - write failures are collected and reported once all writers have stopped
//!
//! # Example
//!
//! ```no_run
//! use linesplit::{SplitConfig, Splitter, SplitError};
//!
//! fn main() -> Result<(), SplitError> {
//!     // Writes work/tmp_ratings01.csv ... work/tmp_ratings08.csv
//!     let report = linesplit::split("ratings.csv", 8, "work")?;
//!     println!("{} files, {} bytes", report.len(), report.total_bytes());
//!
//!     // Same, with four writer threads and plain-text names
//!     let config = SplitConfig::new(8)?.with_workers(4).with_extension("txt");
//!     Splitter::new(config).split("ratings.csv", "work")?;
//!     Ok(())
//! }
//! ```
//!
//! # Lower-level pieces
//!
//! [`ChunkPlanner`] is the sequential planning iterator, [`Dispatcher`] the
//! writer pool, and [`ChunkSink`] the seam where chunks are persisted. They
//! can be combined directly, e.g. to split an in-memory reader into a
//! [`MemorySink`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod chunk;
mod config;
mod dispatch;
mod error;
mod hash;
mod layout;
mod planner;
mod sink;
mod split;

//
// Public surface
//

pub use buffer::{BufferPool, PoolStats, PooledBuffer};
pub use chunk::{Chunk, ChunkRecord};
pub use config::{HashConfig, SplitConfig};
pub use dispatch::{Completion, CompletionTracker, Dispatcher, TrackerStats};
pub use error::{ChunkFailure, SplitError};
pub use hash::ChunkHash;
pub use layout::OutputLayout;
pub use planner::{ChunkPlanner, target_chunk_size};
pub use sink::{ChunkSink, FileSink, MemorySink};
pub use split::{SplitReport, Splitter, split};
