//! Sequential chunk planning over a single reader.
//!
//! The planner is the only code that touches the source. Each step fills a
//! pooled buffer up to the target size, then extends it through the next line
//! terminator so that no line is shared between two chunks.

use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;

use bytes::BytesMut;
use log::{debug, warn};

use crate::buffer::BufferPool;
use crate::chunk::Chunk;
use crate::config::SplitConfig;
use crate::error::SplitError;

/// Computes the per-chunk fill target for a source of `source_len` bytes.
///
/// This is `source_len / chunk_count`, except that a non-empty source never
/// gets a zero target: when there are fewer bytes than requested chunks the
/// target is one byte and the terminator seek grows each chunk to a line.
///
/// # Example
///
/// ```
/// use linesplit::target_chunk_size;
///
/// assert_eq!(target_chunk_size(12, 3), 4);
/// assert_eq!(target_chunk_size(13, 3), 4);
/// assert_eq!(target_chunk_size(2, 10), 1);
/// assert_eq!(target_chunk_size(0, 4), 0);
/// ```
pub fn target_chunk_size(source_len: u64, chunk_count: usize) -> usize {
    let count = chunk_count.max(1) as u64;
    let size = source_len / count;
    if size == 0 && source_len > 0 {
        warn!(
            "source has {} bytes but {} chunks were requested; using 1-byte targets",
            source_len, chunk_count
        );
        return 1;
    }
    usize::try_from(size).unwrap_or(usize::MAX)
}

/// An iterator of line-aligned chunks read from a source of known length.
///
/// Chunk `k < N` holds at least the target size (unless the source ends
/// first) and always ends with the terminator unless the source ends inside
/// its last line. Chunk `N` takes everything that is left, so at most `N`
/// chunks are produced. Filling every chunk to the target, the last one
/// included, could instead leave a small chunk `N + 1` holding the bytes
/// beyond `N * target`; here those bytes stay in chunk `N`.
///
/// A source that reports a length of zero is still read: whatever it yields
/// becomes a single chunk, since no target can be derived for it. This covers
/// pipes and procfs files whose metadata does not reflect their content.
///
/// The iterator is fused after the source is exhausted or a read fails.
///
/// # Example
///
/// ```
/// use linesplit::{ChunkPlanner, SplitConfig};
/// use std::io::Cursor;
///
/// let source = b"a,b\nc,d\ne,f\n";
/// let config = SplitConfig::new(3)?;
/// let planner = ChunkPlanner::new(Cursor::new(&source[..]), source.len() as u64, &config);
///
/// let chunks = planner.collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[1].data(), b"c,d\n");
/// # Ok::<(), linesplit::SplitError>(())
/// ```
#[derive(Debug)]
pub struct ChunkPlanner<R> {
    reader: BufReader<R>,
    pool: BufferPool,
    source_len: u64,
    target_size: usize,
    chunk_count: usize,
    terminator: u8,
    next_ordinal: usize,
    offset: u64,
    finished: bool,
}

impl<R: Read> ChunkPlanner<R> {
    /// Creates a planner with a fresh buffer pool sized to the target.
    pub fn new(reader: R, source_len: u64, config: &SplitConfig) -> Self {
        let target_size = target_chunk_size(source_len, config.chunk_count());
        Self::build(reader, source_len, config, target_size, BufferPool::new(target_size))
    }

    /// Creates a planner that borrows its chunk buffers from `pool`.
    pub fn with_pool(reader: R, source_len: u64, config: &SplitConfig, pool: BufferPool) -> Self {
        let target_size = target_chunk_size(source_len, config.chunk_count());
        Self::build(reader, source_len, config, target_size, pool)
    }

    fn build(
        reader: R,
        source_len: u64,
        config: &SplitConfig,
        target_size: usize,
        pool: BufferPool,
    ) -> Self {
        Self {
            reader: BufReader::new(reader),
            pool,
            source_len,
            target_size,
            chunk_count: config.chunk_count().max(1),
            terminator: config.terminator(),
            next_ordinal: 1,
            offset: 0,
            finished: false,
        }
    }

    /// Returns the fill target for each chunk.
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Returns the pool chunk buffers are taken from.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Returns the number of source bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn plan_next(&mut self, ordinal: usize) -> io::Result<Option<Chunk>> {
        let mut buf = self.pool.acquire();
        let last = ordinal >= self.chunk_count || self.target_size == 0;

        if last {
            let remaining = self.source_len.saturating_sub(self.offset);
            buf.reserve(usize::try_from(remaining).unwrap_or(0));
            read_remaining(&mut self.reader, &mut buf)?;
            self.finished = true;
        } else {
            let read = fill_buffer(&mut self.reader, &mut buf, self.target_size)?;
            if read < self.target_size {
                self.finished = true;
            }
        }

        if buf.is_empty() {
            // Source ended exactly on the previous boundary.
            self.finished = true;
            return Ok(None);
        }

        if self.source_len == 0 {
            warn!(
                "source reported 0 bytes but yielded {}; writing it as a single chunk",
                buf.len()
            );
        }

        if !last && !self.finished && buf.last() != Some(&self.terminator) {
            let found = extend_to_terminator(&mut self.reader, &mut buf, self.terminator)?;
            if !found {
                // The source ends inside this line, so nothing can follow it.
                self.finished = true;
            }
        }

        let chunk = Chunk::new(ordinal, self.offset, buf);
        self.offset = chunk.end();
        Ok(Some(chunk))
    }
}

impl<R: Read> Iterator for ChunkPlanner<R> {
    type Item = Result<Chunk, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let ordinal = self.next_ordinal;
        match self.plan_next(ordinal) {
            Ok(Some(chunk)) => {
                debug!("planned {}", chunk);
                self.next_ordinal += 1;
                Some(Ok(chunk))
            }
            Ok(None) => None,
            Err(source) => {
                self.finished = true;
                Some(Err(SplitError::Read { ordinal, source }))
            }
        }
    }
}

impl<R: Read> FusedIterator for ChunkPlanner<R> {}

/// Reads until `buf` holds `target` bytes or the reader is exhausted.
///
/// Short reads and interruptions are retried. On return `buf` is truncated to
/// the bytes actually read.
fn fill_buffer<R: Read>(reader: &mut R, buf: &mut BytesMut, target: usize) -> io::Result<usize> {
    buf.resize(target, 0);
    let mut filled = 0;
    while filled < target {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                buf.truncate(filled);
                return Err(e);
            }
        }
    }
    buf.truncate(filled);
    Ok(filled)
}

/// Appends bytes up to and including the next `terminator`.
///
/// Returns `false` if the reader ran out first; whatever was read is still
/// appended.
fn extend_to_terminator<R: BufRead>(
    reader: &mut R,
    buf: &mut BytesMut,
    terminator: u8,
) -> io::Result<bool> {
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(false);
        }

        match available.iter().position(|&b| b == terminator) {
            Some(pos) => {
                buf.extend_from_slice(&available[..=pos]);
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let n = available.len();
                buf.extend_from_slice(available);
                reader.consume(n);
            }
        }
    }
}

/// Appends everything left in the reader.
fn read_remaining<R: BufRead>(reader: &mut R, buf: &mut BytesMut) -> io::Result<usize> {
    let mut total = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(total);
        }
        let n = available.len();
        buf.extend_from_slice(available);
        reader.consume(n);
        total += n;
    }
}
