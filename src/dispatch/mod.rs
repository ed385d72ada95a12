//! Concurrent write-out of planned chunks.
//!
//! # Module Structure
//!
//! - `tracker`: counts chunks in flight and their completions
//! - `worker`: writer thread body
//!
//! The [`Dispatcher`] owns a fixed pool of writer threads fed by a crossbeam
//! channel. The planner pushes chunks in read order; writers finish them in
//! any order. Failures are collected per writer and merged after the join.

mod tracker;
mod worker;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, bounded, unbounded};
use log::error;

use crate::chunk::{Chunk, ChunkRecord};
use crate::config::SplitConfig;
use crate::error::{ChunkFailure, SplitError};
use crate::layout::OutputLayout;
use crate::sink::ChunkSink;

pub use tracker::{CompletionTracker, TrackerStats};
use worker::{WorkerContext, WorkerOutcome, writer_thread};

/// Fans chunks out to a pool of writer threads.
///
/// # Example
///
/// ```
/// use linesplit::{ChunkPlanner, Dispatcher, MemorySink, OutputLayout, SplitConfig};
/// use std::io::Cursor;
/// use std::sync::Arc;
///
/// let source = b"a,b\nc,d\ne,f\n";
/// let config = SplitConfig::new(3)?.with_workers(2);
/// let sink = Arc::new(MemorySink::new());
/// let layout = OutputLayout::new("out", "tmp_ratings");
///
/// let dispatcher = Dispatcher::start(Arc::clone(&sink), layout, &config)?;
/// for chunk in ChunkPlanner::new(Cursor::new(&source[..]), 12, &config) {
///     dispatcher.dispatch(chunk?);
/// }
/// let (records, _stats) = dispatcher.await_all().into_result()?;
///
/// assert_eq!(records.len(), 3);
/// assert_eq!(sink.get("out/tmp_ratings02.csv"), Some(b"c,d\n".to_vec()));
/// # Ok::<(), linesplit::SplitError>(())
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    sender: Option<Sender<Chunk>>,
    workers: Vec<JoinHandle<WorkerOutcome>>,
    tracker: Arc<CompletionTracker>,
}

/// Everything the writer threads reported once they were joined.
#[derive(Debug, Default)]
pub struct Completion {
    /// Chunks written successfully, sorted by ordinal.
    pub records: Vec<ChunkRecord>,
    /// Chunks that failed to write, sorted by ordinal.
    pub failures: Vec<ChunkFailure>,
    /// Indices of writer threads that panicked.
    pub panicked: Vec<usize>,
    /// Final tracker counters.
    pub stats: TrackerStats,
}

impl Completion {
    /// Returns true if every dispatched chunk was written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.panicked.is_empty()
    }

    /// Converts into the written records, or the aggregated failure.
    ///
    /// A panicked writer takes precedence over write failures.
    pub fn into_result(self) -> Result<(Vec<ChunkRecord>, TrackerStats), SplitError> {
        if let Some(&worker) = self.panicked.first() {
            return Err(SplitError::WorkerPanicked { worker });
        }
        if !self.failures.is_empty() {
            return Err(SplitError::ChunkWrites(self.failures));
        }
        Ok((self.records, self.stats))
    }
}

impl Dispatcher {
    /// Spawns `config.workers()` writer threads.
    ///
    /// Writers send chunk `k` to `sink` at `layout.path_for(k)`.
    pub fn start<S: ChunkSink + 'static>(
        sink: Arc<S>,
        layout: OutputLayout,
        config: &SplitConfig,
    ) -> Result<Self, SplitError> {
        let (sender, receiver) = match config.queue_depth() {
            Some(depth) => bounded(depth),
            None => unbounded(),
        };

        let layout = Arc::new(layout);
        let tracker = Arc::new(CompletionTracker::new());
        let hash = config.hash_config().enabled;

        let mut dispatcher = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(config.workers()),
            tracker: Arc::clone(&tracker),
        };

        for worker_id in 0..config.workers().max(1) {
            let queue = receiver.clone();
            let ctx = WorkerContext {
                worker_id,
                sink: Arc::clone(&sink),
                layout: Arc::clone(&layout),
                tracker: Arc::clone(&tracker),
                hash,
            };

            // On error the partially built dispatcher is dropped, which
            // closes the queue and joins the writers already started.
            let handle = thread::Builder::new()
                .name(format!("linesplit-writer-{}", worker_id))
                .spawn(move || writer_thread(queue, ctx))?;
            dispatcher.workers.push(handle);
        }

        Ok(dispatcher)
    }

    /// Hands a chunk to the writers.
    ///
    /// Blocks only while a bounded queue is full. Returns `false` if every
    /// writer has already died; the chunk is then dropped and the cause is
    /// reported by [`await_all`](Self::await_all).
    pub fn dispatch(&self, chunk: Chunk) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };

        self.tracker.begin();
        match sender.send(chunk) {
            Ok(()) => true,
            Err(rejected) => {
                drop(rejected);
                self.tracker.finish();
                false
            }
        }
    }

    /// Returns the live tracker counters.
    pub fn stats(&self) -> TrackerStats {
        self.tracker.stats()
    }

    /// Closes the queue and waits for every writer to finish.
    pub fn await_all(mut self) -> Completion {
        self.close_and_join()
    }

    fn close_and_join(&mut self) -> Completion {
        drop(self.sender.take());

        let mut completion = Completion::default();
        for (worker_id, handle) in std::mem::take(&mut self.workers).into_iter().enumerate() {
            match handle.join() {
                Ok(outcome) => {
                    completion.records.extend(outcome.records);
                    completion.failures.extend(outcome.failures);
                }
                Err(_) => {
                    error!("writer {} panicked", worker_id);
                    completion.panicked.push(worker_id);
                }
            }
        }

        completion.records.sort_by_key(|r| r.ordinal);
        completion.failures.sort_by_key(|f| f.ordinal);
        completion.stats = self.tracker.stats();
        debug_assert!(!completion.panicked.is_empty() || self.tracker.is_idle());
        completion
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            let _ = self.close_and_join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferPool;
    use crate::sink::MemorySink;
    use std::io;
    use std::path::Path;

    fn chunk(pool: &BufferPool, ordinal: usize, offset: u64, bytes: &[u8]) -> Chunk {
        let mut buf = pool.acquire();
        buf.extend_from_slice(bytes);
        Chunk::new(ordinal, offset, buf)
    }

    /// Fails every write whose path ends with the given suffix.
    struct FailingSink {
        suffix: &'static str,
        inner: MemorySink,
    }

    impl ChunkSink for FailingSink {
        fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
            if path.to_string_lossy().ends_with(self.suffix) {
                return Err(io::Error::other("disk full"));
            }
            self.inner.write(path, bytes)
        }
    }

    struct PanickingSink;

    impl ChunkSink for PanickingSink {
        fn write(&self, _path: &Path, _bytes: &[u8]) -> io::Result<()> {
            panic!("sink exploded");
        }
    }

    #[test]
    fn test_dispatch_writes_every_chunk() {
        let pool = BufferPool::new(4);
        let sink = Arc::new(MemorySink::new());
        let config = SplitConfig::new(3).unwrap().with_workers(2);
        let dispatcher =
            Dispatcher::start(Arc::clone(&sink), OutputLayout::new("d", "tmp_a"), &config).unwrap();

        assert!(dispatcher.dispatch(chunk(&pool, 1, 0, b"a\n")));
        assert!(dispatcher.dispatch(chunk(&pool, 2, 2, b"b\n")));
        assert!(dispatcher.dispatch(chunk(&pool, 3, 4, b"c")));

        let completion = dispatcher.await_all();
        assert!(completion.is_success());
        assert_eq!(completion.stats.dispatched, 3);
        assert_eq!(completion.stats.completed, 3);
        assert_eq!(completion.stats.in_flight, 0);

        let ordinals: Vec<_> = completion.records.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(sink.get("d/tmp_a03.csv"), Some(b"c".to_vec()));
        assert_eq!(pool.stats().outstanding, 0);
    }

    #[test]
    fn test_failures_are_aggregated_and_buffers_released() {
        let pool = BufferPool::new(4);
        let sink = Arc::new(FailingSink {
            suffix: "2.csv",
            inner: MemorySink::new(),
        });
        let config = SplitConfig::new(3).unwrap().with_workers(3);
        let dispatcher = Dispatcher::start(sink, OutputLayout::new("d", "x"), &config).unwrap();

        for ordinal in 1..=3 {
            dispatcher.dispatch(chunk(&pool, ordinal, 0, b"line\n"));
        }
        dispatcher.dispatch(chunk(&pool, 12, 0, b"line\n"));

        let completion = dispatcher.await_all();
        assert!(!completion.is_success());
        let failed: Vec<_> = completion.failures.iter().map(|f| f.ordinal).collect();
        assert_eq!(failed, vec![2, 12]);
        assert_eq!(completion.records.len(), 2);
        assert_eq!(pool.stats().outstanding, 0);

        match completion.into_result() {
            Err(SplitError::ChunkWrites(failures)) => assert_eq!(failures.len(), 2),
            other => panic!("expected aggregated failure, got {:?}", other),
        }
    }

    #[test]
    fn test_panicking_writer_is_reported() {
        let pool = BufferPool::new(4);
        let config = SplitConfig::new(1).unwrap().with_workers(1);
        let dispatcher =
            Dispatcher::start(Arc::new(PanickingSink), OutputLayout::new("d", "x"), &config)
                .unwrap();

        dispatcher.dispatch(chunk(&pool, 1, 0, b"boom\n"));
        let completion = dispatcher.await_all();

        assert_eq!(completion.panicked, vec![0]);
        assert_eq!(completion.stats.in_flight, 0);
        assert_eq!(pool.stats().outstanding, 0);
        assert!(matches!(
            completion.into_result(),
            Err(SplitError::WorkerPanicked { worker: 0 })
        ));
    }

    #[test]
    fn test_dispatch_after_writers_died() {
        let pool = BufferPool::new(4);
        let config = SplitConfig::new(2)
            .unwrap()
            .with_workers(1)
            .with_queue_depth(None);
        let dispatcher =
            Dispatcher::start(Arc::new(PanickingSink), OutputLayout::new("d", "x"), &config)
                .unwrap();

        dispatcher.dispatch(chunk(&pool, 1, 0, b"boom\n"));
        while !dispatcher.workers[0].is_finished() {
            thread::yield_now();
        }

        assert!(!dispatcher.dispatch(chunk(&pool, 2, 5, b"late\n")));
        assert_eq!(pool.stats().outstanding, 0);
        assert!(!dispatcher.await_all().is_success());
    }

    #[test]
    fn test_drop_without_await_joins_writers() {
        let pool = BufferPool::new(4);
        let sink = Arc::new(MemorySink::new());
        let config = SplitConfig::new(1).unwrap().with_workers(2);
        {
            let dispatcher =
                Dispatcher::start(Arc::clone(&sink), OutputLayout::new("d", "x"), &config)
                    .unwrap();
            dispatcher.dispatch(chunk(&pool, 1, 0, b"a\n"));
        }
        assert_eq!(sink.len(), 1);
        assert_eq!(pool.stats().outstanding, 0);
    }
}
