//! Writer thread body.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::{debug, error};

use super::tracker::CompletionTracker;
use crate::chunk::{Chunk, ChunkRecord};
use crate::error::ChunkFailure;
use crate::layout::OutputLayout;
use crate::sink::ChunkSink;

#[cfg(feature = "hash-blake3")]
use crate::hash::ChunkHasher;

/// What one writer thread accomplished.
#[derive(Debug, Default)]
pub(crate) struct WorkerOutcome {
    pub records: Vec<ChunkRecord>,
    pub failures: Vec<ChunkFailure>,
}

/// Everything a writer thread needs besides its queue.
pub(crate) struct WorkerContext<S> {
    pub worker_id: usize,
    pub sink: Arc<S>,
    pub layout: Arc<OutputLayout>,
    pub tracker: Arc<CompletionTracker>,
    pub hash: bool,
}

/// Writes chunks until the queue is closed and drained.
pub(crate) fn writer_thread<S: ChunkSink>(
    queue: Receiver<Chunk>,
    ctx: WorkerContext<S>,
) -> WorkerOutcome {
    let mut outcome = WorkerOutcome::default();

    #[cfg(feature = "hash-blake3")]
    let mut hasher = ctx.hash.then(ChunkHasher::new);
    #[cfg(not(feature = "hash-blake3"))]
    let _ = ctx.hash;

    for queued in queue.iter() {
        // Declared before the chunk so the buffer is released first.
        let _done = ctx.tracker.guard();
        let chunk = queued;

        let ordinal = chunk.ordinal();
        let path = ctx.layout.path_for(ordinal);

        #[cfg(feature = "hash-blake3")]
        let hash = hasher.as_mut().map(|h| h.digest(chunk.data()));
        #[cfg(not(feature = "hash-blake3"))]
        let hash: Option<crate::hash::ChunkHash> = None;

        let written = ctx.sink.write(&path, chunk.data());
        let (offset, len) = (chunk.offset(), chunk.len());
        drop(chunk);

        match written {
            Ok(()) => {
                debug!(
                    "writer {}: chunk {} -> {} ({} bytes)",
                    ctx.worker_id,
                    ordinal,
                    path.display(),
                    len
                );
                outcome.records.push(ChunkRecord {
                    ordinal,
                    path,
                    offset,
                    len,
                    hash,
                });
            }
            Err(source) => {
                error!(
                    "writer {}: chunk {} -> {} failed: {}",
                    ctx.worker_id,
                    ordinal,
                    path.display(),
                    source
                );
                outcome.failures.push(ChunkFailure {
                    ordinal,
                    path,
                    source,
                });
            }
        }
    }

    outcome
}
