//! Completion tracking for dispatched chunks.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts chunks handed to writers and chunks they have finished.
///
/// A chunk is in flight from the moment it is dispatched until its writer has
/// written it and released its buffer.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    dispatched: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Snapshot of a [`CompletionTracker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Chunks handed to the dispatcher.
    pub dispatched: usize,
    /// Chunks whose write finished (successfully or not).
    pub completed: usize,
    /// Chunks dispatched but not yet completed.
    pub in_flight: usize,
    /// Highest value `in_flight` reached.
    pub peak_in_flight: usize,
}

impl CompletionTracker {
    /// Creates a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dispatch.
    pub fn begin(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    /// Records a completion.
    pub fn finish(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Returns a guard that calls [`finish`](Self::finish) when dropped.
    pub(crate) fn guard(&self) -> CompletionGuard<'_> {
        CompletionGuard { tracker: self }
    }

    /// Returns true once every dispatched chunk has completed.
    pub fn is_idle(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0
    }

    /// Returns the current counters.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            dispatched: self.dispatched.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
        }
    }
}

/// Marks one chunk complete on drop, including during unwinding.
pub(crate) struct CompletionGuard<'a> {
    tracker: &'a CompletionTracker,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
