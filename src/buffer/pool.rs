//! Shared buffer pool for chunk memory reuse.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::BytesMut;

/// A pool of reusable byte buffers with a target capacity.
///
/// Cloning yields another handle to the same pool. Buffers are handed out as
/// [`PooledBuffer`] handles that go back to the free list when dropped.
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    free: Mutex<Vec<BytesMut>>,
    allocated: AtomicUsize,
    reused: AtomicUsize,
    outstanding: AtomicUsize,
    peak_outstanding: AtomicUsize,
}

/// Counters describing how a [`BufferPool`] was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers created because the free list was empty.
    pub allocated: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    /// Buffers acquired and not yet released.
    pub outstanding: usize,
    /// Highest value `outstanding` reached.
    pub peak_outstanding: usize,
}

impl BufferPool {
    /// Creates an empty pool whose buffers hold at least `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity,
                free: Mutex::new(Vec::new()),
                allocated: AtomicUsize::new(0),
                reused: AtomicUsize::new(0),
                outstanding: AtomicUsize::new(0),
                peak_outstanding: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the target capacity of buffers from this pool.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Takes a buffer from the pool or allocates a new one.
    ///
    /// The returned buffer is empty and can hold at least
    /// [`capacity`](Self::capacity) bytes without reallocating.
    pub fn acquire(&self) -> PooledBuffer {
        let recycled = self.inner.lock_free().pop();
        let data = match recycled {
            Some(mut data) => {
                self.inner.reused.fetch_add(1, Ordering::Relaxed);
                data.clear();
                data.reserve(self.inner.capacity);
                data
            }
            None => {
                self.inner.allocated.fetch_add(1, Ordering::Relaxed);
                BytesMut::with_capacity(self.inner.capacity)
            }
        };

        let now = self.inner.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak_outstanding.fetch_max(now, Ordering::SeqCst);

        PooledBuffer {
            data,
            pool: self.clone(),
        }
    }

    /// Returns a buffer to the pool.
    ///
    /// Equivalent to dropping the handle.
    pub fn release(&self, buffer: PooledBuffer) {
        drop(buffer);
    }

    /// Returns a snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.inner.allocated.load(Ordering::Relaxed),
            reused: self.inner.reused.load(Ordering::Relaxed),
            outstanding: self.inner.outstanding.load(Ordering::SeqCst),
            peak_outstanding: self.inner.peak_outstanding.load(Ordering::SeqCst),
        }
    }

    /// Number of idle buffers waiting for reuse.
    pub fn idle(&self) -> usize {
        self.inner.lock_free().len()
    }

    fn put_back(&self, mut data: BytesMut) {
        data.clear();
        self.inner.lock_free().push(data);
        self.inner.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Inner {
    /// Lock the free list, recovering from a poisoned mutex.
    ///
    /// The list only ever holds empty buffers, so a panic elsewhere cannot
    /// leave it inconsistent.
    fn lock_free(&self) -> MutexGuard<'_, Vec<BytesMut>> {
        match self.free.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// A buffer borrowed from a [`BufferPool`].
///
/// Dereferences to [`BytesMut`]. Dropping the handle returns the buffer to its
/// pool, so every exit path (including unwinding) releases it exactly once.
#[derive(Debug)]
pub struct PooledBuffer {
    data: BytesMut,
    pool: BufferPool,
}

impl PooledBuffer {
    /// Returns the filled bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.data
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.data
    }
}

impl AsRef<[u8]> for PooledBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        self.pool.put_back(data);
    }
}
