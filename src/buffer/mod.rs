//! Buffer management for chunk memory reuse.
//!
//! Chunks are filled into buffers borrowed from a [`BufferPool`] created for
//! each split. A buffer returns to the pool when its [`PooledBuffer`] handle is
//! dropped, which happens after the chunk has been written (or failed to be).

mod pool;

pub use pool::{BufferPool, PoolStats, PooledBuffer};
