//! Chunk types.
//!
//! - [`Chunk`] - A line-aligned slice of the source held in a pooled buffer
//! - [`ChunkRecord`] - What was written for a chunk, kept after its buffer is released

mod data;
mod record;

pub use data::Chunk;
pub use record::ChunkRecord;
