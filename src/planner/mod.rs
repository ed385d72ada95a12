//! Chunk planning over the source.
//!
//! - [`ChunkPlanner`] - Iterator of line-aligned chunks read sequentially from a source
//! - [`target_chunk_size`] - Fill target derived from source length and chunk count

mod engine;

pub use engine::{ChunkPlanner, target_chunk_size};
