//! # Chunk Cache Module
//!
//! The rotating cache of live chunks the engine currently knows about, plus
//! the flagged entry type stored in it. The cache is owned and mutated only
//! by the main tick thread (behind the chunk manager's lock); background
//! workers never touch it.

pub mod rotating_cache;

pub use rotating_cache::{CachedChunk, ChunkFlags, RotatingChunkCache};
