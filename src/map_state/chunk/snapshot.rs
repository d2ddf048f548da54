//! Immutable chunk snapshots.
//!
//! A [`ChunkSnapshot`] is the only chunk-shaped data that ever crosses from
//! the main tick thread to the background workers. It is captured
//! synchronously from a live [`ChunkAccess`] handle and deep-copies every
//! array it touches, so a worker can read it while the engine keeps mutating
//! the live chunk.

use super::{ChunkAccess, ChunkCoord, SECTIONS_PER_CHUNK};

/// Deep-copied section arrays, one optional slot per 16-block vertical slice.
type SectionArrays = [Option<Box<[u8]>>; SECTIONS_PER_CHUNK];

/// An immutable copy of one chunk column's renderable data.
///
/// Fields are private and there are no mutating accessors; once captured a
/// snapshot cannot change, which is what makes it safe to hand to the worker
/// pool without further synchronization. Snapshots are created on the main
/// thread, carried by exactly one task, and dropped when the task finishes.
pub struct ChunkSnapshot {
    coord: ChunkCoord,
    blocks_lsb: SectionArrays,
    blocks_msb: SectionArrays,
    metadata: SectionArrays,
    light: SectionArrays,
    biomes: Box<[u8]>,
}

impl ChunkSnapshot {
    /// Captures a snapshot of a live chunk.
    ///
    /// Every section array present on the chunk is copied into owned storage;
    /// absent sections stay `None`. Must be called on the thread that owns
    /// the live chunk - the returned snapshot is then free to cross threads.
    pub fn capture(chunk: &dyn ChunkAccess) -> Self {
        let mut blocks_lsb: SectionArrays = Default::default();
        let mut blocks_msb: SectionArrays = Default::default();
        let mut metadata: SectionArrays = Default::default();
        let mut light: SectionArrays = Default::default();

        for section in 0..SECTIONS_PER_CHUNK {
            blocks_lsb[section] = chunk.section_blocks_lsb(section).map(Box::from);
            blocks_msb[section] = chunk.section_blocks_msb(section).map(Box::from);
            metadata[section] = chunk.section_metadata(section).map(Box::from);
            light[section] = chunk.section_light(section).map(Box::from);
        }

        Self {
            coord: ChunkCoord::of(chunk),
            blocks_lsb,
            blocks_msb,
            metadata,
            light,
            biomes: Box::from(chunk.biomes()),
        }
    }

    /// The coordinate this snapshot was captured at.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Low block-id bytes for a section, if the section had data at capture
    /// time.
    pub fn blocks_lsb(&self, section: usize) -> Option<&[u8]> {
        self.blocks_lsb[section].as_deref()
    }

    /// High block-id bits for a section.
    pub fn blocks_msb(&self, section: usize) -> Option<&[u8]> {
        self.blocks_msb[section].as_deref()
    }

    /// Metadata nibbles for a section.
    pub fn metadata(&self, section: usize) -> Option<&[u8]> {
        self.metadata[section].as_deref()
    }

    /// Block-light nibbles for a section.
    pub fn light(&self, section: usize) -> Option<&[u8]> {
        self.light[section].as_deref()
    }

    /// Biome ids for the chunk footprint.
    pub fn biomes(&self) -> &[u8] {
        &self.biomes
    }
}
