//! # Chunk Module
//!
//! This module defines how the minimap engine addresses and reads world
//! chunks: the value-keyed [`ChunkCoord`], the geometry constants of a chunk
//! column, and the [`ChunkAccess`] trait through which the host engine exposes
//! live chunk data.
//!
//! ## Chunk Geometry
//!
//! A chunk is a 16x16 block column spanning the full world height, split
//! vertically into 16 sections of 16 blocks each. Any section may be absent
//! (no block data at that vertical slice). Block ids are stored as a low byte
//! per block plus an optional high-bit byte array; metadata and block light
//! are nibble arrays (4 bits per block); biome ids cover the 16x16 footprint
//! once for the whole column.

use cgmath::Point3;

pub mod snapshot;

pub use snapshot::ChunkSnapshot;

/// The edge length of a chunk footprint, in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of vertical 16-block sections in a chunk column.
pub const SECTIONS_PER_CHUNK: usize = 16;
/// The number of blocks in one section (16 * 16 * 16).
pub const SECTION_VOLUME: usize = 4096;
/// The length of a nibble array covering one section (4 bits per block).
pub const SECTION_NIBBLE_VOLUME: usize = SECTION_VOLUME / 2;
/// The number of biome ids per chunk column (one per 16x16 footprint cell).
pub const BIOME_AREA: usize = 256;

/// Identifies one chunk column: planar chunk coordinates plus the dimension
/// the chunk belongs to.
///
/// Equality and hashing are value-based, which makes `ChunkCoord` the cache
/// key for the rotating chunk cache and the addressing unit for region
/// persistence and the overlay registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Chunk x position (block x >> 4).
    pub x: i32,
    /// Chunk z position (block z >> 4).
    pub z: i32,
    /// Dimension id disambiguating identical coordinates across worlds.
    pub dimension: i32,
}

impl ChunkCoord {
    /// Creates a coordinate from chunk-space x/z and a dimension id.
    pub fn new(x: i32, z: i32, dimension: i32) -> Self {
        Self { x, z, dimension }
    }

    /// The coordinate of a live chunk as reported by the host engine.
    pub fn of(chunk: &dyn ChunkAccess) -> Self {
        Self::new(chunk.chunk_x(), chunk.chunk_z(), chunk.dimension())
    }

    /// The block position of this chunk's origin corner (lowest x/z block).
    pub fn block_origin(&self) -> (i32, i32) {
        (self.x << 4, self.z << 4)
    }

    /// Squared planar distance from a player block position to this chunk's
    /// block origin. The y component is ignored; the save-distance gate is a
    /// horizontal radius.
    pub fn dist_sq_to(&self, player: Point3<i32>) -> i64 {
        let (cx, cz) = self.block_origin();
        let dx = i64::from(cx) - i64::from(player.x);
        let dz = i64::from(cz) - i64::from(player.z);
        dx * dx + dz * dz
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) [dim {}]", self.x, self.z, self.dimension)
    }
}

/// A live world chunk as exposed by the host game engine.
///
/// Implementations hand out borrowed views of the engine's own storage; the
/// minimap core never mutates them and never lets them cross a thread
/// boundary. The only long-lived derivative of a `ChunkAccess` is a
/// [`ChunkSnapshot`], which deep-copies every array it touches on the owning
/// thread before any handoff to a worker.
///
/// The `Send + Sync` bound exists because cached handles live inside the
/// chunk manager, whose operations may be invoked from different host
/// threads (behind the manager's lock) - not because workers ever see them.
pub trait ChunkAccess: Send + Sync {
    /// Chunk x position.
    fn chunk_x(&self) -> i32;
    /// Chunk z position.
    fn chunk_z(&self) -> i32;
    /// Dimension id of the world this chunk belongs to.
    fn dimension(&self) -> i32;
    /// Low block-id bytes for a section, if the section has data.
    fn section_blocks_lsb(&self, section: usize) -> Option<&[u8]>;
    /// High block-id bits for a section. Absent for sections whose block ids
    /// all fit in the low byte.
    fn section_blocks_msb(&self, section: usize) -> Option<&[u8]>;
    /// Metadata nibble array for a section, if present.
    fn section_metadata(&self, section: usize) -> Option<&[u8]>;
    /// Block-light nibble array for a section, if present.
    fn section_light(&self, section: usize) -> Option<&[u8]>;
    /// Biome ids for the chunk footprint.
    fn biomes(&self) -> &[u8];
    /// True when the chunk holds no stored data. Empty chunks are never
    /// snapshotted or saved - they carry no map information.
    fn is_empty(&self) -> bool;
}

/// Supplies the player's current integer block position each tick.
pub trait PlayerPositionSource: Send + Sync {
    /// The player's block position at the time of the call.
    fn block_position(&self) -> Point3<i32>;
}
