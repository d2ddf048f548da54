//! Shared test doubles for the collaborator interfaces.

use cgmath::Point3;
use std::sync::Mutex;

use super::chunk::{
    ChunkAccess, ChunkCoord, ChunkSnapshot, PlayerPositionSource, BIOME_AREA,
    SECTIONS_PER_CHUNK, SECTION_NIBBLE_VOLUME, SECTION_VOLUME,
};
use super::region::RegionStore;
use super::task_management::task::Task;
use super::task_management::TaskExecutor;
use super::tile_image::TileImageSurface;

/// Serializes tests that touch the process-global overlay registry.
pub(crate) static OVERLAY_LOCK: Mutex<()> = Mutex::new(());

/// Acquires the overlay lock, shrugging off poisoning from a failed test.
pub(crate) fn overlay_guard() -> std::sync::MutexGuard<'static, ()> {
    OVERLAY_LOCK.lock().unwrap_or_else(|err| err.into_inner())
}

/// A fabricated live chunk. Sections are absent until added with
/// [`TestChunk::with_section`]; a chunk with no sections reports empty.
pub(crate) struct TestChunk {
    x: i32,
    z: i32,
    dimension: i32,
    blocks_lsb: [Option<Vec<u8>>; SECTIONS_PER_CHUNK],
    blocks_msb: [Option<Vec<u8>>; SECTIONS_PER_CHUNK],
    metadata: [Option<Vec<u8>>; SECTIONS_PER_CHUNK],
    light: [Option<Vec<u8>>; SECTIONS_PER_CHUNK],
    biomes: Vec<u8>,
}

impl TestChunk {
    pub(crate) fn new(x: i32, z: i32, dimension: i32) -> Self {
        Self {
            x,
            z,
            dimension,
            blocks_lsb: Default::default(),
            blocks_msb: Default::default(),
            metadata: Default::default(),
            light: Default::default(),
            biomes: vec![0; BIOME_AREA],
        }
    }

    /// Adds a zeroed section at the given vertical index.
    pub(crate) fn with_section(mut self, section: usize) -> Self {
        self.blocks_lsb[section] = Some(vec![0; SECTION_VOLUME]);
        self.metadata[section] = Some(vec![0; SECTION_NIBBLE_VOLUME]);
        self.light[section] = Some(vec![0; SECTION_NIBBLE_VOLUME]);
        self
    }

    pub(crate) fn fill_section_blocks(&mut self, section: usize, value: u8) {
        if let Some(blocks) = &mut self.blocks_lsb[section] {
            blocks.fill(value);
        }
    }

    pub(crate) fn fill_biomes(&mut self, value: u8) {
        self.biomes.fill(value);
    }
}

impl ChunkAccess for TestChunk {
    fn chunk_x(&self) -> i32 {
        self.x
    }
    fn chunk_z(&self) -> i32 {
        self.z
    }
    fn dimension(&self) -> i32 {
        self.dimension
    }
    fn section_blocks_lsb(&self, section: usize) -> Option<&[u8]> {
        self.blocks_lsb[section].as_deref()
    }
    fn section_blocks_msb(&self, section: usize) -> Option<&[u8]> {
        self.blocks_msb[section].as_deref()
    }
    fn section_metadata(&self, section: usize) -> Option<&[u8]> {
        self.metadata[section].as_deref()
    }
    fn section_light(&self, section: usize) -> Option<&[u8]> {
        self.light[section].as_deref()
    }
    fn biomes(&self) -> &[u8] {
        &self.biomes
    }
    fn is_empty(&self) -> bool {
        self.blocks_lsb.iter().all(Option::is_none)
    }
}

/// Region store that records updated coordinates and serves a constant fill
/// pixel on read-back.
#[derive(Default)]
pub(crate) struct MemoryRegionStore {
    updated: Mutex<Vec<ChunkCoord>>,
    fill: u32,
}

impl MemoryRegionStore {
    pub(crate) fn with_fill(fill: u32) -> Self {
        Self {
            updated: Mutex::new(Vec::new()),
            fill,
        }
    }

    pub(crate) fn updated_chunks(&self) -> Vec<ChunkCoord> {
        self.updated.lock().unwrap().clone()
    }
}

impl RegionStore for MemoryRegionStore {
    fn update_chunk(&self, snapshot: &ChunkSnapshot) {
        self.updated.lock().unwrap().push(snapshot.coord());
    }

    fn read_pixels(
        &self,
        _dimension: i32,
        _pixel_x: i32,
        _pixel_z: i32,
        width: u32,
        height: u32,
    ) -> Vec<u32> {
        vec![self.fill; (width * height) as usize]
    }
}

/// Tile surface that records every requested update rectangle.
#[derive(Default)]
pub(crate) struct RecordingTile {
    updates: Mutex<Vec<(i32, i32, u32, u32, i32)>>,
}

impl RecordingTile {
    pub(crate) fn updates(&self) -> Vec<(i32, i32, u32, u32, i32)> {
        self.updates.lock().unwrap().clone()
    }
}

impl TileImageSurface for RecordingTile {
    fn update_area(
        &self,
        _store: &dyn RegionStore,
        pixel_x: i32,
        pixel_z: i32,
        width: u32,
        height: u32,
        dimension: i32,
    ) {
        self.updates
            .lock()
            .unwrap()
            .push((pixel_x, pixel_z, width, height, dimension));
    }
}

/// Executor that queues tasks for the test to run synchronously.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    tasks: Mutex<Vec<Box<dyn Task>>>,
}

impl RecordingExecutor {
    /// Takes every queued task without running it.
    pub(crate) fn drain(&self) -> Vec<Box<dyn Task>> {
        std::mem::take(&mut self.tasks.lock().unwrap())
    }

    /// Runs every queued task (worker phase then completion phase) and
    /// returns how many there were.
    pub(crate) fn run_all(&self) -> usize {
        let tasks = self.drain();
        let count = tasks.len();
        for task in tasks {
            task.process().on_complete();
        }
        count
    }
}

impl TaskExecutor for RecordingExecutor {
    fn add_task(&self, task: Box<dyn Task>) {
        self.tasks.lock().unwrap().push(task);
    }
}

/// A player that never moves.
pub(crate) struct FixedPlayer(pub(crate) Point3<i32>);

impl PlayerPositionSource for FixedPlayer {
    fn block_position(&self) -> Point3<i32> {
        self.0
    }
}

/// A player whose position the test can change between sweeps.
pub(crate) struct MovablePlayer {
    position: Mutex<Point3<i32>>,
}

impl MovablePlayer {
    pub(crate) fn at(position: Point3<i32>) -> Self {
        Self {
            position: Mutex::new(position),
        }
    }

    pub(crate) fn move_to(&self, position: Point3<i32>) {
        *self.position.lock().unwrap() = position;
    }
}

impl PlayerPositionSource for MovablePlayer {
    fn block_position(&self) -> Point3<i32> {
        *self.position.lock().unwrap()
    }
}
