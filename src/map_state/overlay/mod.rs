//! # Overlay Debug Registry
//!
//! Process-wide bookkeeping of chunk load/unload/redraw activity, used to
//! drive a debug overlay on the map UI. Keyed by dimension, one record per
//! chunk coordinate, all behind a single lock.
//!
//! The registry is observability only: reference-count inconsistencies are
//! logged as warnings and never abort processing. Its lifecycle is tied to
//! world load/unload - the host calls [`clear`] when the world goes away.

use log::warn;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use super::chunk::ChunkCoord;

/// Activity record for one chunk.
#[derive(Default)]
struct ChunkRef {
    refs: i32,
    last_access: Option<Instant>,
    last_redraw: Option<Instant>,
}

impl ChunkRef {
    fn access(&mut self) {
        self.last_access = Some(Instant::now());
    }
}

/// A queried overlay entry: how referenced and how stale a chunk is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayRecord {
    /// Chunk x position.
    pub x: i32,
    /// Chunk z position.
    pub z: i32,
    /// Net load/unload balance. 1 for a loaded chunk, 0 after unload;
    /// anything else indicates the host delivered unbalanced events.
    pub refs: i32,
    /// Time since the last load/unload event.
    pub access_age: Duration,
    /// Time since the last redraw, if the chunk was ever redrawn.
    pub redraw_age: Option<Duration>,
}

type Registry = HashMap<i32, HashMap<(i32, i32), ChunkRef>>;

fn registry() -> MutexGuard<'static, Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap()
}

/// Records a chunk load event.
///
/// Logs a warning when the resulting reference count is not exactly 1 - a
/// soft assertion that the host's load/unload events are balanced.
pub fn load(coord: ChunkCoord) {
    let mut registry = registry();
    let chunk_ref = registry
        .entry(coord.dimension)
        .or_default()
        .entry((coord.x, coord.z))
        .or_default();
    chunk_ref.refs += 1;
    chunk_ref.access();
    if chunk_ref.refs != 1 {
        warn!(
            "chunk loaded but reference count not 1 {}: {} refs",
            coord, chunk_ref.refs
        );
    }
}

/// Records a chunk unload event; warns when the count does not return to 0.
pub fn unload(coord: ChunkCoord) {
    let mut registry = registry();
    let chunk_ref = registry
        .entry(coord.dimension)
        .or_default()
        .entry((coord.x, coord.z))
        .or_default();
    chunk_ref.refs -= 1;
    chunk_ref.access();
    if chunk_ref.refs != 0 {
        warn!(
            "chunk unloaded but reference count not 0 {}: {} refs",
            coord, chunk_ref.refs
        );
    }
}

/// Stamps a redraw time on a tracked chunk.
///
/// Redrawing an untracked chunk is logged and ignored; the map can redraw
/// from persisted data for chunks that were never loaded this session.
pub fn redraw(coord: ChunkCoord) {
    let mut registry = registry();
    let tracked = registry
        .get_mut(&coord.dimension)
        .and_then(|refs| refs.get_mut(&(coord.x, coord.z)));
    match tracked {
        Some(chunk_ref) => chunk_ref.last_redraw = Some(Instant::now()),
        None => warn!("redraw occurred on chunk that isn't tracked {}", coord),
    }
}

/// Returns the records inside an inclusive chunk-coordinate window of one
/// dimension, age-stamped against the time of the call.
pub fn query(dimension: i32, min: (i32, i32), max: (i32, i32)) -> Vec<OverlayRecord> {
    let registry = registry();
    let now = Instant::now();
    let Some(refs) = registry.get(&dimension) else {
        return Vec::new();
    };
    refs.iter()
        .filter(|(&(x, z), _)| x >= min.0 && x <= max.0 && z >= min.1 && z <= max.1)
        .map(|(&(x, z), chunk_ref)| OverlayRecord {
            x,
            z,
            refs: chunk_ref.refs,
            access_age: chunk_ref
                .last_access
                .map(|t| now.duration_since(t))
                .unwrap_or_default(),
            redraw_age: chunk_ref.last_redraw.map(|t| now.duration_since(t)),
        })
        .collect()
}

/// Drops every record in every dimension. Called on world unload.
pub fn clear() {
    registry().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The registry is process-global, so the whole lifecycle runs in one
    // test, serialized against every other test that touches the registry.
    #[test]
    fn registry_lifecycle() {
        let _registry = crate::map_state::test_util::overlay_guard();
        const DIM: i32 = 9431;
        let coord = ChunkCoord::new(1, 2, DIM);

        load(coord);
        let records = query(DIM, (0, 0), (4, 4));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].refs, 1);
        assert_eq!(records[0].redraw_age, None);

        // Double load: warns, keeps counting.
        load(coord);
        assert_eq!(query(DIM, (0, 0), (4, 4))[0].refs, 2);

        redraw(coord);
        assert!(query(DIM, (0, 0), (4, 4))[0].redraw_age.is_some());

        // Redraw of an untracked chunk is a logged no-op.
        redraw(ChunkCoord::new(50, 50, DIM));
        assert!(query(DIM, (50, 50), (50, 50)).is_empty());

        unload(coord);
        unload(coord);
        assert_eq!(query(DIM, (0, 0), (4, 4))[0].refs, 0);

        // Window filtering.
        load(ChunkCoord::new(10, 10, DIM));
        assert!(query(DIM, (0, 0), (4, 4))
            .iter()
            .all(|record| (record.x, record.z) != (10, 10)));

        clear();
        assert!(query(DIM, (i32::MIN, i32::MIN), (i32::MAX, i32::MAX)).is_empty());
    }
}
