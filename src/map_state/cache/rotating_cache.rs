//! # Rotating Chunk Cache
//!
//! A fixed-capacity associative cache keyed by [`ChunkCoord`], with a
//! round-robin sweep cursor.
//!
//! ## Storage Strategy
//!
//! The cache is a ring-buffer-backed hash map: a fixed slot vector holds the
//! entries (with tombstones where entries were removed) and a `HashMap` keys
//! slot indices by coordinate. Two cursors walk the ring independently:
//!
//! * the **write cursor** picks the slot for the next insertion, wrapping
//!   around and evicting the occupant once the cache is full;
//! * the **rotation cursor** drives [`RotatingChunkCache::next_entry`], which
//!   resumes each sweep where the previous one stopped so repeated bounded
//!   sweeps eventually visit every entry.
//!
//! Addressing slots rather than keys keeps the visited/not-yet-visited
//! partition stable while entries come and go between sweeps: a removal just
//! leaves a tombstone the rotation cursor skips, instead of reshuffling an
//! iteration order the way a plain hash map would.
//!
//! ## Removal During Rotation
//!
//! Removing an entry ahead of the rotation cursor means the cursor skips its
//! tombstone; removing one behind the cursor shortens the current rotation by
//! one. An entry inserted into a tombstone ahead of the cursor is visited in
//! the current rotation, behind it in the next. No entry is ever visited
//! twice in one full rotation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::map_state::chunk::{ChunkAccess, ChunkCoord};

const VISIBLE_FLAG: u8 = 0x01;
const VIEWED_FLAG: u8 = 0x02;

/// The visibility state of a cached chunk.
///
/// Two independent bits:
///
/// * **visible** - the chunk was within save distance of the player as of the
///   last sweep that evaluated it;
/// * **viewed** - the chunk has been visible at least once since it was
///   cached. Sticky until the entry is removed; gates persistence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkFlags(u8);

impl ChunkFlags {
    /// Flags of a freshly cached chunk: neither visible nor viewed.
    pub fn new() -> Self {
        Self(0)
    }

    /// True when the chunk was within save distance as of the last sweep.
    pub fn is_visible(self) -> bool {
        self.0 & VISIBLE_FLAG != 0
    }

    /// True when the chunk has been visible at least once since caching.
    pub fn is_viewed(self) -> bool {
        self.0 & VIEWED_FLAG != 0
    }

    /// Marks the chunk within save distance: sets visible and viewed.
    pub fn enter_view(&mut self) {
        self.0 |= VISIBLE_FLAG | VIEWED_FLAG;
    }

    /// Marks the chunk out of save distance: clears visible only. Viewed is
    /// sticky.
    pub fn leave_view(&mut self) {
        self.0 &= !VISIBLE_FLAG;
    }
}

/// A cache entry: a handle to a live chunk plus its visibility flags.
pub struct CachedChunk {
    /// The live chunk handle. Only the main tick thread dereferences this;
    /// workers are handed snapshots instead.
    pub chunk: Arc<dyn ChunkAccess>,
    /// Visibility state, owned and mutated by the sweep.
    pub flags: ChunkFlags,
}

impl CachedChunk {
    /// Wraps a live chunk with fresh (cleared) flags.
    ///
    /// A re-added chunk therefore re-earns viewed status from scratch, which
    /// is what makes the replace-path save in the chunk manager necessary.
    pub fn new(chunk: Arc<dyn ChunkAccess>) -> Self {
        Self {
            chunk,
            flags: ChunkFlags::new(),
        }
    }
}

struct Slot {
    coord: ChunkCoord,
    entry: CachedChunk,
}

/// Fixed-capacity chunk cache with round-robin iteration.
///
/// Not internally synchronized: the chunk manager serializes all access
/// behind its single state lock, and background tasks never see the cache at
/// all.
///
/// # Invariants
/// * `len() <= capacity()` always.
/// * At most one entry per coordinate.
/// * `remove` of an absent key is a no-op.
pub struct RotatingChunkCache {
    slots: Vec<Option<Slot>>,
    index: HashMap<ChunkCoord, usize>,
    write_cursor: usize,
    rotation_cursor: usize,
    len: usize,
}

impl RotatingChunkCache {
    /// Creates a cache holding at most `capacity` chunks.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "chunk cache capacity must be nonzero");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            index: HashMap::with_capacity(capacity),
            write_cursor: 0,
            rotation_cursor: 0,
            len: 0,
        }
    }

    /// Maximum number of entries the cache can hold.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up the entry cached at `coord`.
    pub fn get(&self, coord: ChunkCoord) -> Option<&CachedChunk> {
        let idx = *self.index.get(&coord)?;
        self.slots[idx].as_ref().map(|slot| &slot.entry)
    }

    /// Mutable lookup of the entry cached at `coord`.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut CachedChunk> {
        let idx = *self.index.get(&coord)?;
        self.slots[idx].as_mut().map(|slot| &mut slot.entry)
    }

    /// Inserts or replaces the entry at `coord`, returning whatever entry was
    /// displaced.
    ///
    /// Two displacement paths exist and the caller must treat both the same
    /// way (save the displaced chunk if it was viewed):
    ///
    /// * the coordinate was already cached - the old entry is replaced in its
    ///   slot and returned with its flags intact;
    /// * the cache is full - the occupant of the slot under the write cursor
    ///   is evicted and returned.
    pub fn put(
        &mut self,
        coord: ChunkCoord,
        entry: CachedChunk,
    ) -> Option<(ChunkCoord, CachedChunk)> {
        if let Some(&idx) = self.index.get(&coord) {
            let displaced = self.slots[idx].replace(Slot { coord, entry });
            return displaced.map(|slot| (slot.coord, slot.entry));
        }

        let capacity = self.slots.len();
        let displaced = if self.len < capacity {
            // A tombstone is guaranteed somewhere; walk the ring to the next
            // free slot.
            while self.slots[self.write_cursor].is_some() {
                self.write_cursor = (self.write_cursor + 1) % capacity;
            }
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.write_cursor].take();
            if let Some(old) = &evicted {
                self.index.remove(&old.coord);
            }
            evicted
        };

        self.slots[self.write_cursor] = Some(Slot { coord, entry });
        self.index.insert(coord, self.write_cursor);
        self.write_cursor = (self.write_cursor + 1) % capacity;

        displaced.map(|slot| (slot.coord, slot.entry))
    }

    /// Removes and returns the entry at `coord`. Absent keys are a no-op.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<CachedChunk> {
        let idx = self.index.remove(&coord)?;
        let slot = self.slots[idx].take()?;
        self.len -= 1;
        Some(slot.entry)
    }

    /// Returns the next entry in rotation order, advancing the internal
    /// cursor past it. Returns `None` only when the cache is empty.
    ///
    /// Each call visits exactly one entry, so callers can bound per-tick work
    /// independently of cache size and still reach every entry over enough
    /// calls.
    pub fn next_entry(&mut self) -> Option<(ChunkCoord, &mut CachedChunk)> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.slots.len();
        let mut found = None;
        for _ in 0..capacity {
            let idx = self.rotation_cursor;
            self.rotation_cursor = (idx + 1) % capacity;
            if self.slots[idx].is_some() {
                found = Some(idx);
                break;
            }
        }
        let slot = self.slots[found?].as_mut()?;
        Some((slot.coord, &mut slot.entry))
    }

    /// Iterates every occupied entry in slot order.
    ///
    /// Used for full passes (shutdown flush), not for sweeps - sweeps go
    /// through [`Self::next_entry`].
    pub fn entries(&self) -> impl Iterator<Item = (ChunkCoord, &CachedChunk)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|slot| (slot.coord, &slot.entry)))
    }

    /// Empties the cache and resets both cursors.
    ///
    /// Deliberately performs no save side effects; callers flush viewed
    /// entries first (see the chunk manager's `close`).
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.index.clear();
        self.write_cursor = 0;
        self.rotation_cursor = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_state::test_util::TestChunk;
    use std::collections::HashSet;

    fn coord(x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::new(x, z, 0)
    }

    fn entry(x: i32, z: i32) -> CachedChunk {
        CachedChunk::new(Arc::new(TestChunk::new(x, z, 0).with_section(0)))
    }

    #[test]
    fn flags_viewed_is_sticky() {
        let mut flags = ChunkFlags::new();
        assert!(!flags.is_visible() && !flags.is_viewed());

        flags.enter_view();
        assert!(flags.is_visible() && flags.is_viewed());

        flags.leave_view();
        assert!(!flags.is_visible());
        assert!(flags.is_viewed());
    }

    #[test]
    fn put_same_coord_replaces_and_returns_old_entry() {
        let mut cache = RotatingChunkCache::new(4);
        assert!(cache.put(coord(1, 1), entry(1, 1)).is_none());

        let mut viewed = entry(1, 1);
        viewed.flags.enter_view();
        // Install a viewed entry, then replace it.
        cache.put(coord(1, 1), viewed);
        let displaced = cache.put(coord(1, 1), entry(1, 1));

        let (old_coord, old_entry) = displaced.expect("replacement must return old entry");
        assert_eq!(old_coord, coord(1, 1));
        assert!(old_entry.flags.is_viewed());
        // The fresh entry re-earns its flags.
        assert!(!cache.get(coord(1, 1)).unwrap().flags.is_viewed());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_beyond_capacity_evicts_and_returns_occupant() {
        let mut cache = RotatingChunkCache::new(2);
        cache.put(coord(0, 0), entry(0, 0));
        cache.put(coord(1, 0), entry(1, 0));

        let displaced = cache.put(coord(2, 0), entry(2, 0));
        let (evicted_coord, _) = displaced.expect("full cache must evict");
        assert_eq!(evicted_coord, coord(0, 0));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(coord(0, 0)).is_none());
        assert!(cache.get(coord(2, 0)).is_some());
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let mut cache = RotatingChunkCache::new(4);
        cache.put(coord(0, 0), entry(0, 0));
        assert!(cache.remove(coord(9, 9)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn rotation_resumes_where_previous_sweep_stopped() {
        let mut cache = RotatingChunkCache::new(4);
        for x in 0..4 {
            cache.put(coord(x, 0), entry(x, 0));
        }

        // Two sweeps of two entries each must cover all four coordinates.
        let mut seen = Vec::new();
        for _ in 0..2 {
            for _ in 0..2 {
                let (c, _) = cache.next_entry().unwrap();
                seen.push(c);
            }
        }
        let distinct: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(distinct.len(), 4);

        // The next call wraps around to the first entry again.
        let (wrapped, _) = cache.next_entry().unwrap();
        assert_eq!(wrapped, seen[0]);
    }

    #[test]
    fn next_entry_on_empty_cache_returns_none() {
        let mut cache = RotatingChunkCache::new(4);
        assert!(cache.next_entry().is_none());
        cache.put(coord(0, 0), entry(0, 0));
        cache.remove(coord(0, 0));
        assert!(cache.next_entry().is_none());
    }

    #[test]
    fn rotation_skips_entry_removed_ahead_of_cursor() {
        let mut cache = RotatingChunkCache::new(4);
        for x in 0..4 {
            cache.put(coord(x, 0), entry(x, 0));
        }

        let (first, _) = cache.next_entry().unwrap();
        assert_eq!(first, coord(0, 0));

        // (1,0) sits directly under the cursor; removing it leaves a
        // tombstone the next call must skip.
        cache.remove(coord(1, 0));
        let (after_removal, _) = cache.next_entry().unwrap();
        assert_eq!(after_removal, coord(2, 0));
        let (last, _) = cache.next_entry().unwrap();
        assert_eq!(last, coord(3, 0));
    }

    #[test]
    fn clear_resets_rotation() {
        let mut cache = RotatingChunkCache::new(4);
        for x in 0..3 {
            cache.put(coord(x, 0), entry(x, 0));
        }
        cache.next_entry();
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.next_entry().is_none());

        cache.put(coord(7, 7), entry(7, 7));
        let (c, _) = cache.next_entry().unwrap();
        assert_eq!(c, coord(7, 7));
    }

    #[test]
    fn random_churn_never_exceeds_capacity_or_duplicates_keys() {
        let mut cache = RotatingChunkCache::new(8);
        fastrand::seed(0x6d61_7077);

        for _ in 0..2000 {
            let c = coord(fastrand::i32(0..16), fastrand::i32(0..16));
            if fastrand::bool() {
                cache.put(c, entry(c.x, c.z));
            } else {
                cache.remove(c);
            }

            assert!(cache.len() <= cache.capacity());
            let coords: Vec<_> = cache.entries().map(|(c, _)| c).collect();
            let distinct: HashSet<_> = coords.iter().copied().collect();
            assert_eq!(coords.len(), distinct.len());
            assert_eq!(coords.len(), cache.len());
        }
    }
}
