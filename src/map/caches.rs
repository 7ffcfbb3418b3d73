//! Derived caches that only need to hear about changes
//!
//! Mesh generation, path costs and reachability are computed elsewhere.
//! What lives here is the notification side: which cells went stale and how
//! many times each cache was told to rebuild.

use ahash::{AHashMap, AHashSet};
use glam::IVec2;

use crate::core::types::{CellRect, ThingId};

/// Cells whose static mesh must be regenerated
#[derive(Debug, Clone, Default)]
pub struct MapDrawer {
    dirty: AHashSet<IVec2>,
    dirty_calls: u64,
}

impl MapDrawer {
    pub fn map_mesh_dirty(&mut self, cell: IVec2) {
        self.dirty_calls += 1;
        self.dirty.insert(cell);
    }

    /// Dirty `rect` grown by one cell, for linked graphics
    pub fn map_mesh_dirty_around(&mut self, rect: &CellRect) {
        for cell in rect.expanded_by(1).cells() {
            self.map_mesh_dirty(cell);
        }
    }

    pub fn is_dirty(&self, cell: IVec2) -> bool {
        self.dirty.contains(&cell)
    }

    pub fn dirty_calls(&self) -> u64 {
        self.dirty_calls
    }

    /// Take the stale cells, as the mesh rebuild would
    pub fn take_dirty(&mut self) -> Vec<IVec2> {
        let mut cells: Vec<_> = self.dirty.drain().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }
}

/// Requests to recompute perceived path cost under a footprint
#[derive(Debug, Clone, Default)]
pub struct PathGrid {
    pending: Vec<CellRect>,
    recalculations: u64,
}

impl PathGrid {
    pub fn recalculate_perceived_path_cost_under(&mut self, rect: CellRect) {
        self.recalculations += 1;
        self.pending.push(rect);
    }

    pub fn recalculations(&self) -> u64 {
        self.recalculations
    }

    pub fn take_pending(&mut self) -> Vec<CellRect> {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reachability {
    cache_clears: u64,
}

impl Reachability {
    pub fn clear_cache(&mut self) {
        self.cache_clears += 1;
    }

    pub fn cache_clears(&self) -> u64 {
        self.cache_clears
    }
}

/// Region graph rebuild requests from things that shape regions
#[derive(Debug, Clone, Default)]
pub struct RegionDirtyer {
    dirty_rects: Vec<CellRect>,
}

impl RegionDirtyer {
    pub fn notify_thing_affecting_regions_changed(&mut self, rect: CellRect) {
        self.dirty_rects.push(rect);
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_rects.len()
    }

    pub fn take_dirty_rects(&mut self) -> Vec<CellRect> {
        std::mem::take(&mut self.dirty_rects)
    }
}

/// Zones must be cut back where a thing that cannot overlap them spawns
#[derive(Debug, Clone, Default)]
pub struct ZoneManager {
    blocked_by: AHashMap<ThingId, CellRect>,
}

impl ZoneManager {
    pub fn notify_no_zone_overlap_thing_spawned(&mut self, thing: ThingId, rect: CellRect) {
        self.blocked_by.insert(thing, rect);
    }

    pub fn notify_no_zone_overlap_thing_despawned(&mut self, thing: ThingId) {
        self.blocked_by.remove(&thing);
    }

    pub fn is_blocked(&self, cell: IVec2) -> bool {
        self.blocked_by.values().any(|rect| rect.contains(cell))
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.blocked_by.contains_key(&thing)
    }
}

/// Accumulated damage taken by things on this map
#[derive(Debug, Clone, Default)]
pub struct DamageWatcher {
    taken: AHashMap<ThingId, f32>,
    total: f32,
}

impl DamageWatcher {
    pub fn notify_damage_taken(&mut self, thing: ThingId, amount: f32) {
        *self.taken.entry(thing).or_insert(0.0) += amount;
        self.total += amount;
    }

    pub fn damage_taken_by(&self, thing: ThingId) -> f32 {
        self.taken.get(&thing).copied().unwrap_or(0.0)
    }

    /// Damage taken over the map's life, including things since forgotten
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Stop tracking a thing that is gone for good
    pub fn forget(&mut self, thing: ThingId) {
        self.taken.remove(&thing);
    }

    /// Take the per-thing tallies, leaving the running total alone
    pub fn take_taken(&mut self) -> Vec<(ThingId, f32)> {
        let mut taken: Vec<_> = self.taken.drain().collect();
        taken.sort_by_key(|(id, _)| *id);
        taken
    }

    pub fn tracked_count(&self) -> usize {
        self.taken.len()
    }
}
