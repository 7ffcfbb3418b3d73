//! Spawn, despawn, destroy and discard
//!
//! These are the only functions that register a thing with, or remove it
//! from, the spatial indices of a map. Registration runs in a fixed order so
//! later indices can rely on earlier ones (regions before path costs, the
//! thing grid before cover). Deregistration runs in reverse.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ahash::AHasher;
use glam::IVec2;

use super::events::ThingEvent;
use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::{CellRect, HolderId, MapId, ThingId};
use crate::defs::{DrawerType, ThingCategory, ThingDef};
use crate::entity::Lifecycle;
use crate::map::Map;

/// Why a thing is being destroyed or despawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DestroyMode {
    #[default]
    Vanish,
    WillReplace,
    KillFinalize,
    Deconstruct,
    FailConstruction,
    Cancel,
    Refund,
}

impl World {
    /// Place an unspawned thing on a map at `cell`
    ///
    /// Rejected for destroyed, already-spawned and held things, unknown maps
    /// and footprints outside the map. A stack count above the def's limit
    /// is clamped and reported. Quest signals are skipped when
    /// `respawning_after_load` is set.
    pub fn spawn(
        &mut self,
        id: ThingId,
        map_id: MapId,
        cell: IVec2,
        respawning_after_load: bool,
    ) -> Result<()> {
        let thing = self.require(id)?;
        let name = thing.to_string();
        if thing.destroyed() {
            return self.reject(ThingError::SpawnDestroyed(name));
        }
        if thing.spawned() {
            return self.reject(ThingError::AlreadySpawned(name));
        }
        if thing.holding_owner.is_some() {
            return self.reject(ThingError::HeldByContainer(name));
        }
        let def = Arc::clone(&thing.def);
        let rect = CellRect::occupied(cell, thing.rotation, def.size());

        let Some(map) = self.maps.get(&map_id) else {
            return self.reject(ThingError::MapNotFound(map_id));
        };
        if !map.thing_grid.rect_in_bounds(&rect) {
            return self.reject(ThingError::OutOfBounds { thing: name, cell });
        }

        let Some(thing) = self.things.get_mut(&id) else {
            return Err(ThingError::ThingNotFound(id));
        };
        if thing.stack_count > def.stack_limit {
            let error = ThingError::StackOverLimit {
                thing: name.clone(),
                count: thing.stack_count,
                limit: def.stack_limit,
            };
            thing.stack_count = def.stack_limit;
            self.diagnostics.error(error);
        }
        thing.position = cell;
        thing.state = Lifecycle::Spawned { map: map_id };
        let stack_count = thing.stack_count;

        if let Some(map) = self.maps.get_mut(&map_id) {
            register_spatial(map, id, &def, &rect);
        }
        if !self.tick_manager.register(id, def.tick_kind) {
            self.diagnostics
                .error(ThingError::DuplicateTickRegistration(name.clone()));
        }
        if let Some(map) = self.maps.get_mut(&map_id) {
            register_caches(map, id, &def, &rect, stack_count);
        }
        if def.receives_signals {
            self.signals.register_receiver(id);
        }

        tracing::debug!("Spawned {} on {:?} at {}", name, map_id, cell);
        self.events.push(ThingEvent::Spawned {
            thing: id,
            map: map_id,
            cell,
            respawning_after_load,
        });

        if !respawning_after_load {
            self.send_quest_signals(id, "Spawned");
        }
        Ok(())
    }

    /// Re-register a loaded thing at its saved position
    pub fn respawn_after_load(&mut self, id: ThingId, map: MapId) -> Result<()> {
        let cell = self.require(id)?.position;
        self.spawn(id, map, cell, true)
    }

    /// Remove a spawned thing from its map without destroying it
    pub fn despawn(&mut self, id: ThingId, mode: DestroyMode) -> Result<()> {
        let thing = self.require(id)?;
        let name = thing.to_string();
        if thing.destroyed() {
            return self.reject(ThingError::DespawnDestroyed(name));
        }
        let Some(map_id) = thing.map() else {
            return self.reject(ThingError::NotSpawned(name));
        };
        let def = Arc::clone(&thing.def);
        let rect = thing.occupied_rect();

        if !self.maps.contains_key(&map_id) {
            self.diagnostics
                .error_once(stale_map_key(id), ThingError::StaleMapReference(map_id));
            return Err(ThingError::StaleMapReference(map_id));
        }

        if def.receives_signals {
            self.signals.deregister_receiver(id);
        }
        if let Some(map) = self.maps.get_mut(&map_id) {
            deregister_caches(map, id, &def, &rect);
        }
        self.tick_manager.deregister(id, def.tick_kind);
        if let Some(map) = self.maps.get_mut(&map_id) {
            deregister_spatial(map, id, &def, &rect);
            map.physical_reservations.release_all_for_target(id);
        }

        if let Some(thing) = self.things.get_mut(&id) {
            thing.state = Lifecycle::Unspawned;
        }

        tracing::debug!("Despawned {} from {:?} ({:?})", name, map_id, mode);
        self.events.push(ThingEvent::Despawned {
            thing: id,
            map: map_id,
            mode,
        });
        self.send_quest_signals(id, "Despawned");
        Ok(())
    }

    /// Destroy a thing, despawning it first if needed
    ///
    /// Order: despawn, mark destroyed, discard if the def asks for it,
    /// leavings (only if it was spawned and did not detonate), holder
    /// notification, reservation and designation release, stack count reset,
    /// quest signal.
    pub fn destroy(&mut self, id: ThingId, mode: DestroyMode) -> Result<()> {
        let allow_non_destroyable = self.config.allow_destroy_non_destroyable;
        let thing = self.require(id)?;
        let name = thing.to_string();
        if !thing.def.destroyable && !allow_non_destroyable {
            return self.reject(ThingError::NonDestroyable(name));
        }
        if thing.destroyed() {
            return self.reject(ThingError::AlreadyDestroyed(name));
        }
        let def = Arc::clone(&thing.def);
        let was_spawned_on = thing.map();
        let holder = thing.holding_owner;

        if was_spawned_on.is_some() {
            self.despawn(id, mode)?;
        }

        if let Some(thing) = self.things.get_mut(&id) {
            thing.state = Lifecycle::Destroyed;
        }
        tracing::debug!("Destroyed {} ({:?})", name, mode);
        self.events.push(ThingEvent::Destroyed { thing: id, mode });

        if def.discard_on_destroyed {
            self.discard(id)?;
        }

        let detonated = self.things.get(&id).map_or(false, |t| {
            t.comps()
                .iter()
                .filter_map(|c| c.as_explosive())
                .any(|e| e.destroyed_through_detonation)
        });
        if let Some(map) = was_spawned_on {
            if !detonated {
                self.events.push(ThingEvent::LeavingsMade { thing: id, map, mode });
                let leavings = Arc::clone(&self.leavings);
                leavings.do_leavings_for(self, id, map, mode);
            }
        }

        if let Some(holder) = holder {
            self.notify_contained_destroyed(holder, id);
        }

        if def.category != ThingCategory::Mote {
            self.release_everywhere(id);
        }
        for map in self.maps.values_mut() {
            map.damage_watcher.forget(id);
        }

        if !def.persists_after_destroy() {
            if let Some(thing) = self.things.get_mut(&id) {
                thing.stack_count = 0;
            }
        }

        self.send_quest_signals(id, "Destroyed");
        Ok(())
    }

    /// Destroy with [`DestroyMode::KillFinalize`]
    pub fn kill(&mut self, id: ThingId) -> Result<()> {
        self.destroy(id, DestroyMode::KillFinalize)
    }

    /// Mark a destroyed thing as no longer managed or saved
    pub fn discard(&mut self, id: ThingId) -> Result<()> {
        let thing = self.require(id)?;
        if thing.state != Lifecycle::Destroyed {
            let error = ThingError::InvalidDiscard {
                thing: thing.to_string(),
                state: thing.state.name().to_string(),
            };
            self.diagnostics.warning(error.clone());
            return Err(error);
        }
        if let Some(thing) = self.things.get_mut(&id) {
            thing.state = Lifecycle::Discarded;
        }
        self.events.push(ThingEvent::Discarded { thing: id });
        Ok(())
    }

    /// Tear down a map and everything on it
    ///
    /// Things spawned on the map, and anything held by them, are discarded
    /// unless they are pawns or held somewhere in a pawn's holder chain.
    /// Those become unspawned and survive the map.
    pub fn remove_map(&mut self, map_id: MapId) -> Result<()> {
        let Some(map) = self.maps.remove(&map_id) else {
            return self.reject(ThingError::MapNotFound(map_id));
        };

        let mut affected = map.spawned_things.sorted();
        let mut i = 0;
        while i < affected.len() {
            let parent = affected[i];
            let mut held: Vec<ThingId> = self
                .holders
                .values()
                .filter(|h| h.parent_thing() == Some(parent))
                .flat_map(|h| h.contents().iter().copied())
                .collect();
            held.retain(|t| !affected.contains(t));
            held.sort();
            affected.extend(held);
            i += 1;
        }

        let mut discarded = 0;
        for id in affected {
            if self.notify_map_removed(id) {
                discarded += 1;
            }
        }

        tracing::info!("Removed map {:?}, discarded {} things", map_id, discarded);
        self.events.push(ThingEvent::MapRemoved {
            map: map_id,
            discarded,
        });
        Ok(())
    }

    /// Returns true if the thing was discarded
    fn notify_map_removed(&mut self, id: ThingId) -> bool {
        let Some(thing) = self.things.get(&id) else {
            return false;
        };
        let def = Arc::clone(&thing.def);
        let keep = def.persists_after_destroy() || self.any_parent_is_pawn(id);

        if def.receives_signals {
            self.signals.deregister_receiver(id);
        }
        if thing.spawned() {
            self.tick_manager.deregister(id, def.tick_kind);
        }

        let discarded = if let Some(thing) = self.things.get_mut(&id) {
            if keep {
                if thing.spawned() {
                    thing.state = Lifecycle::Unspawned;
                }
                false
            } else {
                thing.state = Lifecycle::Discarded;
                true
            }
        } else {
            false
        };

        self.release_everywhere(id);
        discarded
    }

    /// Drop every reservation and designation targeting `id` on every map
    pub(crate) fn release_everywhere(&mut self, id: ThingId) {
        for map in self.maps.values_mut() {
            map.release_all_for_target(id);
        }
    }

    fn notify_contained_destroyed(&mut self, holder: HolderId, id: ThingId) {
        if let Some(owner) = self.holders.get_mut(&holder) {
            owner.remove(id);
        }
        if let Some(thing) = self.things.get_mut(&id) {
            thing.holding_owner = None;
        }
    }
}

fn stale_map_key(id: ThingId) -> u64 {
    let mut hasher = AHasher::default();
    ("stale-map", id).hash(&mut hasher);
    hasher.finish()
}

/// Occupancy side: regions, the spawned list, listers and the thing grid
fn register_spatial(map: &mut Map, id: ThingId, def: &ThingDef, rect: &CellRect) {
    map.region_listers.register(id, rect);
    map.spawned_things.add(id);
    map.lister_things.add(id, &def.def_name, def.category);
    map.thing_grid.register(id, rect);
}

fn deregister_spatial(map: &mut Map, id: ThingId, def: &ThingDef, rect: &CellRect) {
    map.thing_grid.deregister(id, rect);
    map.lister_things.remove(id, &def.def_name, def.category);
    map.spawned_things.remove(id);
    map.region_listers.deregister(id, rect);
}

/// Everything derived from occupancy
fn register_caches(map: &mut Map, id: ThingId, def: &ThingDef, rect: &CellRect, stack_count: u32) {
    if def.drawer_type != DrawerType::RealtimeOnly {
        map.map_drawer.map_mesh_dirty_around(rect);
    }
    if def.drawer_type != DrawerType::MapMeshOnly {
        map.dynamic_drawables.add(id);
    }
    if def.linked_graphic {
        map.link_grid.add(id);
        map.map_drawer.map_mesh_dirty_around(rect);
    }
    if !def.can_overlap_zones {
        map.zone_manager.notify_no_zone_overlap_thing_spawned(id, *rect);
    }
    if def.affects_regions {
        map.region_dirtyer.notify_thing_affecting_regions_changed(*rect);
    }
    if def.affects_path_cost() {
        map.path_grid.recalculate_perceived_path_cost_under(*rect);
    }
    if def.affects_reachability {
        map.reachability.clear_cache();
    }
    map.cover_grid.register(id, rect, def.fill_percent);
    if def.is_item() {
        map.lister_haulables.add(id);
        map.lister_mergeables.notify_spawned(id, stack_count, def.stack_limit);
    }
    if def.capabilities.attack_target {
        map.attack_targets.add(id);
    }
    if def.capabilities.haul_destination {
        map.haul_destinations.add(id);
    }
}

fn deregister_caches(map: &mut Map, id: ThingId, def: &ThingDef, rect: &CellRect) {
    if def.capabilities.haul_destination {
        map.haul_destinations.remove(id);
    }
    if def.capabilities.attack_target {
        map.attack_targets.remove(id);
    }
    if def.is_item() {
        map.lister_mergeables.notify_despawned(id);
        map.lister_haulables.remove(id);
    }
    map.cover_grid.deregister(id, rect);
    if def.affects_reachability {
        map.reachability.clear_cache();
    }
    if def.affects_path_cost() {
        map.path_grid.recalculate_perceived_path_cost_under(*rect);
    }
    if def.affects_regions {
        map.region_dirtyer.notify_thing_affecting_regions_changed(*rect);
    }
    if !def.can_overlap_zones {
        map.zone_manager.notify_no_zone_overlap_thing_despawned(id);
    }
    if def.linked_graphic {
        map.link_grid.remove(id);
        map.map_drawer.map_mesh_dirty_around(rect);
    }
    if def.drawer_type != DrawerType::MapMeshOnly {
        map.dynamic_drawables.remove(id);
    }
    if def.drawer_type != DrawerType::RealtimeOnly {
        map.map_drawer.map_mesh_dirty_around(rect);
    }
}

/// Move the occupancy of a spawned thing from one footprint to another
pub(crate) fn relocate(map: &mut Map, id: ThingId, def: &ThingDef, from: &CellRect, to: &CellRect) {
    if def.drawer_type != DrawerType::RealtimeOnly {
        map.map_drawer.map_mesh_dirty_around(from);
    }
    map.region_listers.deregister(id, from);
    map.thing_grid.deregister(id, from);
    map.cover_grid.deregister(id, from);
    if !def.can_overlap_zones {
        map.zone_manager.notify_no_zone_overlap_thing_despawned(id);
    }
    if def.affects_path_cost() {
        map.path_grid.recalculate_perceived_path_cost_under(*from);
    }

    map.thing_grid.register(id, to);
    map.region_listers.register(id, to);
    map.cover_grid.register(id, to, def.fill_percent);
    if !def.can_overlap_zones {
        map.zone_manager.notify_no_zone_overlap_thing_spawned(id, *to);
    }
    if def.affects_path_cost() {
        map.path_grid.recalculate_perceived_path_cost_under(*to);
    }
    if def.drawer_type != DrawerType::RealtimeOnly {
        map.map_drawer.map_mesh_dirty_around(to);
    }
    if def.affects_reachability {
        map.reachability.clear_cache();
    }
}
