//! Per-map spatial indices
//!
//! A `Map` is the spatial container things spawn into. It only stores
//! `ThingId`s; the lifecycle code in [`crate::world`] is the one place that
//! registers and deregisters things here.

pub mod caches;
pub mod grid;
pub mod listers;
pub mod regions;
pub mod reservations;

use glam::IVec2;

use crate::core::types::{MapId, ThingId};

pub use caches::{DamageWatcher, MapDrawer, PathGrid, Reachability, RegionDirtyer, ZoneManager};
pub use grid::{CellGrid, CoverGrid, ThingGrid};
pub use listers::{ListerMergeables, ListerThings, ThingSet};
pub use regions::RegionListers;
pub use reservations::{DesignationManager, ReservationManager};

/// Every index a thing can be registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    SpawnedThings,
    ListerThings,
    ThingGrid,
    RegionListers,
    CoverGrid,
    DynamicDrawables,
    LinkGrid,
    ZoneBlockers,
    Haulables,
    Mergeables,
    AttackTargets,
    HaulDestinations,
    Reservations,
    PhysicalReservations,
    AttackTargetReservations,
    Designations,
}

/// A spatial container indexing spawned things by cell
#[derive(Debug, Clone)]
pub struct Map {
    pub id: MapId,
    pub size: IVec2,

    pub spawned_things: ThingSet,
    pub lister_things: ListerThings,
    pub thing_grid: ThingGrid,
    pub region_listers: RegionListers,
    pub cover_grid: CoverGrid,
    pub dynamic_drawables: ThingSet,
    pub link_grid: ThingSet,
    pub zone_manager: ZoneManager,
    pub lister_haulables: ThingSet,
    pub lister_mergeables: ListerMergeables,
    pub attack_targets: ThingSet,
    pub haul_destinations: ThingSet,

    pub map_drawer: MapDrawer,
    pub path_grid: PathGrid,
    pub reachability: Reachability,
    pub region_dirtyer: RegionDirtyer,
    pub damage_watcher: DamageWatcher,

    pub reservations: ReservationManager,
    pub physical_reservations: ReservationManager,
    pub attack_target_reservations: ReservationManager,
    pub designations: DesignationManager,
}

impl Map {
    pub fn new(id: MapId, size: IVec2, region_size: i32) -> Self {
        Self {
            id,
            size,
            spawned_things: ThingSet::new(),
            lister_things: ListerThings::default(),
            thing_grid: ThingGrid::new(size.x, size.y),
            region_listers: RegionListers::new(region_size),
            cover_grid: CoverGrid::new(size.x, size.y),
            dynamic_drawables: ThingSet::new(),
            link_grid: ThingSet::new(),
            zone_manager: ZoneManager::default(),
            lister_haulables: ThingSet::new(),
            lister_mergeables: ListerMergeables::default(),
            attack_targets: ThingSet::new(),
            haul_destinations: ThingSet::new(),
            map_drawer: MapDrawer::default(),
            path_grid: PathGrid::default(),
            reachability: Reachability::default(),
            region_dirtyer: RegionDirtyer::default(),
            damage_watcher: DamageWatcher::default(),
            reservations: ReservationManager::default(),
            physical_reservations: ReservationManager::default(),
            attack_target_reservations: ReservationManager::default(),
            designations: DesignationManager::default(),
        }
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        self.thing_grid.in_bounds(cell)
    }

    pub fn things_at(&self, cell: IVec2) -> &[ThingId] {
        self.thing_grid.things_at(cell)
    }

    /// Release every claim and designation targeting `thing` on this map
    pub fn release_all_for_target(&mut self, thing: ThingId) {
        self.reservations.release_all_for_target(thing);
        self.physical_reservations.release_all_for_target(thing);
        self.attack_target_reservations.release_all_for_target(thing);
        self.designations.remove_all_designations_on(thing);
    }

    /// Which indices currently reference `thing`
    pub fn indices_containing(&self, thing: ThingId) -> Vec<IndexKind> {
        let checks = [
            (IndexKind::SpawnedThings, self.spawned_things.contains(thing)),
            (IndexKind::ListerThings, self.lister_things.contains(thing)),
            (IndexKind::ThingGrid, self.thing_grid.contains(thing)),
            (IndexKind::RegionListers, self.region_listers.contains(thing)),
            (IndexKind::CoverGrid, self.cover_grid.contains(thing)),
            (IndexKind::DynamicDrawables, self.dynamic_drawables.contains(thing)),
            (IndexKind::LinkGrid, self.link_grid.contains(thing)),
            (IndexKind::ZoneBlockers, self.zone_manager.contains(thing)),
            (IndexKind::Haulables, self.lister_haulables.contains(thing)),
            (IndexKind::Mergeables, self.lister_mergeables.contains(thing)),
            (IndexKind::AttackTargets, self.attack_targets.contains(thing)),
            (IndexKind::HaulDestinations, self.haul_destinations.contains(thing)),
            (IndexKind::Reservations, self.reservations.is_reserved(thing)),
            (
                IndexKind::PhysicalReservations,
                self.physical_reservations.is_reserved(thing),
            ),
            (
                IndexKind::AttackTargetReservations,
                self.attack_target_reservations.is_reserved(thing),
            ),
            (IndexKind::Designations, self.designations.has_designation_on(thing)),
        ];

        checks
            .into_iter()
            .filter_map(|(kind, present)| present.then_some(kind))
            .collect()
    }
}
