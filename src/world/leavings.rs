//! What destroyed and damaged things leave behind

use glam::IVec2;

use super::lifecycle::DestroyMode;
use super::World;
use crate::core::types::{MapId, ThingId};

/// Produces leftovers for destroyed and damaged things
///
/// Called with the world already in its post-destroy state, so
/// implementations may spawn new things freely.
pub trait LeavingsMaker: Send + Sync {
    fn do_leavings_for(&self, world: &mut World, thing: ThingId, map: MapId, mode: DestroyMode);

    fn drop_filth_due_to_damage(&self, world: &mut World, thing: ThingId, damage_dealt: f32);
}

/// Leaves nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLeavings;

impl LeavingsMaker for NoLeavings {
    fn do_leavings_for(&self, _world: &mut World, _thing: ThingId, _map: MapId, _mode: DestroyMode) {}

    fn drop_filth_due_to_damage(&self, _world: &mut World, _thing: ThingId, _damage_dealt: f32) {}
}

/// Most filth a single hit drops unless configured otherwise
pub const DEFAULT_MAX_FILTH_PER_HIT: u32 = 3;

/// Spawns filth where something was killed or badly hurt
#[derive(Debug, Clone)]
pub struct FilthLeavings {
    pub filth_def: String,
    /// Damage dealt per filth dropped
    pub damage_threshold: f32,
    pub max_per_hit: u32,
}

impl FilthLeavings {
    pub fn new(filth_def: impl Into<String>, damage_threshold: f32) -> Self {
        Self {
            filth_def: filth_def.into(),
            damage_threshold,
            max_per_hit: DEFAULT_MAX_FILTH_PER_HIT,
        }
    }

    pub fn with_max_per_hit(mut self, max_per_hit: u32) -> Self {
        self.max_per_hit = max_per_hit;
        self
    }

    /// How many filth a hit dealing `damage_dealt` leaves
    pub fn filth_count_for(&self, damage_dealt: f32) -> u32 {
        if self.damage_threshold <= 0.0 {
            return 0;
        }
        // Float to int casts saturate, NaN becomes zero
        ((damage_dealt / self.damage_threshold).floor() as u32).min(self.max_per_hit)
    }

    /// Make and place one filth; a filth that cannot be placed is destroyed
    fn drop_at(&self, world: &mut World, map: MapId, cell: IVec2, thing: ThingId) {
        let Ok(filth) = world.make_thing(&self.filth_def, None) else {
            return;
        };
        if world.spawn(filth, map, cell, false).is_err() {
            tracing::debug!("Could not place {} for {}", self.filth_def, thing);
            let _ = world.destroy(filth, DestroyMode::Vanish);
        }
    }
}

/// The cell itself, then its neighbours clockwise from north
fn splash_cell(center: IVec2, n: u32) -> IVec2 {
    const OFFSETS: [IVec2; 9] = [
        IVec2::new(0, 0),
        IVec2::new(0, 1),
        IVec2::new(1, 1),
        IVec2::new(1, 0),
        IVec2::new(1, -1),
        IVec2::new(0, -1),
        IVec2::new(-1, -1),
        IVec2::new(-1, 0),
        IVec2::new(-1, 1),
    ];
    center + OFFSETS[n as usize % OFFSETS.len()]
}

impl LeavingsMaker for FilthLeavings {
    fn do_leavings_for(&self, world: &mut World, thing: ThingId, map: MapId, mode: DestroyMode) {
        if mode != DestroyMode::KillFinalize {
            return;
        }
        // Already despawned, the last position is still on the thing
        if let Some(cell) = world.thing(thing).map(|t| t.position()) {
            self.drop_at(world, map, cell, thing);
        }
    }

    fn drop_filth_due_to_damage(&self, world: &mut World, thing: ThingId, damage_dealt: f32) {
        let count = self.filth_count_for(damage_dealt);
        if count == 0 || !world.spawned_or_any_parent_spawned(thing) {
            return;
        }
        if let (Some(map), Some(cell)) = (world.map_held(thing), world.position_held(thing)) {
            for n in 0..count {
                self.drop_at(world, map, splash_cell(cell, n), thing);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LifecycleConfig;
    use crate::defs::{DefDatabase, ThingCategory, ThingDef};
    use crate::entity::Lifecycle;

    fn world() -> World {
        let mut defs = DefDatabase::new();
        defs.add_thing(ThingDef::new("Steel", ThingCategory::Item)).unwrap();
        let mut filth = ThingDef::new("Filth_Blood", ThingCategory::Filth);
        filth.discard_on_destroyed = true;
        defs.add_thing(filth).unwrap();
        World::new(LifecycleConfig::default(), defs)
    }

    fn filth_on(world: &World, map: MapId) -> usize {
        world.map(map).unwrap().lister_things.of_def("Filth_Blood").len()
    }

    #[test]
    fn test_filth_count_scales_with_damage() {
        let leavings = FilthLeavings::new("Filth_Blood", 10.0);
        assert_eq!(leavings.filth_count_for(9.0), 0);
        assert_eq!(leavings.filth_count_for(12.0), 1);
        assert_eq!(leavings.filth_count_for(25.0), 2);
        assert_eq!(leavings.filth_count_for(500.0), DEFAULT_MAX_FILTH_PER_HIT);
        assert_eq!(leavings.clone().with_max_per_hit(10).filth_count_for(500.0), 10);
        assert_eq!(FilthLeavings::new("Filth_Blood", 0.0).filth_count_for(50.0), 0);
    }

    #[test]
    fn test_heavier_hits_leave_more_filth() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let steel = world.make_thing("Steel", None).unwrap();
        world.spawn(steel, map, IVec2::new(5, 5), false).unwrap();
        let leavings = FilthLeavings::new("Filth_Blood", 10.0);

        leavings.drop_filth_due_to_damage(&mut world, steel, 12.0);
        assert_eq!(filth_on(&world, map), 1);
        leavings.drop_filth_due_to_damage(&mut world, steel, 25.0);
        assert_eq!(filth_on(&world, map), 3);
        assert_eq!(world.map(map).unwrap().things_at(IVec2::new(5, 6)).len(), 1);
    }

    #[test]
    fn test_filth_off_the_map_is_not_left_behind() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let steel = world.make_thing("Steel", None).unwrap();
        world.spawn(steel, map, IVec2::new(0, 0), false).unwrap();
        let before = world.thing_count();

        // Only the corner and the three neighbours inside the map take filth
        FilthLeavings::new("Filth_Blood", 10.0)
            .with_max_per_hit(9)
            .drop_filth_due_to_damage(&mut world, steel, 90.0);

        let made: Vec<_> = world
            .thing_ids()
            .into_iter()
            .filter(|id| world.thing(*id).unwrap().def().def_name == "Filth_Blood")
            .collect();
        assert_eq!(world.thing_count(), before + 9);
        assert_eq!(filth_on(&world, map), 4);
        for id in made {
            let state = world.thing(id).unwrap().state();
            assert!(
                matches!(state, Lifecycle::Spawned { .. } | Lifecycle::Discarded),
                "filth {} left {:?}",
                id,
                state
            );
        }
    }
}
