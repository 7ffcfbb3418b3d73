//! The world: owns every thing, map and holder
//!
//! Things live in one arena keyed by `ThingId`. Maps, holders and the
//! managers below only store ids, so every operation that moves a thing
//! between indices goes through `World` and keeps them in sync.

pub mod events;
pub mod factions;
pub mod holders;
pub mod leavings;
pub mod lifecycle;
pub mod persistence;
pub mod position;
pub mod power;
pub mod records;
pub mod signals;
pub mod stack;
pub mod ticks;

use ahash::AHashMap;
use glam::IVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::combat::{DamageWorker, HitPointsWorker};
use crate::core::config::LifecycleConfig;
use crate::core::diagnostics::Diagnostics;
use crate::core::error::{Result, ThingError};
use crate::core::types::{HolderId, MapId, ThingId, Tick};
use crate::defs::{DefDatabase, ThingDef};
use crate::entity::maker::roll_starting_hit_points;
use crate::entity::{Thing, ThingIdMaker, ThingOwner};
use crate::map::Map;

pub use events::ThingEvent;
pub use factions::{Faction, FactionManager};
pub use leavings::{FilthLeavings, LeavingsMaker, NoLeavings};
pub use lifecycle::DestroyMode;
pub use persistence::ThingRecord;
pub use records::ThingRecords;
pub use signals::{Signal, SignalManager};
pub use ticks::TickManager;

/// The simulation world
pub struct World {
    pub(crate) config: LifecycleConfig,
    pub current_tick: Tick,
    pub(crate) defs: DefDatabase,
    pub(crate) things: AHashMap<ThingId, Thing>,
    pub(crate) maps: AHashMap<MapId, Map>,
    next_map: u32,
    pub(crate) holders: AHashMap<HolderId, ThingOwner>,
    next_holder: u32,
    pub(crate) factions: FactionManager,
    pub(crate) tick_manager: TickManager,
    pub(crate) signals: SignalManager,
    pub(crate) id_maker: ThingIdMaker,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) records: AHashMap<ThingId, ThingRecords>,
    pub(crate) leavings: Arc<dyn LeavingsMaker>,
    damage_workers: AHashMap<String, Arc<dyn DamageWorker>>,
    default_damage_worker: Arc<dyn DamageWorker>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) events: Vec<ThingEvent>,
}

impl World {
    pub fn new(config: LifecycleConfig, defs: DefDatabase) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            current_tick: 0,
            defs,
            things: AHashMap::new(),
            maps: AHashMap::new(),
            next_map: 0,
            holders: AHashMap::new(),
            next_holder: 0,
            factions: FactionManager::default(),
            tick_manager: TickManager::default(),
            signals: SignalManager::default(),
            id_maker: ThingIdMaker::new(),
            rng,
            records: AHashMap::new(),
            leavings: Arc::new(NoLeavings),
            damage_workers: AHashMap::new(),
            default_damage_worker: Arc::new(HitPointsWorker),
            diagnostics: Diagnostics::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn defs(&self) -> &DefDatabase {
        &self.defs
    }

    pub fn set_leavings_maker(&mut self, leavings: Arc<dyn LeavingsMaker>) {
        self.leavings = leavings;
    }

    /// Route hits of `damage_def` through `worker` instead of the hit points worker
    pub fn set_damage_worker(&mut self, damage_def: &str, worker: Arc<dyn DamageWorker>) {
        self.damage_workers.insert(damage_def.to_string(), worker);
    }

    pub(crate) fn damage_worker_for(&self, damage_def: &str) -> Arc<dyn DamageWorker> {
        self.damage_workers
            .get(damage_def)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_damage_worker))
    }

    // ------------------------------------------------------------------
    // Things
    // ------------------------------------------------------------------

    /// Make a new unspawned thing from def names
    pub fn make_thing(&mut self, def_name: &str, stuff: Option<&str>) -> Result<ThingId> {
        let Some(def) = self.defs.thing(def_name) else {
            return self.reject(ThingError::UnknownDef(def_name.to_string()));
        };
        let stuff = match stuff {
            Some(name) => Some(self.resolve_stuff(name)?),
            None => None,
        };
        self.make_thing_from_def(def, stuff)
    }

    /// Make a new unspawned thing
    ///
    /// Stuff given to a def not made from stuff is dropped with a warning.
    /// Stuff that has no stuff properties is rejected.
    pub fn make_thing_from_def(
        &mut self,
        def: Arc<ThingDef>,
        stuff: Option<Arc<ThingDef>>,
    ) -> Result<ThingId> {
        let stuff = match stuff {
            Some(stuff) if !def.made_from_stuff => {
                self.diagnostics.warning(ThingError::UnexpectedStuff {
                    def: def.def_name.clone(),
                    stuff: stuff.def_name.clone(),
                });
                None
            }
            None if def.made_from_stuff => {
                return self.reject(ThingError::MissingStuff {
                    def: def.def_name.clone(),
                });
            }
            Some(stuff) if !stuff.is_stuff() => {
                return self.reject(ThingError::NotStuff(stuff.def_name.clone()));
            }
            stuff => stuff,
        };

        let id = self.id_maker.next_id();
        let mut thing = Thing::new(def, id, stuff);
        thing.hit_points = roll_starting_hit_points(&thing, &mut self.rng);
        self.things.insert(id, thing);
        Ok(id)
    }

    /// Make a stack of `count`; counts above the limit are clamped at spawn
    pub fn make_stack(&mut self, def_name: &str, stuff: Option<&str>, count: u32) -> Result<ThingId> {
        if count == 0 {
            return self.reject(ThingError::InvalidCount {
                thing: def_name.to_string(),
                count,
            });
        }
        let id = self.make_thing(def_name, stuff)?;
        if let Some(thing) = self.things.get_mut(&id) {
            thing.stack_count = count;
        }
        Ok(id)
    }

    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.things.get(&id)
    }

    /// Direct access; changing position, rotation or state here bypasses the indices
    pub fn thing_mut(&mut self, id: ThingId) -> Option<&mut Thing> {
        self.things.get_mut(&id)
    }

    pub fn thing_count(&self) -> usize {
        self.things.len()
    }

    /// All thing ids in id order
    pub fn thing_ids(&self) -> Vec<ThingId> {
        let mut ids: Vec<_> = self.things.keys().copied().collect();
        ids.sort();
        ids
    }

    // ------------------------------------------------------------------
    // Maps
    // ------------------------------------------------------------------

    pub fn add_map(&mut self, size: IVec2) -> MapId {
        let id = MapId(self.next_map);
        self.next_map += 1;
        self.maps
            .insert(id, Map::new(id, size, self.config.region_size));
        tracing::debug!("Added map {:?} of size {}x{}", id, size.x, size.y);
        id
    }

    pub fn map(&self, id: MapId) -> Option<&Map> {
        self.maps.get(&id)
    }

    /// Direct access for reservations and designations
    pub fn map_mut(&mut self, id: MapId) -> Option<&mut Map> {
        self.maps.get_mut(&id)
    }

    pub fn map_ids(&self) -> Vec<MapId> {
        let mut ids: Vec<_> = self.maps.keys().copied().collect();
        ids.sort();
        ids
    }

    // ------------------------------------------------------------------
    // Holders
    // ------------------------------------------------------------------

    pub(crate) fn next_holder_id(&mut self) -> HolderId {
        let id = HolderId(self.next_holder);
        self.next_holder += 1;
        id
    }

    pub fn holder(&self, id: HolderId) -> Option<&ThingOwner> {
        self.holders.get(&id)
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn events(&self) -> &[ThingEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ThingEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn records(&self, thing: ThingId) -> Option<&ThingRecords> {
        self.records.get(&thing)
    }

    pub fn factions(&self) -> &FactionManager {
        &self.factions
    }

    pub fn factions_mut(&mut self) -> &mut FactionManager {
        &mut self.factions
    }

    pub fn tick_manager(&self) -> &TickManager {
        &self.tick_manager
    }

    pub fn signals(&self) -> &SignalManager {
        &self.signals
    }

    /// Record `error` and return it
    /// Look up a def to make things from, recording a diagnostic when it is
    /// unknown or has no stuff properties
    pub(crate) fn resolve_stuff(&mut self, name: &str) -> Result<Arc<ThingDef>> {
        match self.defs.stuff(name) {
            Ok(stuff) => Ok(stuff),
            Err(_) if self.defs.thing(name).is_none() => {
                self.reject(ThingError::UnknownDef(name.to_string()))
            }
            Err(_) => self.reject(ThingError::NotStuff(name.to_string())),
        }
    }

    pub(crate) fn reject<T>(&mut self, error: ThingError) -> Result<T> {
        self.diagnostics.error(error.clone());
        Err(error)
    }

    /// Look up a thing, recording a diagnostic when it is missing
    pub(crate) fn require(&mut self, id: ThingId) -> Result<&Thing> {
        if self.things.contains_key(&id) {
            self.things.get(&id).ok_or(ThingError::ThingNotFound(id))
        } else {
            self.reject(ThingError::ThingNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{FloatRange, StuffProperties, ThingCategory};

    fn defs() -> DefDatabase {
        let mut defs = DefDatabase::new();
        let mut steel = ThingDef::new("Steel", ThingCategory::Item);
        steel.stack_limit = 75;
        steel.stuff_props = Some(StuffProperties {
            color: [0.6, 0.6, 0.7, 1.0],
            smeltable: true,
            max_hit_points_factor: 1.0,
        });
        defs.add_thing(steel).unwrap();

        let mut wall = ThingDef::new("Wall", ThingCategory::Building);
        wall.made_from_stuff = true;
        wall.use_hit_points = true;
        wall.starting_hp_range = FloatRange::new(0.2, 0.9);
        defs.add_thing(wall).unwrap();
        defs
    }

    #[test]
    fn test_make_thing_assigns_sequential_ids() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        let a = world.make_thing("Steel", None).unwrap();
        let b = world.make_thing("Steel", None).unwrap();
        assert_eq!(b.0, a.0 + 1);
        assert_eq!(world.thing_count(), 2);
    }

    #[test]
    fn test_make_thing_requires_stuff() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        assert_eq!(
            world.make_thing("Wall", None),
            Err(ThingError::MissingStuff { def: "Wall".into() })
        );
        assert_eq!(world.diagnostics().errors().count(), 1);

        let wall = world.make_thing("Wall", Some("Steel")).unwrap();
        assert_eq!(world.thing(wall).unwrap().stuff().unwrap().def_name, "Steel");
    }

    #[test]
    fn test_non_stuff_def_rejected_as_stuff() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        let before = world.thing_count();
        assert_eq!(
            world.make_thing("Wall", Some("Wall")),
            Err(ThingError::NotStuff("Wall".into()))
        );
        assert_eq!(world.thing_count(), before);
        assert_eq!(world.diagnostics().errors().count(), 1);
    }

    #[test]
    fn test_unexpected_stuff_is_dropped() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        let steel = world.make_thing("Steel", Some("Steel")).unwrap();
        assert!(world.thing(steel).unwrap().stuff().is_none());
        assert_eq!(world.diagnostics().warnings().count(), 1);
    }

    #[test]
    fn test_empty_stack_rejected() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        assert_eq!(
            world.make_stack("Steel", None, 0),
            Err(ThingError::InvalidCount { thing: "Steel".into(), count: 0 })
        );
        assert_eq!(world.thing_count(), 0);
    }

    #[test]
    fn test_unknown_def() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        assert_eq!(
            world.make_thing("Plasteel", None),
            Err(ThingError::UnknownDef("Plasteel".into()))
        );
    }

    #[test]
    fn test_same_seed_same_hit_points() {
        let roll = |seed| {
            let mut config = LifecycleConfig::default();
            config.rng_seed = seed;
            let mut world = World::new(config, defs());
            (0..5)
                .map(|_| {
                    let id = world.make_thing("Wall", Some("Steel")).unwrap();
                    world.thing(id).unwrap().hit_points().unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(roll(11), roll(11));
    }

    #[test]
    fn test_map_ids_are_stable() {
        let mut world = World::new(LifecycleConfig::default(), defs());
        let a = world.add_map(IVec2::new(10, 10));
        let b = world.add_map(IVec2::new(10, 10));
        world.remove_map(a).unwrap();
        assert_eq!(world.map_ids(), vec![b]);
        let c = world.add_map(IVec2::new(4, 4));
        assert_ne!(c, a);
    }
}
