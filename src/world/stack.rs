//! Stack merge, split and consumption

use std::sync::Arc;

use super::events::ThingEvent;
use super::lifecycle::DestroyMode;
use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::ThingId;
use crate::defs::ThingCategory;

impl World {
    /// Whether `a` and `b` may merge into one stack
    ///
    /// Both must be live items of the same def made from the same stuff.
    /// Symmetric; a thing never stacks with itself.
    pub fn can_stack_with(&self, a: ThingId, b: ThingId) -> bool {
        if a == b {
            return false;
        }
        let (Some(a), Some(b)) = (self.things.get(&a), self.things.get(&b)) else {
            return false;
        };
        !a.destroyed()
            && !b.destroyed()
            && a.def.category == ThingCategory::Item
            && a.def == b.def
            && a.stuff == b.stuff
    }

    /// Move as much of `other` into `into` as fits
    ///
    /// With `respect_limit` the target never exceeds its stack limit, without
    /// it the target stops at the largest representable count. The
    /// target's hit points become the count-weighted average of both stacks,
    /// rounded up. Returns true when `other` was used up and destroyed.
    pub fn try_absorb_stack(&mut self, into: ThingId, other: ThingId, respect_limit: bool) -> bool {
        if !self.can_stack_with(into, other) {
            let name = |id: ThingId| {
                self.things
                    .get(&id)
                    .map_or_else(|| format!("{:?}", id), |t| t.to_string())
            };
            let error = ThingError::CannotStack {
                a: name(into),
                b: name(other),
            };
            self.diagnostics.warning(error);
            return false;
        }

        let (Some(target), Some(source)) = (self.things.get(&into), self.things.get(&other)) else {
            return false;
        };
        let limit = target.def.stack_limit;
        let available = source.stack_count;
        let room = if respect_limit {
            limit.saturating_sub(target.stack_count)
        } else {
            u32::MAX - target.stack_count
        };
        let taken = available.min(room);
        let merged_count = target.stack_count.saturating_add(taken);

        let merged_hit_points = match (target.hit_points, source.hit_points) {
            (Some(mine), Some(theirs)) if merged_count > 0 => {
                let total = mine as f32 * target.stack_count as f32 + theirs as f32 * taken as f32;
                Some((total / merged_count as f32).ceil() as i32)
            }
            (mine, _) => mine,
        };

        let target_map = target.map();
        let source_map = source.map();

        let mut target_count = 0;
        if let Some(target) = self.things.get_mut(&into) {
            target.hit_points = merged_hit_points;
            target.stack_count = merged_count;
            target_count = target.stack_count;
        }
        let mut remaining = 0;
        if let Some(source) = self.things.get_mut(&other) {
            source.stack_count -= taken;
            remaining = source.stack_count;
        }

        if let Some(map) = target_map.and_then(|m| self.maps.get_mut(&m)) {
            map.lister_mergeables
                .notify_stack_changed(into, target_count, limit);
        }
        if remaining > 0 && taken > 0 {
            if let Some(map) = source_map.and_then(|m| self.maps.get_mut(&m)) {
                map.lister_mergeables
                    .notify_stack_changed(other, remaining, limit);
            }
        }

        self.events.push(ThingEvent::StackAbsorbed {
            into,
            from: other,
            count: taken,
        });

        if remaining == 0 {
            // A failed destroy was already recorded; the stack is still gone
            let _ = self.destroy(other, DestroyMode::Vanish);
            return true;
        }
        false
    }

    /// Split `count` off into a new unspawned stack
    ///
    /// Asking for the whole stack (or more, which is reported) hands back the
    /// thing itself after despawning it and taking it out of its holder. The
    /// new piece copies hit points but not faction or quest tags.
    pub fn split_off(&mut self, id: ThingId, count: u32) -> Result<ThingId> {
        let thing = self.require(id)?;
        let name = thing.to_string();
        if thing.destroyed() {
            return self.reject(ThingError::SplitDestroyed(name));
        }
        if count == 0 {
            return self.reject(ThingError::InvalidCount { thing: name, count });
        }

        let available = thing.stack_count;
        if count >= available {
            let spawned = thing.spawned();
            let held = thing.holding_owner.is_some();
            if count > available {
                self.diagnostics.error(ThingError::SplitOverStack {
                    thing: name,
                    requested: count,
                    available,
                });
            }
            if spawned {
                self.despawn(id, DestroyMode::Vanish)?;
            }
            if held {
                self.remove_from_holder(id);
            }
            return Ok(id);
        }

        let def = Arc::clone(&thing.def);
        let stuff = thing.stuff.clone();
        let hit_points = thing.hit_points;
        let map = thing.map();

        let piece = self.make_thing_from_def(def, stuff)?;
        if let Some(new) = self.things.get_mut(&piece) {
            new.stack_count = count;
            new.hit_points = hit_points;
        }
        let mut left = 0;
        let mut limit = 0;
        if let Some(thing) = self.things.get_mut(&id) {
            thing.stack_count -= count;
            left = thing.stack_count;
            limit = thing.def.stack_limit;
        }
        if let Some(map) = map.and_then(|m| self.maps.get_mut(&m)) {
            map.lister_mergeables.notify_stack_changed(id, left, limit);
        }

        self.events.push(ThingEvent::StackSplit {
            from: id,
            piece,
            count,
        });
        Ok(piece)
    }

    /// Consume part of an ingestible stack; returns the nutrition taken
    pub fn ingested(&mut self, id: ThingId, ingester: ThingId, nutrition_wanted: f32) -> Result<f32> {
        let ingester_name = self
            .things
            .get(&ingester)
            .map_or_else(|| format!("{:?}", ingester), |t| t.to_string());
        let thing = self.require(id)?;
        let props = match &thing.def.ingestible {
            Some(props) if !thing.destroyed() && thing.stack_count > 0 => props.clone(),
            _ => {
                let error = ThingError::NotIngestible {
                    ingester: ingester_name,
                    thing: thing.to_string(),
                };
                return self.reject(error);
            }
        };

        let max = props.max_num_to_ingest_at_once.min(thing.stack_count).max(1);
        let wanted = if props.nutrition > 0.0 {
            (nutrition_wanted / props.nutrition).ceil() as u32
        } else {
            max
        };
        let taken = wanted.clamp(1, max);
        let whole_stack = taken == thing.stack_count;

        if whole_stack {
            self.destroy(id, DestroyMode::Vanish)?;
        } else {
            let piece = self.split_off(id, taken)?;
            self.destroy(piece, DestroyMode::Vanish)?;
            if !self.things.get(&piece).map_or(true, |t| t.discarded()) {
                self.discard(piece)?;
            }
        }

        self.records.entry(ingester).or_default().last_ingest_tick = Some(self.current_tick);
        Ok(taken as f32 * props.nutrition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LifecycleConfig;
    use crate::defs::{DefDatabase, FloatRange, IngestibleProperties, StuffProperties, ThingDef};
    use glam::IVec2;

    fn world() -> World {
        let mut defs = DefDatabase::new();
        let mut steel = ThingDef::new("Steel", ThingCategory::Item);
        steel.stack_limit = 75;
        steel.use_hit_points = true;
        steel.starting_hp_range = FloatRange::new(1.0, 1.0);
        steel.stuff_props = Some(StuffProperties {
            color: [0.6, 0.6, 0.7, 1.0],
            smeltable: true,
            max_hit_points_factor: 1.0,
        });
        defs.add_thing(steel).unwrap();

        let mut wood = ThingDef::new("Wood", ThingCategory::Item);
        wood.stack_limit = 75;
        wood.stuff_props = Some(StuffProperties {
            color: [0.5, 0.3, 0.1, 1.0],
            smeltable: false,
            max_hit_points_factor: 0.6,
        });
        defs.add_thing(wood).unwrap();

        let mut chair = ThingDef::new("Chair", ThingCategory::Item);
        chair.made_from_stuff = true;
        chair.stack_limit = 5;
        defs.add_thing(chair).unwrap();

        let mut meal = ThingDef::new("Meal", ThingCategory::Item);
        meal.stack_limit = 10;
        meal.ingestible = Some(IngestibleProperties {
            nutrition: 0.9,
            max_num_to_ingest_at_once: 2,
        });
        defs.add_thing(meal).unwrap();

        let mut jelly = ThingDef::new("Jelly", ThingCategory::Item);
        jelly.stack_limit = 20;
        jelly.discard_on_destroyed = true;
        jelly.ingestible = Some(IngestibleProperties {
            nutrition: 0.5,
            max_num_to_ingest_at_once: 4,
        });
        defs.add_thing(jelly).unwrap();

        World::new(LifecycleConfig::default(), defs)
    }

    #[test]
    fn test_can_stack_with() {
        let mut world = world();
        let a = world.make_thing("Steel", None).unwrap();
        let b = world.make_thing("Steel", None).unwrap();
        let wood = world.make_thing("Wood", None).unwrap();
        let steel_chair = world.make_thing("Chair", Some("Steel")).unwrap();
        let wood_chair = world.make_thing("Chair", Some("Wood")).unwrap();

        assert!(world.can_stack_with(a, b));
        assert!(world.can_stack_with(b, a));
        assert!(!world.can_stack_with(a, a));
        assert!(!world.can_stack_with(a, wood));
        assert!(!world.can_stack_with(steel_chair, wood_chair));

        world.destroy(b, DestroyMode::Vanish).unwrap();
        assert!(!world.can_stack_with(a, b));
    }

    #[test]
    fn test_absorb_respects_limit() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let a = world.make_stack("Steel", None, 50).unwrap();
        let b = world.make_stack("Steel", None, 40).unwrap();
        world.spawn(a, map, IVec2::new(1, 1), false).unwrap();

        assert!(!world.try_absorb_stack(a, b, true));
        assert_eq!(world.thing(a).unwrap().stack_count, 75);
        assert_eq!(world.thing(b).unwrap().stack_count, 15);
        assert!(!world.map(map).unwrap().lister_mergeables.contains(a));
        assert_eq!(world.map(map).unwrap().lister_mergeables.stack_changes(), 1);
    }

    #[test]
    fn test_absorb_everything_destroys_source() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let a = world.make_stack("Steel", None, 10).unwrap();
        let b = world.make_stack("Steel", None, 20).unwrap();
        world.spawn(a, map, IVec2::new(1, 1), false).unwrap();
        world.spawn(b, map, IVec2::new(2, 1), false).unwrap();

        assert!(world.try_absorb_stack(a, b, true));
        assert_eq!(world.thing(a).unwrap().stack_count, 30);
        assert!(world.thing(b).unwrap().destroyed());
        assert!(world.map(map).unwrap().indices_containing(b).is_empty());
    }

    #[test]
    fn test_absorb_without_limit() {
        let mut world = world();
        let a = world.make_stack("Steel", None, 70).unwrap();
        let b = world.make_stack("Steel", None, 30).unwrap();
        assert!(world.try_absorb_stack(a, b, false));
        assert_eq!(world.thing(a).unwrap().stack_count, 100);
    }

    #[test]
    fn test_absorb_without_limit_stops_at_max_count() {
        let mut world = world();
        let a = world.make_stack("Wood", None, 1).unwrap();
        let b = world.make_stack("Wood", None, 10).unwrap();
        world.thing_mut(a).unwrap().stack_count = u32::MAX - 4;

        assert!(!world.try_absorb_stack(a, b, false));
        assert_eq!(world.thing(a).unwrap().stack_count, u32::MAX);
        assert_eq!(world.thing(b).unwrap().stack_count, 6);
        assert!(!world.thing(b).unwrap().destroyed());
    }

    #[test]
    fn test_absorb_averages_hit_points() {
        let mut world = world();
        let a = world.make_stack("Steel", None, 10).unwrap();
        let b = world.make_stack("Steel", None, 5).unwrap();
        world.thing_mut(a).unwrap().set_hit_points(100);
        world.thing_mut(b).unwrap().set_hit_points(51);

        world.try_absorb_stack(a, b, true);
        // (100 * 10 + 51 * 5) / 15 = 83.67
        assert_eq!(world.thing(a).unwrap().hit_points(), Some(84));
    }

    #[test]
    fn test_absorb_incompatible_warns() {
        let mut world = world();
        let a = world.make_stack("Steel", None, 10).unwrap();
        let wood = world.make_stack("Wood", None, 10).unwrap();
        assert!(!world.try_absorb_stack(a, wood, true));
        assert_eq!(world.thing(a).unwrap().stack_count, 10);
        assert_eq!(world.diagnostics().warnings().count(), 1);
    }

    #[test]
    fn test_split_off_part() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let a = world.make_stack("Steel", None, 75).unwrap();
        world.spawn(a, map, IVec2::new(1, 1), false).unwrap();
        world.thing_mut(a).unwrap().set_hit_points(40);

        let piece = world.split_off(a, 25).unwrap();
        assert_ne!(piece, a);
        assert_eq!(world.thing(a).unwrap().stack_count, 50);
        let new = world.thing(piece).unwrap();
        assert_eq!(new.stack_count, 25);
        assert_eq!(new.hit_points(), Some(40));
        assert!(!new.spawned());
        assert!(world.map(map).unwrap().lister_mergeables.contains(a));
    }

    #[test]
    fn test_split_off_whole_stack_returns_self() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let a = world.make_stack("Steel", None, 30).unwrap();
        world.spawn(a, map, IVec2::new(1, 1), false).unwrap();

        assert_eq!(world.split_off(a, 30), Ok(a));
        assert!(!world.thing(a).unwrap().spawned());
        assert!(world.diagnostics().is_empty());
    }

    #[test]
    fn test_split_off_too_many_is_reported() {
        let mut world = world();
        let a = world.make_stack("Steel", None, 30).unwrap();
        assert_eq!(world.split_off(a, 31), Ok(a));
        assert!(matches!(
            world.diagnostics().errors().next(),
            Some(ThingError::SplitOverStack { requested: 31, available: 30, .. })
        ));
    }

    #[test]
    fn test_split_off_zero_is_rejected() {
        let mut world = world();
        let a = world.make_stack("Steel", None, 30).unwrap();
        assert!(matches!(
            world.split_off(a, 0),
            Err(ThingError::InvalidCount { count: 0, .. })
        ));
        assert_eq!(world.thing(a).unwrap().stack_count, 30);
        assert_eq!(world.thing_count(), 1);
    }

    #[test]
    fn test_split_off_held_stack_leaves_holder() {
        let mut world = world();
        let holder = world.create_holder(crate::entity::HolderParent::None);
        let a = world.make_stack("Steel", None, 30).unwrap();
        world.try_add_to_holder(holder, a).unwrap();

        assert_eq!(world.split_off(a, 30), Ok(a));
        assert!(world.holder(holder).unwrap().is_empty());
        assert_eq!(world.thing(a).unwrap().holding_owner(), None);
    }

    #[test]
    fn test_ingest_part_of_stack() {
        let mut world = world();
        let meals = world.make_stack("Meal", None, 5).unwrap();
        let eater = world.make_thing("Steel", None).unwrap();

        let nutrition = world.ingested(meals, eater, 1.0).unwrap();
        assert!((nutrition - 1.8).abs() < 1e-5);
        assert_eq!(world.thing(meals).unwrap().stack_count, 3);
        assert_eq!(world.records(eater).unwrap().last_ingest_tick, Some(0));
    }

    #[test]
    fn test_ingest_last_unit_destroys() {
        let mut world = world();
        let meal = world.make_thing("Meal", None).unwrap();
        let eater = world.make_thing("Steel", None).unwrap();
        world.ingested(meal, eater, 5.0).unwrap();
        assert!(world.thing(meal).unwrap().destroyed());

        assert!(matches!(
            world.ingested(meal, eater, 1.0),
            Err(ThingError::NotIngestible { .. })
        ));
    }

    #[test]
    fn test_ingest_part_of_self_discarding_stack() {
        let mut world = world();
        let jelly = world.make_stack("Jelly", None, 10).unwrap();
        let eater = world.make_thing("Steel", None).unwrap();

        let nutrition = world.ingested(jelly, eater, 1.0).unwrap();
        assert_eq!(nutrition, 1.0);
        assert_eq!(world.thing(jelly).unwrap().stack_count, 8);
        assert!(world.diagnostics().is_empty());
        let discarded = world
            .events()
            .iter()
            .filter(|e| matches!(e, ThingEvent::Discarded { .. }))
            .count();
        assert_eq!(discarded, 1);
    }
}
