//! Saving and loading single things
//!
//! A saved thing never comes back spawned. Loading leaves it unspawned at
//! its saved position; a later pass calls
//! [`World::respawn_after_load`] to re-register it with its map.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::{Rot4, ThingId, INVALID_CELL};
use crate::defs::Tradeability;
use crate::entity::{id_number_from_thing_id, Lifecycle, Thing};

const STATE_UNSPAWNED: i32 = -1;
const STATE_DESTROYED: i32 = -2;
const STATE_DISCARDED: i32 = -3;
const NULL_FACTION: &str = "null";

/// Serialized form of a thing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingRecord {
    pub def: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Map id while spawned, negative sentinels otherwise
    #[serde(default = "unspawned")]
    pub map: i32,
    #[serde(default = "invalid_pos")]
    pub pos: [i32; 2],
    #[serde(default)]
    pub rot: u8,
    /// -1 when the def does not track health
    #[serde(default = "no_health")]
    pub health: i32,
    #[serde(default)]
    pub stack_count: Option<u32>,
    #[serde(default)]
    pub stuff: Option<String>,
    #[serde(default = "null_faction")]
    pub faction: String,
    #[serde(default)]
    pub quest_tags: Vec<String>,
    #[serde(default)]
    pub stored_energy: Option<f32>,
}

fn unspawned() -> i32 {
    STATE_UNSPAWNED
}

fn invalid_pos() -> [i32; 2] {
    [INVALID_CELL.x, INVALID_CELL.y]
}

fn no_health() -> i32 {
    -1
}

fn null_faction() -> String {
    NULL_FACTION.to_string()
}

fn saves_stack_count(thing: &Thing) -> bool {
    thing.def.stack_limit > 1 || (thing.def.is_item() && thing.def.tradeability != Tradeability::None)
}

impl ThingRecord {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl World {
    pub fn save_thing(&mut self, id: ThingId) -> Result<ThingRecord> {
        let thing = self.require(id)?;
        let map = match thing.state {
            Lifecycle::Unspawned => STATE_UNSPAWNED,
            Lifecycle::Spawned { map } => map.0 as i32,
            Lifecycle::Destroyed => STATE_DESTROYED,
            Lifecycle::Discarded => STATE_DISCARDED,
        };
        Ok(ThingRecord {
            def: thing.def.def_name.clone(),
            id: thing.def.has_thing_id_number.then(|| thing.thing_id()),
            map,
            pos: [thing.position.x, thing.position.y],
            rot: thing.rotation.as_int(),
            health: thing.hit_points.unwrap_or(-1),
            stack_count: saves_stack_count(thing).then_some(thing.stack_count),
            stuff: thing.stuff.as_ref().map(|s| s.def_name.clone()),
            faction: thing
                .faction
                .map_or_else(null_faction, |f| f.load_id()),
            quest_tags: thing.quest_tags.clone(),
            stored_energy: thing
                .comps
                .iter()
                .find_map(|c| c.as_battery())
                .map(|b| b.stored_energy()),
        })
    }

    /// Rebuild a thing from its record, always unspawned
    ///
    /// Recoverable problems are corrected and reported: health above max is
    /// clamped, unknown factions become none, and a missing or colliding id
    /// number is replaced with a fresh one.
    pub fn load_thing(&mut self, record: &ThingRecord) -> Result<ThingId> {
        let Some(def) = self.defs.thing(&record.def) else {
            return self.reject(ThingError::UnknownDef(record.def.clone()));
        };
        let stuff = match &record.stuff {
            Some(name) => Some(self.resolve_stuff(name)?),
            None => None,
        };

        let saved_id = if def.has_thing_id_number {
            let parsed = record.id.as_deref().and_then(id_number_from_thing_id);
            if parsed.is_none() {
                let shown = record.id.clone().unwrap_or_default();
                self.diagnostics.error(ThingError::BadThingId(shown));
            }
            parsed.map(ThingId)
        } else {
            None
        };
        let id = match saved_id {
            Some(id) if !self.things.contains_key(&id) => {
                self.id_maker.bump_past(id);
                id
            }
            Some(id) => {
                self.diagnostics
                    .error(ThingError::BadThingId(format!("{} (already in use)", id)));
                self.id_maker.next_id()
            }
            None => self.id_maker.next_id(),
        };

        let mut thing = Thing::new(def, id, stuff);
        thing.state = match record.map {
            STATE_DESTROYED => Lifecycle::Destroyed,
            STATE_DISCARDED => Lifecycle::Discarded,
            _ => Lifecycle::Unspawned,
        };
        thing.position = IVec2::new(record.pos[0], record.pos[1]);
        thing.rotation = Rot4::from_int(record.rot);

        if thing.def.use_hit_points {
            let max = thing.max_hit_points();
            let health = if record.health < 0 { max } else { record.health };
            if health > max {
                self.diagnostics.warning(ThingError::HitPointsOverMax {
                    thing: thing.to_string(),
                    hit_points: health,
                    max,
                });
            }
            thing.hit_points = Some(health.min(max));
        }

        if saves_stack_count(&thing) {
            thing.stack_count = match record.stack_count {
                Some(0) => {
                    self.diagnostics.warning(ThingError::ZeroStackCount(thing.to_string()));
                    1
                }
                count => count.unwrap_or(1),
            };
        }

        if record.faction != NULL_FACTION {
            thing.faction = self.factions.resolve_load_id(&record.faction);
            if thing.faction.is_none() {
                self.diagnostics
                    .warning(ThingError::UnresolvedFaction(record.faction.clone()));
            }
        }

        thing.quest_tags = record.quest_tags.clone();

        if let Some(energy) = record.stored_energy {
            if let Some(battery) = thing.comps.iter_mut().find_map(|c| c.as_battery_mut()) {
                battery.set_stored_energy_direct(energy);
                battery.clamp_to_capacity();
            }
        }

        self.things.insert(id, thing);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LifecycleConfig;
    use crate::defs::{CompProperties, DefDatabase, FloatRange, StuffProperties, ThingCategory, ThingDef};
    use crate::world::DestroyMode;

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

        let mut wall = ThingDef::new("Wall", ThingCategory::Building);
        wall.made_from_stuff = true;
        wall.use_hit_points = true;
        wall.max_hit_points = 300;
        wall.can_have_faction = true;
        defs.add_thing(wall).unwrap();

        let mut battery = ThingDef::new("Battery", ThingCategory::Building);
        battery.comps = vec![CompProperties::Battery {
            stored_energy_max: 600.0,
            efficiency: 0.5,
        }];
        defs.add_thing(battery).unwrap();
        World::new(LifecycleConfig::default(), defs)
    }

    #[test]
    fn test_save_spawned_then_load_unspawned() {
        let mut world = world();
        let map = world.add_map(IVec2::new(10, 10));
        let steel = world.make_stack("Steel", None, 40).unwrap();
        world.spawn(steel, map, IVec2::new(3, 4), false).unwrap();

        let record = world.save_thing(steel).unwrap();
        assert_eq!(record.map, 0);
        assert_eq!(record.id.as_deref(), Some("Steel0"));
        assert_eq!(record.stack_count, Some(40));

        let mut other = self::world();
        let loaded = other.load_thing(&record).unwrap();
        assert_eq!(loaded, steel);
        let thing = other.thing(loaded).unwrap();
        assert_eq!(thing.state(), Lifecycle::Unspawned);
        assert_eq!(thing.position(), IVec2::new(3, 4));
        assert_eq!(thing.stack_count, 40);

        let map = other.add_map(IVec2::new(10, 10));
        other.respawn_after_load(loaded, map).unwrap();
        assert_eq!(other.map(map).unwrap().things_at(IVec2::new(3, 4)), &[loaded]);
    }

    #[test]
    fn test_loaded_ids_are_never_reissued() {
        let mut world = world();
        let mut record = ThingRecord::from_json(r#"{"def": "Steel", "id": "Steel41", "pos": [1, 1]}"#).unwrap();
        assert_eq!(world.load_thing(&record).unwrap(), ThingId(41));
        assert_eq!(world.make_thing("Steel", None).unwrap(), ThingId(42));

        // Same id again collides and gets a fresh one
        record.pos = [2, 2];
        assert_eq!(world.load_thing(&record).unwrap(), ThingId(43));
        assert_eq!(world.diagnostics().errors().count(), 1);
    }

    #[test]
    fn test_health_over_max_is_clamped() {
        let mut world = world();
        let record = ThingRecord::from_json(
            r#"{"def": "Wall", "id": "Wall3", "health": 900, "stuff": "Steel"}"#,
        )
        .unwrap();
        let wall = world.load_thing(&record).unwrap();
        assert_eq!(world.thing(wall).unwrap().hit_points(), Some(300));
        assert!(matches!(
            world.diagnostics().warnings().next(),
            Some(ThingError::HitPointsOverMax { hit_points: 900, max: 300, .. })
        ));
    }

    #[test]
    fn test_unresolved_faction_becomes_none() {
        let mut world = world();
        let colony = world.factions_mut().add("Colony");
        let record = ThingRecord::from_json(
            r#"{"def": "Wall", "id": "Wall3", "stuff": "Steel", "faction": "Faction_0"}"#,
        )
        .unwrap();
        let wall = world.load_thing(&record).unwrap();
        assert_eq!(world.thing(wall).unwrap().faction(), Some(colony));

        let record = ThingRecord::from_json(
            r#"{"def": "Wall", "id": "Wall4", "stuff": "Steel", "faction": "Faction_9"}"#,
        )
        .unwrap();
        let wall = world.load_thing(&record).unwrap();
        assert_eq!(world.thing(wall).unwrap().faction(), None);
        assert!(matches!(
            world.diagnostics().warnings().next(),
            Some(ThingError::UnresolvedFaction(_))
        ));
    }

    #[test]
    fn test_bad_thing_id_gets_fresh_id() {
        let mut world = world();
        let record = ThingRecord::from_json(r#"{"def": "Steel", "id": "Steel"}"#).unwrap();
        let steel = world.load_thing(&record).unwrap();
        assert_eq!(steel, ThingId(0));
        assert!(matches!(
            world.diagnostics().errors().next(),
            Some(ThingError::BadThingId(_))
        ));
    }

    #[test]
    fn test_destroyed_state_survives_round_trip() {
        let mut world = world();
        let steel = world.make_thing("Steel", None).unwrap();
        world.destroy(steel, DestroyMode::Vanish).unwrap();
        let record = world.save_thing(steel).unwrap();
        assert_eq!(record.map, STATE_DESTROYED);

        let mut other = self::world();
        let loaded = other.load_thing(&record).unwrap();
        assert!(other.thing(loaded).unwrap().destroyed());
    }

    #[test]
    fn test_battery_energy_clamped_on_load() {
        let mut world = world();
        let record = ThingRecord::from_json(
            r#"{"def": "Battery", "id": "Battery1", "stored_energy": 900.0}"#,
        )
        .unwrap();
        let battery = world.load_thing(&record).unwrap();
        let stored = world.thing(battery).unwrap().comps()[0]
            .as_battery()
            .unwrap()
            .stored_energy();
        assert_eq!(stored, 600.0);
    }

    #[test]
    fn test_unknown_def_rejected() {
        let mut world = world();
        let record = ThingRecord::from_json(r#"{"def": "Plasteel", "id": "Plasteel1"}"#).unwrap();
        assert_eq!(
            world.load_thing(&record),
            Err(ThingError::UnknownDef("Plasteel".into()))
        );
        assert_eq!(world.thing_count(), 0);
    }

    #[test]
    fn test_non_stuff_stuff_rejected() {
        let mut world = world();
        let record = ThingRecord::from_json(
            r#"{"def": "Wall", "id": "Wall3", "stuff": "Battery"}"#,
        )
        .unwrap();
        assert_eq!(
            world.load_thing(&record),
            Err(ThingError::NotStuff("Battery".into()))
        );
        assert_eq!(world.thing_count(), 0);
    }

    #[test]
    fn test_zero_stack_count_loads_as_one() {
        let mut world = world();
        let record = ThingRecord::from_json(
            r#"{"def": "Steel", "id": "Steel7", "stack_count": 0}"#,
        )
        .unwrap();
        let steel = world.load_thing(&record).unwrap();
        assert_eq!(world.thing(steel).unwrap().stack_count, 1);
        assert!(matches!(
            world.diagnostics().warnings().next(),
            Some(ThingError::ZeroStackCount(_))
        ));
    }
}
