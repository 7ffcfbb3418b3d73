//! Persistence integration tests
//!
//! Saves a populated map to JSON, loads it into a fresh world and respawns
//! everything, then compares what the map indices see.

use glam::IVec2;
use std::path::Path;

use tileworld::core::config::LifecycleConfig;
use tileworld::core::types::{MapId, Rot4, ThingId};
use tileworld::defs::DefDatabase;
use tileworld::entity::Lifecycle;
use tileworld::world::{DestroyMode, ThingRecord, World};

fn load_world() -> World {
    let mut defs = DefDatabase::new();
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/defs");
    defs.load_directory(&path).expect("Should load data/defs");
    World::new(LifecycleConfig::default(), defs)
}

/// Build a small colony and return the map with everything on it
fn populated() -> (World, MapId, Vec<ThingId>) {
    let mut world = load_world();
    let colony = world.factions_mut().add("Colony");
    let map = world.add_map(IVec2::new(20, 20));

    let wall = world.make_thing("Wall", Some("Steel")).unwrap();
    world.set_faction(wall, Some(colony)).unwrap();
    world.spawn(wall, map, IVec2::new(3, 3), false).unwrap();

    let shelf = world.make_thing("Shelf", Some("WoodLog")).unwrap();
    world.spawn(shelf, map, IVec2::new(8, 8), false).unwrap();
    world.set_rotation(shelf, Rot4::East).unwrap();

    let steel = world.make_stack("Steel", None, 42).unwrap();
    world.thing_mut(steel).unwrap().quest_tags = vec!["shipment".into()];
    world.spawn(steel, map, IVec2::new(12, 4), false).unwrap();

    let battery = world.make_thing("Battery", None).unwrap();
    world.spawn(battery, map, IVec2::new(15, 15), false).unwrap();
    world.add_energy(battery, 300.0).unwrap();

    (world, map, vec![wall, shelf, steel, battery])
}

#[test]
fn test_map_survives_save_and_load() {
    let (mut world, map, things) = populated();
    let records: Vec<ThingRecord> = things
        .iter()
        .map(|id| world.save_thing(*id).unwrap())
        .collect();
    let json = serde_json::to_string(&records).unwrap();

    let mut loaded = load_world();
    loaded.factions_mut().add("Colony");
    let new_map = loaded.add_map(IVec2::new(20, 20));
    assert_eq!(new_map, map);

    let records: Vec<ThingRecord> = serde_json::from_str(&json).unwrap();
    let mut respawn = Vec::new();
    for record in &records {
        let id = loaded.load_thing(record).unwrap();
        assert_eq!(loaded.thing(id).unwrap().state(), Lifecycle::Unspawned);
        if record.map >= 0 {
            respawn.push(id);
        }
    }
    for id in &respawn {
        loaded.respawn_after_load(*id, new_map).unwrap();
    }
    assert!(loaded.diagnostics().is_empty());

    for id in &things {
        let before = world.thing(*id).unwrap();
        let after = loaded.thing(*id).unwrap();
        assert_eq!(before.position(), after.position());
        assert_eq!(before.rotation(), after.rotation());
        assert_eq!(before.occupied_rect(), after.occupied_rect());
        assert_eq!(before.hit_points(), after.hit_points());
        assert_eq!(before.stack_count, after.stack_count);
        assert_eq!(before.faction(), after.faction());
        assert_eq!(before.quest_tags, after.quest_tags);
        assert_eq!(
            world.map(map).unwrap().indices_containing(*id),
            loaded.map(new_map).unwrap().indices_containing(*id),
        );
    }

    let battery = things[3];
    let energy = |w: &World| {
        w.thing(battery).unwrap().comps()[0]
            .as_battery()
            .unwrap()
            .stored_energy()
    };
    assert_eq!(energy(&world), energy(&loaded));
}

#[test]
fn test_respawn_after_load_sends_no_quest_signal() {
    let (mut world, _, things) = populated();
    let steel = things[2];
    let record = world.save_thing(steel).unwrap();

    let mut loaded = load_world();
    let map = loaded.add_map(IVec2::new(20, 20));
    let id = loaded.load_thing(&record).unwrap();
    loaded.respawn_after_load(id, map).unwrap();

    assert!(loaded.signals().sent().is_empty());
    assert!(loaded.map(map).unwrap().lister_mergeables.contains(id));
}

#[test]
fn test_loaded_ids_do_not_collide_with_new_things() {
    let (mut world, _, things) = populated();
    let records: Vec<ThingRecord> = things
        .iter()
        .map(|id| world.save_thing(*id).unwrap())
        .collect();

    let mut loaded = load_world();
    for record in &records {
        loaded.load_thing(record).unwrap();
    }
    let fresh = loaded.make_thing("Steel", None).unwrap();
    assert!(!things.contains(&fresh));
    assert!(fresh.0 > things.iter().map(|t| t.0).max().unwrap());
}

#[test]
fn test_discarded_things_save_their_state() {
    let mut world = load_world();
    let filth = world.make_thing("Filth_Blood", None).unwrap();
    world.destroy(filth, DestroyMode::Vanish).unwrap();
    let record = world.save_thing(filth).unwrap();
    assert_eq!(record.map, -3);

    let json = record.to_json().unwrap();
    let mut loaded = load_world();
    let id = loaded.load_thing(&ThingRecord::from_json(&json).unwrap()).unwrap();
    assert!(loaded.thing(id).unwrap().discarded());
}
