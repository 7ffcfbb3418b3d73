//! Tileworld - Demo Entry Point
//!
//! Loads the defs under `data/defs`, builds a small map and walks a handful
//! of things through their lifecycle, printing what the indices see.

use std::path::Path;
use std::sync::Arc;

use glam::IVec2;
use tileworld::combat::DamageInfo;
use tileworld::core::config::LifecycleConfig;
use tileworld::defs::DefDatabase;
use tileworld::world::{DestroyMode, FilthLeavings, World};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default filter
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tileworld=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Tileworld starting...");

    let config = match std::fs::read_to_string("data/lifecycle.toml") {
        Ok(content) => LifecycleConfig::from_toml_str(&content)?,
        Err(_) => {
            tracing::warn!("data/lifecycle.toml not found - using default settings");
            LifecycleConfig::default()
        }
    };
    config.validate()?;

    let mut defs = DefDatabase::new();
    let loaded = defs.load_directory(Path::new("data/defs"))?;
    tracing::info!("Loaded {} defs", loaded);

    let mut world = World::new(config, defs);
    world.set_leavings_maker(Arc::new(FilthLeavings::new("Filth_Blood", 10.0)));
    let colony = world.factions_mut().add("Colony");
    let map = world.add_map(IVec2::new(32, 32));

    // Stockpile: two steel stacks merging against the stack limit
    let steel = world.make_stack("Steel", None, 50)?;
    let delivery = world.make_stack("Steel", None, 40)?;
    world.spawn(steel, map, IVec2::new(4, 4), false)?;
    world.spawn(delivery, map, IVec2::new(5, 4), false)?;
    let used_up = world.try_absorb_stack(steel, delivery, true);
    println!(
        "Merged steel: {} (delivery used up: {}, left over: {})",
        world.thing(steel).map(|t| t.label()).unwrap_or_default(),
        used_up,
        world.thing(delivery).map_or(0, |t| t.stack_count)
    );

    let hauled = world.split_off(steel, 20)?;
    world.spawn(hauled, map, IVec2::new(10, 10), false)?;
    println!("Split off {} into {}", 20, hauled);

    // A wall to shoot at
    let wall = world.make_thing("Wall", Some("Steel"))?;
    world.set_faction(wall, Some(colony))?;
    world.spawn(wall, map, IVec2::new(12, 12), false)?;

    let colonist = world.make_thing("Colonist", None)?;
    world.spawn(colonist, map, IVec2::new(14, 12), false)?;

    let cut = world.defs().damage("Cut");
    if let Some(cut) = cut {
        for _ in 0..4 {
            let dinfo = DamageInfo::new(cut.clone(), 90.0).with_instigator(colonist);
            let result = world.take_damage(wall, dinfo);
            println!(
                "Wall took {} damage, hp now {:?}, destroyed: {}",
                result.total_damage_dealt,
                world.thing(wall).and_then(|t| t.hit_points()),
                result.destroyed
            );
            if result.destroyed {
                break;
            }
        }
    }

    // Battery through a few ticks
    let battery = world.make_thing("Battery", None)?;
    world.spawn(battery, map, IVec2::new(20, 20), false)?;
    world.add_energy(battery, 400.0)?;
    for _ in 0..60 {
        world.tick();
    }

    world.despawn(hauled, DestroyMode::Vanish)?;

    for event in world.take_events() {
        tracing::debug!("{:?}", event);
    }

    if let Some(m) = world.map(map) {
        println!();
        println!("=== MAP {:?} ===", map);
        println!("Spawned things: {}", m.spawned_things.len());
        println!("Mergeable stacks: {:?}", m.lister_mergeables.things());
        println!("Path cost recalculations: {}", m.path_grid.recalculations());
        println!("Damage watched: {}", m.damage_watcher.total());
    }
    if let Some(records) = world.records(colonist) {
        println!("Colonist dealt {} damage", records.damage_dealt);
    }
    println!(
        "Diagnostics: {} errors, {} warnings",
        world.diagnostics().errors().count(),
        world.diagnostics().warnings().count()
    );

    world.remove_map(map)?;
    tracing::info!("Tileworld finished at tick {}", world.current_tick);
    Ok(())
}
