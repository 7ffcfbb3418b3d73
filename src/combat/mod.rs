//! Damage intake
//!
//! A hit flows through [`World::take_damage`](crate::world::World::take_damage):
//! multipliers, component pre-hooks, the damage worker, the map's damage
//! watcher, filth and attribution, then component post-hooks.

pub mod damage;
pub mod pipeline;
pub mod worker;

pub use damage::{DamageInfo, DamageResult};
pub use worker::{DamageWorker, HitPointsWorker, NoHarmWorker};
