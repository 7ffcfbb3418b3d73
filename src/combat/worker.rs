//! Damage workers: the numeric side of applying a hit.
//!
//! Workers own the life-or-death decision. The pipeline in
//! [`super::pipeline`] only orders what happens around them.

use super::damage::{DamageInfo, DamageResult};
use crate::core::types::ThingId;
use crate::world::World;

pub trait DamageWorker: Send + Sync {
    fn apply(&self, world: &mut World, dinfo: &DamageInfo, thing: ThingId) -> DamageResult;
}

/// Subtracts from hit points and kills at zero
#[derive(Debug, Default, Clone, Copy)]
pub struct HitPointsWorker;

impl DamageWorker for HitPointsWorker {
    fn apply(&self, world: &mut World, dinfo: &DamageInfo, thing: ThingId) -> DamageResult {
        let Some(victim) = world.thing_mut(thing) else {
            return DamageResult::default();
        };
        let Some(hit_points) = victim.hit_points() else {
            return DamageResult::default();
        };

        let amount = dinfo.amount();
        let dealt = amount.min(hit_points as f32).max(0.0);
        let remaining = hit_points - amount.round() as i32;
        victim.set_hit_points(remaining.max(0));

        let mut result = DamageResult {
            total_damage_dealt: dealt,
            destroyed: false,
        };

        if remaining <= 0 {
            result.destroyed = world.kill(thing).is_ok();
        }
        result
    }
}

/// Stuns and similar: never touches hit points
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHarmWorker;

impl DamageWorker for NoHarmWorker {
    fn apply(&self, _world: &mut World, _dinfo: &DamageInfo, _thing: ThingId) -> DamageResult {
        DamageResult::default()
    }
}
