//! Ordering of a single hit

use std::sync::Arc;

use super::damage::{DamageInfo, DamageResult};
use crate::core::error::ThingError;
use crate::core::types::ThingId;
use crate::defs::ThingCategory;
use crate::world::{ThingEvent, World};

impl World {
    /// Apply one hit to `thing`
    ///
    /// Destroyed things and zero-amount hits yield an empty result, negative
    /// amounts are rejected with a diagnostic. Hits a
    /// component absorbs in its pre-hook yield an empty result too and never
    /// reach the worker.
    pub fn take_damage(&mut self, thing: ThingId, mut dinfo: DamageInfo) -> DamageResult {
        let Some(victim) = self.things.get_mut(&thing) else {
            self.diagnostics.error(ThingError::ThingNotFound(thing));
            return DamageResult::default();
        };
        if victim.destroyed() || dinfo.amount() == 0.0 {
            return DamageResult::default();
        }
        if dinfo.amount() < 0.0 || dinfo.amount().is_nan() {
            let err = ThingError::NegativeDamage {
                thing: victim.to_string(),
                amount: dinfo.amount(),
            };
            self.diagnostics.error(err);
            return DamageResult::default();
        }

        if let Some(multiplier) = victim.def.damage_multiplier_for(&dinfo.def.def_name) {
            dinfo.set_amount((dinfo.amount() * multiplier).round());
        }

        for comp in victim.comps.iter_mut() {
            if comp.pre_apply_damage(&mut dinfo) {
                tracing::debug!("{} absorbed {} damage", thing, dinfo.amount());
                return DamageResult::default();
            }
        }

        let spawned_or_parent = self.spawned_or_any_parent_spawned(thing);
        let map_held = self.map_held(thing);

        let worker = self.damage_worker_for(&dinfo.def.def_name);
        let result = worker.apply(self, &dinfo, thing);

        if dinfo.def.harms_health && spawned_or_parent {
            let gone = self.things.get(&thing).map_or(true, |t| t.destroyed());
            if let Some(map) = map_held.and_then(|m| self.maps.get_mut(&m)) {
                map.damage_watcher
                    .notify_damage_taken(thing, result.total_damage_dealt);
                if gone {
                    map.damage_watcher.forget(thing);
                }
            }
        }

        if dinfo.def.external_violence {
            let leavings = Arc::clone(&self.leavings);
            leavings.drop_filth_due_to_damage(self, thing, result.total_damage_dealt);
            self.events.push(ThingEvent::FilthDropped {
                thing,
                damage_dealt: result.total_damage_dealt,
            });

            if let Some(instigator) = dinfo.instigator {
                let is_pawn = self
                    .things
                    .get(&instigator)
                    .map_or(false, |t| t.def.category == ThingCategory::Pawn);
                if is_pawn {
                    let records = self.records.entry(instigator).or_default();
                    records.damage_dealt += result.total_damage_dealt;
                    records.last_battle_tick = Some(self.current_tick);
                }
            }
        }

        if let Some(victim) = self.things.get_mut(&thing) {
            for comp in victim.comps.iter_mut() {
                comp.post_apply_damage(&dinfo, result.total_damage_dealt);
            }
        }

        result
    }
}
