//! Damage events and their outcome.

use std::sync::Arc;

use crate::core::types::ThingId;
use crate::defs::DamageDef;

/// One incoming hit
#[derive(Debug, Clone)]
pub struct DamageInfo {
    pub def: Arc<DamageDef>,
    amount: f32,
    pub instigator: Option<ThingId>,
}

impl DamageInfo {
    pub fn new(def: Arc<DamageDef>, amount: f32) -> Self {
        Self {
            def,
            amount,
            instigator: None,
        }
    }

    pub fn with_instigator(mut self, instigator: ThingId) -> Self {
        self.instigator = Some(instigator);
        self
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount;
    }
}

/// What applying a hit did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageResult {
    pub total_damage_dealt: f32,
    /// The worker destroyed the victim
    pub destroyed: bool,
}

impl DamageResult {
    pub fn is_empty(&self) -> bool {
        self.total_damage_dealt == 0.0 && !self.destroyed
    }
}
