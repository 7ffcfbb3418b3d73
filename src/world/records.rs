//! Per-thing tallies kept outside the thing itself

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThingRecords {
    /// Damage this thing dealt as an instigator
    pub damage_dealt: f32,
    pub last_battle_tick: Option<Tick>,
    pub last_ingest_tick: Option<Tick>,
}
