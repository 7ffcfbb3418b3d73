//! Damage type definitions.

use serde::{Deserialize, Serialize};

/// Immutable description of a damage type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDef {
    pub def_name: String,
    /// Damage of this type is tracked by the map's damage watcher
    #[serde(default = "yes")]
    pub harms_health: bool,
    /// Inflicted from outside (weapons, fire) rather than e.g. deterioration
    #[serde(default = "yes")]
    pub external_violence: bool,
}

impl DamageDef {
    pub fn new(def_name: impl Into<String>) -> Self {
        Self {
            def_name: def_name.into(),
            harms_health: true,
            external_violence: true,
        }
    }
}

fn yes() -> bool {
    true
}
