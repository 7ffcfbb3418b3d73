//! Lifecycle configuration with documented constants
//!
//! The configuration is handed to [`World::new`](crate::world::World::new)
//! and lives on the world; nothing in the core reads process-global state.

use serde::{Deserialize, Serialize};

/// Configuration for the lifecycle core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Permit destroying things whose def marks them non-destroyable
    ///
    /// Meant for map teardown tooling and debug actions. Normal play keeps
    /// this off so walls of the map edge and similar stay put.
    pub allow_destroy_non_destroyable: bool,

    /// Seed for the factory's random number generator
    ///
    /// Starting hit points are rolled from this generator, so two worlds
    /// with the same seed and the same sequence of calls agree exactly.
    pub rng_seed: u64,

    /// Edge length of a region in cells
    ///
    /// Region listers bucket things by region. Smaller regions mean fewer
    /// things per bucket and more buckets per large footprint.
    pub region_size: i32,

    /// Battery self-discharge in watts
    pub self_discharge_watts: f32,

    /// Interval between rare ticks
    pub ticks_per_rare: u64,

    /// Interval between long ticks
    pub ticks_per_long: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            allow_destroy_non_destroyable: false,
            rng_seed: 0x5eed,
            region_size: 12,
            self_discharge_watts: 5.0,
            ticks_per_rare: 250,
            ticks_per_long: 2000,
        }
    }
}

impl LifecycleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: LifecycleConfig = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.region_size <= 0 {
            return Err(format!("region_size ({}) must be positive", self.region_size));
        }

        if self.self_discharge_watts < 0.0 {
            return Err("self_discharge_watts must not be negative".into());
        }

        // Long ticks are a multiple of rare ticks so both land on the same tick
        if self.ticks_per_rare == 0 || self.ticks_per_long % self.ticks_per_rare != 0 {
            return Err(format!(
                "ticks_per_long ({}) should be a non-zero multiple of ticks_per_rare ({})",
                self.ticks_per_long, self.ticks_per_rare
            ));
        }

        Ok(())
    }
}
