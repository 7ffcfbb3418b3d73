//! Per-thing components
//!
//! Behaviour that used to live in subclasses is composed from these. Each
//! component is declared by the def and instantiated when the thing is made.

use crate::combat::DamageInfo;
use crate::core::error::ThingError;
use crate::defs::CompProperties;

/// Converts watts into stored watt-days for one tick
pub const WATTS_TO_WATT_DAYS_PER_TICK: f32 = 1.0 / 60_000.0;

pub const SIGNAL_BREAKDOWN: &str = "Breakdown";
pub const SIGNAL_REPAIRED: &str = "Repaired";

#[derive(Debug, Clone, PartialEq)]
pub enum ThingComp {
    Battery(BatteryComp),
    Breakdownable(BreakdownableComp),
    Shield(ShieldComp),
    Explosive(ExplosiveComp),
}

impl ThingComp {
    pub fn from_props(props: &CompProperties) -> Self {
        match props {
            CompProperties::Battery { stored_energy_max, efficiency } => {
                ThingComp::Battery(BatteryComp::new(*stored_energy_max, *efficiency))
            }
            CompProperties::Breakdownable => ThingComp::Breakdownable(BreakdownableComp::default()),
            CompProperties::Shield { max_energy } => ThingComp::Shield(ShieldComp::new(*max_energy)),
            CompProperties::Explosive => ThingComp::Explosive(ExplosiveComp::default()),
        }
    }

    pub fn is_broken_down(&self) -> bool {
        matches!(self, ThingComp::Breakdownable(b) if b.broken_down)
    }

    /// Returns true when the component soaks up the whole hit
    pub fn pre_apply_damage(&mut self, dinfo: &mut DamageInfo) -> bool {
        match self {
            ThingComp::Shield(shield) => shield.try_absorb(dinfo.amount()),
            _ => false,
        }
    }

    pub fn post_apply_damage(&mut self, _dinfo: &DamageInfo, total_damage_dealt: f32) {
        if let ThingComp::Shield(shield) = self {
            if total_damage_dealt > 0.0 {
                shield.collapse();
            }
        }
    }

    /// Returns true if the battery had to be clamped at zero
    pub fn tick(&mut self, self_discharge_watts: f32) -> bool {
        match self {
            ThingComp::Battery(battery) => battery.tick(self_discharge_watts),
            _ => false,
        }
    }

    /// Returns true if the battery had to be clamped at zero
    pub fn receive_signal(&mut self, signal: &str) -> bool {
        match self {
            ThingComp::Battery(battery) if signal == SIGNAL_BREAKDOWN => {
                battery.draw_power(battery.stored_energy())
            }
            ThingComp::Breakdownable(b) => {
                match signal {
                    SIGNAL_BREAKDOWN => b.broken_down = true,
                    SIGNAL_REPAIRED => b.broken_down = false,
                    _ => {}
                }
                false
            }
            _ => false,
        }
    }

    pub fn as_battery(&self) -> Option<&BatteryComp> {
        match self {
            ThingComp::Battery(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_battery_mut(&mut self) -> Option<&mut BatteryComp> {
        match self {
            ThingComp::Battery(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_shield(&self) -> Option<&ShieldComp> {
        match self {
            ThingComp::Shield(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_explosive(&self) -> Option<&ExplosiveComp> {
        match self {
            ThingComp::Explosive(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_explosive_mut(&mut self) -> Option<&mut ExplosiveComp> {
        match self {
            ThingComp::Explosive(e) => Some(e),
            _ => None,
        }
    }
}

/// Stored electrical energy in watt-days
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryComp {
    stored_energy: f32,
    stored_energy_max: f32,
    efficiency: f32,
}

impl BatteryComp {
    pub fn new(stored_energy_max: f32, efficiency: f32) -> Self {
        Self {
            stored_energy: 0.0,
            stored_energy_max,
            efficiency,
        }
    }

    pub fn stored_energy(&self) -> f32 {
        self.stored_energy
    }

    pub fn stored_energy_max(&self) -> f32 {
        self.stored_energy_max
    }

    pub fn stored_energy_pct(&self) -> f32 {
        self.stored_energy / self.stored_energy_max
    }

    /// Input energy the battery can still take, before efficiency losses
    pub fn amount_can_accept(&self, broken_down: bool) -> f32 {
        if broken_down {
            return 0.0;
        }
        (self.stored_energy_max - self.stored_energy) / self.efficiency
    }

    /// Store up to `amount`, returns the energy actually stored
    pub fn add_energy(&mut self, amount: f32, broken_down: bool) -> Result<f32, ThingError> {
        if amount < 0.0 {
            return Err(ThingError::NegativeEnergy(amount));
        }
        let accepted = amount.min(self.amount_can_accept(broken_down));
        let stored = accepted * self.efficiency;
        self.stored_energy += stored;
        Ok(stored)
    }

    /// Returns true if more was drawn than stored; the store is clamped to zero
    pub fn draw_power(&mut self, amount: f32) -> bool {
        self.stored_energy -= amount;
        if self.stored_energy < 0.0 {
            self.stored_energy = 0.0;
            return true;
        }
        false
    }

    pub fn set_stored_energy_pct(&mut self, pct: f32) {
        self.stored_energy = self.stored_energy_max * pct.clamp(0.0, 1.0);
    }

    pub fn tick(&mut self, self_discharge_watts: f32) -> bool {
        self.draw_power((self_discharge_watts * WATTS_TO_WATT_DAYS_PER_TICK).min(self.stored_energy))
    }

    /// Loaded values may exceed a capacity that has since shrunk
    pub fn clamp_to_capacity(&mut self) {
        self.stored_energy = self.stored_energy.min(self.stored_energy_max);
    }

    pub(crate) fn set_stored_energy_direct(&mut self, value: f32) {
        self.stored_energy = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakdownableComp {
    pub broken_down: bool,
}

/// Energy pool absorbing whole hits it can cover
#[derive(Debug, Clone, PartialEq)]
pub struct ShieldComp {
    energy: f32,
    max_energy: f32,
}

impl ShieldComp {
    pub fn new(max_energy: f32) -> Self {
        Self {
            energy: max_energy,
            max_energy,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn max_energy(&self) -> f32 {
        self.max_energy
    }

    fn try_absorb(&mut self, amount: f32) -> bool {
        if amount > 0.0 && self.energy >= amount {
            self.energy -= amount;
            true
        } else {
            false
        }
    }

    fn collapse(&mut self) {
        self.energy = 0.0;
    }

    pub fn recharge(&mut self) {
        self.energy = self.max_energy;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplosiveComp {
    pub destroyed_through_detonation: bool,
}
