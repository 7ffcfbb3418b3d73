//! Operations on stateful components: batteries and explosives

use super::lifecycle::DestroyMode;
use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::ThingId;
use crate::entity::BatteryComp;

impl World {
    fn battery_mut(&mut self, id: ThingId) -> Result<(&mut BatteryComp, bool)> {
        if !self.things.contains_key(&id) {
            return self.reject(ThingError::ThingNotFound(id));
        }
        let Some(thing) = self.things.get_mut(&id) else {
            return Err(ThingError::ThingNotFound(id));
        };
        let broken_down = thing.is_broken_down();
        let name = thing.to_string();
        match thing.comps.iter_mut().find_map(|c| c.as_battery_mut()) {
            Some(battery) => Ok((battery, broken_down)),
            None => {
                let error = ThingError::MissingComp {
                    thing: name,
                    comp: "battery",
                };
                self.diagnostics.error(error.clone());
                Err(error)
            }
        }
    }

    /// Store energy in a battery; returns what was actually stored
    pub fn add_energy(&mut self, id: ThingId, amount: f32) -> Result<f32> {
        let (battery, broken_down) = self.battery_mut(id)?;
        match battery.add_energy(amount, broken_down) {
            Ok(stored) => Ok(stored),
            Err(error) => self.reject(error),
        }
    }

    /// Draw energy; overdrawing clamps the store at zero and is reported
    pub fn draw_power(&mut self, id: ThingId, amount: f32) -> Result<()> {
        let (battery, _) = self.battery_mut(id)?;
        if battery.draw_power(amount) {
            let name = self
                .things
                .get(&id)
                .map_or_else(|| format!("{:?}", id), |t| t.to_string());
            self.diagnostics.error(ThingError::PowerOverdraw(name));
        }
        Ok(())
    }

    pub fn set_stored_energy_pct(&mut self, id: ThingId, pct: f32) -> Result<()> {
        let (battery, _) = self.battery_mut(id)?;
        battery.set_stored_energy_pct(pct);
        Ok(())
    }

    /// Blow up an explosive thing
    ///
    /// The thing is killed without leaving anything behind.
    pub fn detonate(&mut self, id: ThingId) -> Result<()> {
        let thing = self.require(id)?;
        if thing.destroyed() {
            let name = thing.to_string();
            return self.reject(ThingError::AlreadyDestroyed(name));
        }
        if let Some(thing) = self.things.get_mut(&id) {
            for explosive in thing.comps.iter_mut().filter_map(|c| c.as_explosive_mut()) {
                explosive.destroyed_through_detonation = true;
            }
        }
        tracing::debug!("Detonating {}", id);
        self.destroy(id, DestroyMode::KillFinalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LifecycleConfig;
    use crate::defs::{CompProperties, DefDatabase, ThingCategory, ThingDef};
    use crate::world::ThingEvent;
    use glam::IVec2;

    fn world() -> World {
        let mut defs = DefDatabase::new();
        let mut battery = ThingDef::new("Battery", ThingCategory::Building);
        battery.comps = vec![
            CompProperties::Battery {
                stored_energy_max: 600.0,
                efficiency: 0.5,
            },
            CompProperties::Breakdownable,
        ];
        defs.add_thing(battery).unwrap();

        let mut shell = ThingDef::new("Shell", ThingCategory::Item);
        shell.comps = vec![CompProperties::Explosive];
        defs.add_thing(shell).unwrap();
        World::new(LifecycleConfig::default(), defs)
    }

    #[test]
    fn test_add_and_draw() {
        let mut world = world();
        let battery = world.make_thing("Battery", None).unwrap();
        assert_eq!(world.add_energy(battery, 400.0), Ok(200.0));
        world.draw_power(battery, 50.0).unwrap();
        let stored = world.thing(battery).unwrap().comps()[0]
            .as_battery()
            .unwrap()
            .stored_energy();
        assert_eq!(stored, 150.0);
        assert!(world.diagnostics().is_empty());

        world.draw_power(battery, 500.0).unwrap();
        assert!(matches!(
            world.diagnostics().errors().next(),
            Some(ThingError::PowerOverdraw(_))
        ));
    }

    #[test]
    fn test_negative_energy_rejected() {
        let mut world = world();
        let battery = world.make_thing("Battery", None).unwrap();
        assert_eq!(
            world.add_energy(battery, -1.0),
            Err(ThingError::NegativeEnergy(-1.0))
        );
    }

    #[test]
    fn test_broken_battery_accepts_nothing() {
        let mut world = world();
        let battery = world.make_thing("Battery", None).unwrap();
        world.thing_mut(battery).unwrap().comps_mut()[1] =
            crate::entity::ThingComp::Breakdownable(crate::entity::BreakdownableComp { broken_down: true });
        assert_eq!(world.add_energy(battery, 100.0), Ok(0.0));
    }

    #[test]
    fn test_detonation_skips_leavings() {
        let mut world = world();
        let map = world.add_map(IVec2::new(6, 6));
        let shell = world.make_thing("Shell", None).unwrap();
        world.spawn(shell, map, IVec2::new(2, 2), false).unwrap();
        world.detonate(shell).unwrap();

        assert!(world.thing(shell).unwrap().destroyed());
        assert!(!world
            .events()
            .iter()
            .any(|e| matches!(e, ThingEvent::LeavingsMade { .. })));
    }
}
