//! Tick lists and the world tick

use ahash::AHashSet;

use super::World;
use crate::core::error::ThingError;
use crate::core::types::ThingId;
use crate::defs::TickerKind;

/// Things registered for ticking, one list per interval
#[derive(Debug, Clone, Default)]
pub struct TickManager {
    normal: AHashSet<ThingId>,
    rare: AHashSet<ThingId>,
    long: AHashSet<ThingId>,
}

impl TickManager {
    fn list_mut(&mut self, kind: TickerKind) -> Option<&mut AHashSet<ThingId>> {
        match kind {
            TickerKind::Never => None,
            TickerKind::Normal => Some(&mut self.normal),
            TickerKind::Rare => Some(&mut self.rare),
            TickerKind::Long => Some(&mut self.long),
        }
    }

    /// Returns false if the thing was already registered
    pub fn register(&mut self, thing: ThingId, kind: TickerKind) -> bool {
        match self.list_mut(kind) {
            Some(list) => list.insert(thing),
            None => true,
        }
    }

    pub fn deregister(&mut self, thing: ThingId, kind: TickerKind) {
        if let Some(list) = self.list_mut(kind) {
            list.remove(&thing);
        }
    }

    pub fn is_registered(&self, thing: ThingId) -> bool {
        self.normal.contains(&thing) || self.rare.contains(&thing) || self.long.contains(&thing)
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.rare.len() + self.long.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn due(&self, tick: u64, ticks_per_rare: u64, ticks_per_long: u64) -> Vec<(ThingId, u64)> {
        let mut due: Vec<(ThingId, u64)> = self.normal.iter().map(|&t| (t, 1)).collect();
        if ticks_per_rare > 0 && tick % ticks_per_rare == 0 {
            due.extend(self.rare.iter().map(|&t| (t, ticks_per_rare)));
        }
        if ticks_per_long > 0 && tick % ticks_per_long == 0 {
            due.extend(self.long.iter().map(|&t| (t, ticks_per_long)));
        }
        due.sort();
        due
    }
}

impl World {
    /// Advance one tick and run the components of everything due
    pub fn tick(&mut self) {
        self.current_tick += 1;
        let due = self.tick_manager.due(
            self.current_tick,
            self.config.ticks_per_rare,
            self.config.ticks_per_long,
        );
        let watts = self.config.self_discharge_watts;

        for (id, elapsed) in due {
            let Some(thing) = self.things.get_mut(&id) else {
                continue;
            };
            let mut overdrawn = false;
            for comp in thing.comps.iter_mut() {
                overdrawn |= comp.tick(watts * elapsed as f32);
            }
            if overdrawn {
                let name = thing.to_string();
                self.diagnostics.error(ThingError::PowerOverdraw(name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_reports_duplicate() {
        let mut ticks = TickManager::default();
        assert!(ticks.register(ThingId(1), TickerKind::Normal));
        assert!(!ticks.register(ThingId(1), TickerKind::Normal));
        assert!(ticks.register(ThingId(2), TickerKind::Never));
        assert!(!ticks.is_registered(ThingId(2)));
        assert_eq!(ticks.len(), 1);

        ticks.deregister(ThingId(1), TickerKind::Normal);
        assert!(ticks.is_empty());
    }

    #[test]
    fn test_rare_and_long_intervals() {
        let mut ticks = TickManager::default();
        ticks.register(ThingId(1), TickerKind::Normal);
        ticks.register(ThingId(2), TickerKind::Rare);
        ticks.register(ThingId(3), TickerKind::Long);

        assert_eq!(ticks.due(7, 250, 2000), vec![(ThingId(1), 1)]);
        assert_eq!(ticks.due(250, 250, 2000), vec![(ThingId(1), 1), (ThingId(2), 250)]);
        assert_eq!(ticks.due(2000, 250, 2000).len(), 3);
    }
}
