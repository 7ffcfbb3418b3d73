//! Factions and thing allegiance

use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::{FactionId, ThingId};

#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
}

/// Registered factions, resolvable by load id
#[derive(Debug, Clone, Default)]
pub struct FactionManager {
    factions: Vec<Faction>,
}

impl FactionManager {
    pub fn add(&mut self, name: impl Into<String>) -> FactionId {
        let id = FactionId(self.factions.len() as u32);
        self.factions.push(Faction {
            id,
            name: name.into(),
        });
        id
    }

    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    /// Resolve a saved reference such as `Faction_3`
    pub fn resolve_load_id(&self, load_id: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .find(|f| f.id.load_id() == load_id)
            .map(|f| f.id)
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }
}

impl World {
    /// Change allegiance, refreshing the attack target index of a spawned thing
    pub fn set_faction(&mut self, id: ThingId, faction: Option<FactionId>) -> Result<()> {
        let thing = self.require(id)?;
        if !thing.def.can_have_faction {
            let name = thing.to_string();
            return self.reject(ThingError::CannotHaveFaction(name));
        }
        let attack_target_map = thing
            .map()
            .filter(|_| thing.def.capabilities.attack_target);

        if let Some(thing) = self.things.get_mut(&id) {
            thing.faction = faction;
        }
        if let Some(map) = attack_target_map.and_then(|m| self.maps.get_mut(&m)) {
            map.attack_targets.remove(id);
            map.attack_targets.add(id);
        }
        Ok(())
    }

    /// Set faction without touching any index, for load paths
    pub fn set_faction_direct(&mut self, id: ThingId, faction: Option<FactionId>) {
        if let Some(thing) = self.things.get_mut(&id) {
            thing.faction = faction;
        }
    }
}
