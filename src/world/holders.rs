//! Holders and the queries that walk up their parent chain

use glam::IVec2;

use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::{HolderId, MapId, ThingId};
use crate::defs::ThingCategory;
use crate::entity::{HolderParent, ThingOwner};

/// Guards the parent walk against malformed cycles
const MAX_HOLDER_DEPTH: usize = 32;

impl World {
    pub fn create_holder(&mut self, parent: HolderParent) -> HolderId {
        let id = self.next_holder_id();
        self.holders.insert(id, ThingOwner::new(id, parent));
        id
    }

    /// Inventory owned by `thing`
    pub fn create_holder_for(&mut self, thing: ThingId) -> Result<HolderId> {
        self.require(thing)?;
        Ok(self.create_holder(HolderParent::Thing(thing)))
    }

    /// Put an unspawned thing into a holder, moving it out of any other
    pub fn try_add_to_holder(&mut self, holder: HolderId, id: ThingId) -> Result<()> {
        let thing = self.require(id)?;
        let name = thing.to_string();
        if thing.spawned() {
            return self.reject(ThingError::HoldSpawned(name));
        }
        if thing.destroyed() {
            return self.reject(ThingError::AlreadyDestroyed(name));
        }
        if !self.holders.contains_key(&holder) {
            return self.reject(ThingError::HolderNotFound(holder));
        }

        self.remove_from_holder(id);
        if let Some(owner) = self.holders.get_mut(&holder) {
            owner.push(id);
        }
        if let Some(thing) = self.things.get_mut(&id) {
            thing.holding_owner = Some(holder);
        }
        Ok(())
    }

    /// Returns false if the thing was not held
    pub fn remove_from_holder(&mut self, id: ThingId) -> bool {
        let Some(holder) = self.things.get(&id).and_then(|t| t.holding_owner) else {
            return false;
        };
        if let Some(owner) = self.holders.get_mut(&holder) {
            owner.remove(id);
        }
        if let Some(thing) = self.things.get_mut(&id) {
            thing.holding_owner = None;
        }
        true
    }

    /// Thing owning the holder `id` sits in, if any
    pub fn parent_holder_thing(&self, id: ThingId) -> Option<ThingId> {
        let holder = self.things.get(&id)?.holding_owner?;
        self.holders.get(&holder)?.parent_thing()
    }

    /// The thing itself if spawned, else its nearest spawned ancestor
    pub fn spawned_parent_or_me(&self, id: ThingId) -> Option<ThingId> {
        let mut current = id;
        for _ in 0..MAX_HOLDER_DEPTH {
            if self.things.get(&current)?.spawned() {
                return Some(current);
            }
            current = self.parent_holder_thing(current)?;
        }
        None
    }

    pub fn spawned_or_any_parent_spawned(&self, id: ThingId) -> bool {
        self.spawned_parent_or_me(id).is_some()
    }

    /// Map of the thing or of the spawned thing carrying it
    pub fn map_held(&self, id: ThingId) -> Option<MapId> {
        let spawned = self.spawned_parent_or_me(id)?;
        self.things.get(&spawned)?.map()
    }

    /// Where the thing is, or where the thing carrying it is
    ///
    /// Walks up to the nearest spawned ancestor. With nothing spawned in the
    /// chain this falls back to the last known position of the outermost
    /// carrier, and `None` only means the thing does not exist.
    pub fn position_held(&self, id: ThingId) -> Option<IVec2> {
        let mut current = self.things.get(&id)?;
        for _ in 0..MAX_HOLDER_DEPTH {
            if current.spawned() {
                break;
            }
            match self.parent_holder_thing(current.id).and_then(|p| self.things.get(&p)) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Some(current.position)
    }

    pub(crate) fn any_parent_is_pawn(&self, id: ThingId) -> bool {
        let mut current = id;
        for _ in 0..MAX_HOLDER_DEPTH {
            let Some(parent) = self.parent_holder_thing(current) else {
                return false;
            };
            let is_pawn = self
                .things
                .get(&parent)
                .map_or(false, |t| t.def.category == ThingCategory::Pawn);
            if is_pawn {
                return true;
            }
            current = parent;
        }
        false
    }
}
