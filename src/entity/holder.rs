//! Non-spatial holders such as inventories.

use crate::core::types::{HolderId, ThingId};

/// What a holder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderParent {
    /// Loose holder, e.g. a caravan's pooled goods
    None,
    /// Inventory of another thing
    Thing(ThingId),
}

/// Container of unspawned things
#[derive(Debug, Clone)]
pub struct ThingOwner {
    pub id: HolderId,
    pub parent: HolderParent,
    contents: Vec<ThingId>,
}

impl ThingOwner {
    pub fn new(id: HolderId, parent: HolderParent) -> Self {
        Self {
            id,
            parent,
            contents: Vec::new(),
        }
    }

    pub fn contents(&self) -> &[ThingId] {
        &self.contents
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.contents.contains(&thing)
    }

    pub(crate) fn push(&mut self, thing: ThingId) {
        if !self.contains(thing) {
            self.contents.push(thing);
        }
    }

    pub(crate) fn remove(&mut self, thing: ThingId) -> bool {
        let before = self.contents.len();
        self.contents.retain(|&t| t != thing);
        self.contents.len() != before
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn parent_thing(&self) -> Option<ThingId> {
        match self.parent {
            HolderParent::Thing(id) => Some(id),
            HolderParent::None => None,
        }
    }
}
