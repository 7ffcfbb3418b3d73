//! Category listers kept per map

use ahash::{AHashMap, AHashSet};

use crate::core::types::ThingId;
use crate::defs::ThingCategory;

/// Unordered membership set of things
#[derive(Debug, Clone, Default)]
pub struct ThingSet {
    items: AHashSet<ThingId>,
}

impl ThingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if already present
    pub fn add(&mut self, thing: ThingId) -> bool {
        self.items.insert(thing)
    }

    /// Returns false if absent
    pub fn remove(&mut self, thing: ThingId) -> bool {
        self.items.remove(&thing)
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.items.contains(&thing)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Members in id order
    pub fn sorted(&self) -> Vec<ThingId> {
        let mut ids: Vec<_> = self.items.iter().copied().collect();
        ids.sort();
        ids
    }
}

/// Spawned things by def name and by category
#[derive(Debug, Clone, Default)]
pub struct ListerThings {
    by_def: AHashMap<String, ThingSet>,
    by_category: AHashMap<ThingCategory, ThingSet>,
}

impl ListerThings {
    pub fn add(&mut self, thing: ThingId, def_name: &str, category: ThingCategory) {
        self.by_def.entry(def_name.to_string()).or_default().add(thing);
        self.by_category.entry(category).or_default().add(thing);
    }

    pub fn remove(&mut self, thing: ThingId, def_name: &str, category: ThingCategory) {
        if let Some(set) = self.by_def.get_mut(def_name) {
            set.remove(thing);
        }
        if let Some(set) = self.by_category.get_mut(&category) {
            set.remove(thing);
        }
    }

    pub fn of_def(&self, def_name: &str) -> Vec<ThingId> {
        self.by_def.get(def_name).map(ThingSet::sorted).unwrap_or_default()
    }

    pub fn in_category(&self, category: ThingCategory) -> Vec<ThingId> {
        self.by_category.get(&category).map(ThingSet::sorted).unwrap_or_default()
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.by_def.values().any(|set| set.contains(thing))
            || self.by_category.values().any(|set| set.contains(thing))
    }
}

/// Items whose stacks still have room, candidates for merging
#[derive(Debug, Clone, Default)]
pub struct ListerMergeables {
    mergeable: ThingSet,
    stack_changes: u64,
}

impl ListerMergeables {
    pub fn notify_spawned(&mut self, thing: ThingId, count: u32, limit: u32) {
        self.check_add(thing, count, limit);
    }

    pub fn notify_despawned(&mut self, thing: ThingId) {
        self.mergeable.remove(thing);
    }

    pub fn notify_stack_changed(&mut self, thing: ThingId, count: u32, limit: u32) {
        self.stack_changes += 1;
        self.check_add(thing, count, limit);
    }

    fn check_add(&mut self, thing: ThingId, count: u32, limit: u32) {
        if count < limit {
            self.mergeable.add(thing);
        } else {
            self.mergeable.remove(thing);
        }
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.mergeable.contains(thing)
    }

    pub fn stack_changes(&self) -> u64 {
        self.stack_changes
    }

    pub fn things(&self) -> Vec<ThingId> {
        self.mergeable.sorted()
    }
}
