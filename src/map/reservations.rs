//! Claims other actors hold on things

use ahash::AHashMap;

use crate::core::types::ThingId;

/// Exclusive claims keyed by target
#[derive(Debug, Clone, Default)]
pub struct ReservationManager {
    by_target: AHashMap<ThingId, Vec<ThingId>>,
}

impl ReservationManager {
    /// Returns false if `claimant` already holds `target`
    pub fn reserve(&mut self, claimant: ThingId, target: ThingId) -> bool {
        let claimants = self.by_target.entry(target).or_default();
        if claimants.contains(&claimant) {
            return false;
        }
        claimants.push(claimant);
        true
    }

    pub fn release(&mut self, claimant: ThingId, target: ThingId) {
        if let Some(claimants) = self.by_target.get_mut(&target) {
            claimants.retain(|&c| c != claimant);
            if claimants.is_empty() {
                self.by_target.remove(&target);
            }
        }
    }

    /// Drop every claim on `target`, returning how many were released
    pub fn release_all_for_target(&mut self, target: ThingId) -> usize {
        self.by_target.remove(&target).map_or(0, |c| c.len())
    }

    pub fn is_reserved(&self, target: ThingId) -> bool {
        self.by_target.contains_key(&target)
    }

    pub fn claimants_of(&self, target: ThingId) -> &[ThingId] {
        self.by_target.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Player orders targeting things (haul, deconstruct, ...)
#[derive(Debug, Clone, Default)]
pub struct DesignationManager {
    on_thing: AHashMap<ThingId, Vec<String>>,
}

impl DesignationManager {
    pub fn add(&mut self, target: ThingId, designation: impl Into<String>) {
        self.on_thing.entry(target).or_default().push(designation.into());
    }

    pub fn remove_all_designations_on(&mut self, target: ThingId) -> usize {
        self.on_thing.remove(&target).map_or(0, |d| d.len())
    }

    pub fn designations_on(&self, target: ThingId) -> &[String] {
        self.on_thing.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_designation_on(&self, target: ThingId) -> bool {
        self.on_thing.contains_key(&target)
    }
}
