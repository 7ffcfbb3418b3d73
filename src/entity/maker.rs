//! Identity allocation and starting-state rolls for new things.

use rand::Rng;

use super::thing::Thing;
use crate::core::types::ThingId;

/// Hands out process-unique thing ids
#[derive(Debug, Clone)]
pub struct ThingIdMaker {
    next: u32,
}

impl ThingIdMaker {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> ThingId {
        let id = ThingId(self.next);
        self.next += 1;
        id
    }

    /// Make sure ids loaded from a save are never handed out again
    pub fn bump_past(&mut self, seen: ThingId) {
        if seen.0 >= self.next {
            self.next = seen.0 + 1;
        }
    }

    pub fn peek(&self) -> ThingId {
        ThingId(self.next)
    }
}

impl Default for ThingIdMaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Starting health: a random fraction of max from the def's range
pub fn roll_starting_hit_points<R: Rng + ?Sized>(thing: &Thing, rng: &mut R) -> Option<i32> {
    let def = thing.def();
    if !def.use_hit_points {
        return None;
    }
    let range = def.starting_hp_range;
    let fraction = if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    };
    Some((thing.max_hit_points() as f32 * fraction.clamp(0.0, 1.0)).round() as i32)
}
