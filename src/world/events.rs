//! Lifecycle events emitted by world operations

use glam::IVec2;

use super::lifecycle::DestroyMode;
use crate::core::types::{MapId, ThingId};

/// Record of something the lifecycle core did, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum ThingEvent {
    Spawned {
        thing: ThingId,
        map: MapId,
        cell: IVec2,
        /// Re-registration after a load rather than a fresh spawn
        respawning_after_load: bool,
    },
    Despawned {
        thing: ThingId,
        map: MapId,
        mode: DestroyMode,
    },
    Destroyed {
        thing: ThingId,
        mode: DestroyMode,
    },
    Discarded {
        thing: ThingId,
    },
    /// Leavings were generated for a thing destroyed while spawned
    LeavingsMade {
        thing: ThingId,
        map: MapId,
        mode: DestroyMode,
    },
    FilthDropped {
        thing: ThingId,
        damage_dealt: f32,
    },
    Moved {
        thing: ThingId,
        from: IVec2,
        to: IVec2,
    },
    StackAbsorbed {
        into: ThingId,
        from: ThingId,
        count: u32,
    },
    StackSplit {
        from: ThingId,
        piece: ThingId,
        count: u32,
    },
    SignalSent {
        tag: String,
        subject: Option<ThingId>,
    },
    MapRemoved {
        map: MapId,
        discarded: usize,
    },
}
