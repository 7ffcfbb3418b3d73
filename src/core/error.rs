use glam::IVec2;
use thiserror::Error;

use crate::core::types::{HolderId, MapId, ThingId};

/// Everything that can go wrong while driving a thing through its lifecycle.
///
/// None of these are fatal. Rejected operations leave the world untouched;
/// corrections (clamps) are applied and reported alongside.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThingError {
    #[error("Thing not found: {0:?}")]
    ThingNotFound(ThingId),

    #[error("Map not found: {0:?}")]
    MapNotFound(MapId),

    #[error("Holder not found: {0:?}")]
    HolderNotFound(HolderId),

    #[error("Tried to spawn already-spawned thing {0}")]
    AlreadySpawned(String),

    #[error("Tried to spawn destroyed thing {0}")]
    SpawnDestroyed(String),

    #[error("Tried to despawn {0} which is not spawned")]
    NotSpawned(String),

    #[error("Tried to despawn {0} which is already destroyed")]
    DespawnDestroyed(String),

    #[error("Tried to destroy already-destroyed thing {0}")]
    AlreadyDestroyed(String),

    #[error("Tried to destroy non-destroyable thing {0}")]
    NonDestroyable(String),

    #[error("Tried to discard {thing} whose state is {state}")]
    InvalidDiscard { thing: String, state: String },

    #[error("Tried to spawn {0} while it is held by a container")]
    HeldByContainer(String),

    #[error("Tried to hold {0} while it is spawned")]
    HoldSpawned(String),

    #[error("{thing} footprint at {cell:?} is outside its map")]
    OutOfBounds { thing: String, cell: IVec2 },

    #[error("Spawned {thing} with stack count {count} but stack limit is {limit}. Truncating.")]
    StackOverLimit { thing: String, count: u32, limit: u32 },

    #[error("Tried to split off {requested} of {thing} but there are only {available}")]
    SplitOverStack { thing: String, requested: u32, available: u32 },

    #[error("Tried to split off part of destroyed thing {0}")]
    SplitDestroyed(String),

    #[error("Invalid count {count} for {thing}")]
    InvalidCount { thing: String, count: u32 },

    #[error("{a} cannot stack with {b}")]
    CannotStack { a: String, b: String },

    #[error("Changed position of a spawned thing which affects regions: {0}")]
    MovedRegionAffecter(String),

    #[error("Tried to set faction on {0} which cannot have a faction")]
    CannotHaveFaction(String),

    #[error("Unknown def: {0}")]
    UnknownDef(String),

    #[error("{def} is made from stuff but no stuff was given")]
    MissingStuff { def: String },

    #[error("{def} is not made from stuff, ignoring stuff {stuff}")]
    UnexpectedStuff { def: String, stuff: String },

    #[error("Could not resolve faction {0} while loading, using none")]
    UnresolvedFaction(String),

    #[error("Could not convert id number from thing id {0}")]
    BadThingId(String),

    #[error("{thing} loaded with {hit_points} hit points but max is {max}. Clamping.")]
    HitPointsOverMax { thing: String, hit_points: i32, max: i32 },

    #[error("Tickability already registered for {0}")]
    DuplicateTickRegistration(String),

    #[error("{thing} has no {comp} component")]
    MissingComp { thing: String, comp: &'static str },

    #[error("Cannot add negative energy {0}")]
    NegativeEnergy(f32),

    #[error("Drawing power we don't have from {0}")]
    PowerOverdraw(String),

    #[error("{ingester} ingested {thing} which cannot be ingested now")]
    NotIngestible { ingester: String, thing: String },

    #[error("Tried to deal negative damage {amount} to {thing}")]
    NegativeDamage { thing: String, amount: f32 },

    #[error("{0} is not usable as stuff")]
    NotStuff(String),

    #[error("{0} loaded with a stack count of zero, using one")]
    ZeroStackCount(String),

    #[error("Thing is associated with invalid map {0:?}")]
    StaleMapReference(MapId),
}

pub type Result<T> = std::result::Result<T, ThingError>;
