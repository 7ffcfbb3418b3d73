//! Identity and definition catalog
//!
//! Static definitions describing immutable per-type properties. Loaded from
//! TOML, shared behind `Arc`, looked up and never owned by things.

pub mod damage;
pub mod registry;
pub mod schema;

pub use damage::DamageDef;
pub use registry::{DefDatabase, DefError};
pub use schema::{
    Capabilities, CompProperties, DamageMultiplier, DrawerType, FloatRange, IngestibleProperties,
    StuffProperties, ThingCategory, ThingDef, TickerKind, Tradeability, Traversability,
};
