//! Things, their components, and the holders that carry them

pub mod comps;
pub mod holder;
pub mod maker;
pub mod thing;

pub use comps::{BatteryComp, BreakdownableComp, ExplosiveComp, ShieldComp, ThingComp};
pub use holder::{HolderParent, ThingOwner};
pub use maker::ThingIdMaker;
pub use thing::{id_number_from_thing_id, Lifecycle, Thing};
