//! The thing record and its lifecycle state.

use glam::IVec2;
use std::fmt;
use std::sync::Arc;

use super::comps::ThingComp;
use crate::core::types::{CellRect, FactionId, HolderId, MapId, Rot4, ThingId, INVALID_CELL};
use crate::defs::ThingDef;

/// Where a thing is in its lifecycle
///
/// `Spawned` is only entered from `Unspawned`, `Discarded` only from
/// `Destroyed`, and nothing leaves `Destroyed` except towards `Discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Unspawned,
    Spawned { map: MapId },
    /// Destroyed but still referenced in memory
    Destroyed,
    /// Destroyed and no longer managed or saved by anything
    Discarded,
}

impl Lifecycle {
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Lifecycle::Destroyed | Lifecycle::Discarded)
    }

    pub fn map(&self) -> Option<MapId> {
        match self {
            Lifecycle::Spawned { map } => Some(*map),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Unspawned => "unspawned",
            Lifecycle::Spawned { .. } => "spawned",
            Lifecycle::Destroyed => "destroyed",
            Lifecycle::Discarded => "discarded",
        }
    }
}

/// A discrete simulated object
#[derive(Debug, Clone)]
pub struct Thing {
    pub(crate) def: Arc<ThingDef>,
    pub(crate) id: ThingId,
    pub(crate) state: Lifecycle,
    pub(crate) position: IVec2,
    pub(crate) rotation: Rot4,
    pub stack_count: u32,
    pub(crate) faction: Option<FactionId>,
    pub(crate) stuff: Option<Arc<ThingDef>>,
    pub(crate) hit_points: Option<i32>,
    pub(crate) holding_owner: Option<HolderId>,
    pub quest_tags: Vec<String>,
    pub(crate) comps: Vec<ThingComp>,
}

impl Thing {
    pub(crate) fn new(def: Arc<ThingDef>, id: ThingId, stuff: Option<Arc<ThingDef>>) -> Self {
        let comps = def.comps.iter().map(ThingComp::from_props).collect();
        Self {
            def,
            id,
            state: Lifecycle::Unspawned,
            position: INVALID_CELL,
            rotation: Rot4::North,
            stack_count: 1,
            faction: None,
            stuff,
            hit_points: None,
            holding_owner: None,
            quest_tags: Vec::new(),
            comps,
        }
    }

    pub fn def(&self) -> &Arc<ThingDef> {
        &self.def
    }

    pub fn id(&self) -> ThingId {
        self.id
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn spawned(&self) -> bool {
        matches!(self.state, Lifecycle::Spawned { .. })
    }

    pub fn destroyed(&self) -> bool {
        self.state.is_destroyed()
    }

    pub fn discarded(&self) -> bool {
        self.state == Lifecycle::Discarded
    }

    pub fn map(&self) -> Option<MapId> {
        self.state.map()
    }

    /// Current cell while spawned, last known cell otherwise
    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn rotation(&self) -> Rot4 {
        self.rotation
    }

    pub fn faction(&self) -> Option<FactionId> {
        self.faction
    }

    pub fn stuff(&self) -> Option<&Arc<ThingDef>> {
        self.stuff.as_ref()
    }

    /// `None` when the def does not track health
    pub fn hit_points(&self) -> Option<i32> {
        self.hit_points
    }

    pub fn holding_owner(&self) -> Option<HolderId> {
        self.holding_owner
    }

    pub fn comps(&self) -> &[ThingComp] {
        &self.comps
    }

    pub fn comps_mut(&mut self) -> &mut [ThingComp] {
        &mut self.comps
    }

    /// Max hit points, scaled by the stuff it is made from
    pub fn max_hit_points(&self) -> i32 {
        let factor = self
            .stuff
            .as_ref()
            .and_then(|s| s.stuff_props.as_ref())
            .map_or(1.0, |p| p.max_hit_points_factor);
        (self.def.max_hit_points as f32 * factor).round() as i32
    }

    /// Footprint size after rotation
    pub fn rotated_size(&self) -> IVec2 {
        let size = self.def.size();
        if self.rotation.is_horizontal() {
            IVec2::new(size.y, size.x)
        } else {
            size
        }
    }

    pub fn occupied_rect(&self) -> CellRect {
        CellRect::occupied(self.position, self.rotation, self.def.size())
    }

    pub fn smeltable(&self) -> bool {
        self.def.smeltable
            && (!self.def.made_from_stuff
                || self
                    .stuff
                    .as_ref()
                    .and_then(|s| s.stuff_props.as_ref())
                    .map_or(false, |p| p.smeltable))
    }

    pub fn draw_color(&self) -> [f32; 4] {
        self.stuff
            .as_ref()
            .and_then(|s| s.stuff_props.as_ref())
            .map_or(self.def.color, |p| p.color)
    }

    pub fn is_broken_down(&self) -> bool {
        self.comps.iter().any(ThingComp::is_broken_down)
    }

    /// Stable string id, e.g. `Steel42`
    pub fn thing_id(&self) -> String {
        if self.def.has_thing_id_number {
            format!("{}{}", self.def.def_name, self.id.0)
        } else {
            self.def.def_name.clone()
        }
    }

    pub fn unique_load_id(&self) -> String {
        format!("Thing_{}", self.thing_id())
    }

    /// Label with stack count, e.g. `steel x50`
    pub fn label(&self) -> String {
        let base = match &self.stuff {
            Some(stuff) if self.def.made_from_stuff => {
                format!("{} {}", stuff.label(), self.def.label())
            }
            _ => self.def.label().to_string(),
        };
        if self.stack_count > 1 {
            format!("{} x{}", base, self.stack_count)
        } else {
            base
        }
    }

    /// Bulk and load paths only: moves without touching any index
    pub fn set_position_direct(&mut self, cell: IVec2) {
        self.position = cell;
    }

    /// Bulk and load paths only: turns without touching any index
    pub fn set_rotation_direct(&mut self, rot: Rot4) {
        self.rotation = rot;
    }

    pub fn set_stuff_direct(&mut self, stuff: Option<Arc<ThingDef>>) {
        self.stuff = stuff;
    }

    pub(crate) fn set_hit_points(&mut self, value: i32) {
        if self.def.use_hit_points {
            self.hit_points = Some(value);
        }
    }
}

impl PartialEq for Thing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Thing {}

impl std::hash::Hash for Thing {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.thing_id())
    }
}

/// Recover the id number from the digits ending a thing id
///
/// Returns `None` when there are no trailing digits or they overflow.
pub fn id_number_from_thing_id(thing_id: &str) -> Option<u32> {
    let digits_start = thing_id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    thing_id[digits_start..].parse().ok()
}
