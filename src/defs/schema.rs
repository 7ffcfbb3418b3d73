//! Thing definition schema types for TOML deserialization.
//!
//! A `ThingDef` describes the immutable, per-type properties shared by every
//! thing of that type: stack limits, hit points, footprint, how the type
//! interacts with the spatial indices of a map, and which components its
//! instances carry. Defs are looked up, never owned by a thing.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Broad category of a thing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThingCategory {
    Item,
    Building,
    Pawn,
    Plant,
    Filth,
    Projectile,
    Mote,
    Ethereal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversability {
    #[default]
    Standable,
    PassThroughOnly,
    Impassable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerType {
    RealtimeOnly,
    #[default]
    MapMeshOnly,
    MapMeshAndRealTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tradeability {
    None,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerKind {
    #[default]
    Never,
    Normal,
    Rare,
    Long,
}

/// Inclusive float range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Optional interfaces a thing type declares up front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Accepts hauled items (shelves, stockpile-like buildings)
    pub haul_destination: bool,
    /// Can be targeted by attackers
    pub attack_target: bool,
    /// Holds other things (inventories, containers)
    pub thing_holder: bool,
}

/// Properties of a def usable as a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuffProperties {
    #[serde(default = "white")]
    pub color: [f32; 4],
    #[serde(default)]
    pub smeltable: bool,
    #[serde(default = "one_f32")]
    pub max_hit_points_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageMultiplier {
    pub damage_def: String,
    pub multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestibleProperties {
    /// Nutrition per unit
    pub nutrition: f32,
    #[serde(default = "default_max_ingest")]
    pub max_num_to_ingest_at_once: u32,
}

/// Component declarations, instantiated per thing by the factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompProperties {
    Battery {
        stored_energy_max: f32,
        #[serde(default = "one_f32")]
        efficiency: f32,
    },
    Breakdownable,
    Shield {
        max_energy: f32,
    },
    Explosive,
}

/// Immutable per-type description of a thing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingDef {
    pub def_name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub category: ThingCategory,

    #[serde(default = "one_u32")]
    pub stack_limit: u32,
    #[serde(default)]
    pub use_hit_points: bool,
    #[serde(default = "default_max_hit_points")]
    pub max_hit_points: i32,
    #[serde(default = "default_hp_range")]
    pub starting_hp_range: FloatRange,
    #[serde(default = "yes")]
    pub destroyable: bool,

    /// Footprint in cells when facing north
    #[serde(default = "unit_size")]
    pub size: [i32; 2],
    #[serde(default)]
    pub passability: Traversability,
    #[serde(default)]
    pub path_cost: i32,
    #[serde(default)]
    pub affects_regions: bool,
    #[serde(default)]
    pub affects_reachability: bool,
    #[serde(default)]
    pub drawer_type: DrawerType,
    #[serde(default)]
    pub linked_graphic: bool,
    #[serde(default = "yes")]
    pub can_overlap_zones: bool,
    /// Fraction of the cell this fills, used by the cover grid
    #[serde(default)]
    pub fill_percent: f32,

    #[serde(default)]
    pub receives_signals: bool,
    #[serde(default = "yes")]
    pub has_thing_id_number: bool,
    #[serde(default)]
    pub made_from_stuff: bool,
    #[serde(default)]
    pub stuff_props: Option<StuffProperties>,
    #[serde(default)]
    pub smeltable: bool,
    #[serde(default)]
    pub can_have_faction: bool,
    #[serde(default)]
    pub discard_on_destroyed: bool,
    #[serde(default)]
    pub damage_multipliers: Vec<DamageMultiplier>,
    #[serde(default)]
    pub tradeability: Tradeability,
    #[serde(default)]
    pub tick_kind: TickerKind,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub ingestible: Option<IngestibleProperties>,
    #[serde(default = "white")]
    pub color: [f32; 4],
    #[serde(default)]
    pub comps: Vec<CompProperties>,
}

impl ThingDef {
    /// Minimal def of the given category; everything else at defaults
    pub fn new(def_name: impl Into<String>, category: ThingCategory) -> Self {
        Self {
            def_name: def_name.into(),
            label: None,
            category,
            stack_limit: 1,
            use_hit_points: false,
            max_hit_points: default_max_hit_points(),
            starting_hp_range: default_hp_range(),
            destroyable: true,
            size: unit_size(),
            passability: Traversability::Standable,
            path_cost: 0,
            affects_regions: false,
            affects_reachability: false,
            drawer_type: DrawerType::MapMeshOnly,
            linked_graphic: false,
            can_overlap_zones: true,
            fill_percent: 0.0,
            receives_signals: false,
            has_thing_id_number: true,
            made_from_stuff: false,
            stuff_props: None,
            smeltable: false,
            can_have_faction: false,
            discard_on_destroyed: false,
            damage_multipliers: Vec::new(),
            tradeability: Tradeability::All,
            tick_kind: TickerKind::Never,
            capabilities: Capabilities::default(),
            ingestible: None,
            color: white(),
            comps: Vec::new(),
        }
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.size[0], self.size[1])
    }

    pub fn is_single_cell(&self) -> bool {
        self.size() == IVec2::ONE
    }

    pub fn is_item(&self) -> bool {
        self.category == ThingCategory::Item
    }

    /// Things of this type keep their identity after being destroyed
    pub fn persists_after_destroy(&self) -> bool {
        self.category == ThingCategory::Pawn
    }

    /// Spawning or despawning this type changes the perceived path cost
    pub fn affects_path_cost(&self) -> bool {
        self.path_cost != 0 || self.passability == Traversability::Impassable
    }

    pub fn is_stuff(&self) -> bool {
        self.stuff_props.is_some()
    }

    pub fn damage_multiplier_for(&self, damage_def: &str) -> Option<f32> {
        self.damage_multipliers
            .iter()
            .find(|m| m.damage_def == damage_def)
            .map(|m| m.multiplier)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.def_name)
    }
}

// Defs are unique by name within a database
impl PartialEq for ThingDef {
    fn eq(&self, other: &Self) -> bool {
        self.def_name == other.def_name
    }
}

impl Eq for ThingDef {}

impl std::hash::Hash for ThingDef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.def_name.hash(state);
    }
}

fn yes() -> bool {
    true
}

fn one_u32() -> u32 {
    1
}

fn one_f32() -> f32 {
    1.0
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn unit_size() -> [i32; 2] {
    [1, 1]
}

fn default_max_hit_points() -> i32 {
    100
}

fn default_hp_range() -> FloatRange {
    FloatRange::new(1.0, 1.0)
}

fn default_max_ingest() -> u32 {
    1
}
