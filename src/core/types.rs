//! Core type definitions used throughout the codebase

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Process-unique identifier for things
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId(pub u32);

impl std::fmt::Display for ThingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier for a registered map
///
/// Map ids are never reused, so removing one map does not shift the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(pub u32);

/// Identifier for a non-spatial holder (inventory, container contents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderId(pub u32);

/// Identifier for factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    /// Load id used by the persistence layer
    pub fn load_id(&self) -> String {
        format!("Faction_{}", self.0)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Position used for things that have never been placed
pub const INVALID_CELL: IVec2 = IVec2::new(-1000, -1000);

/// Four-way rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rot4 {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rot4 {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Rot4::East | Rot4::West)
    }

    pub fn as_int(&self) -> u8 {
        match self {
            Rot4::North => 0,
            Rot4::East => 1,
            Rot4::South => 2,
            Rot4::West => 3,
        }
    }

    pub fn from_int(value: u8) -> Self {
        match value % 4 {
            0 => Rot4::North,
            1 => Rot4::East,
            2 => Rot4::South,
            _ => Rot4::West,
        }
    }

    pub fn rotated_clockwise(&self) -> Self {
        Self::from_int(self.as_int() + 1)
    }
}

/// Inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl CellRect {
    pub fn single(cell: IVec2) -> Self {
        Self { min: cell, max: cell }
    }

    /// Footprint of a thing of `size` standing at `center` with `rot`
    ///
    /// Even-sized footprints lean towards positive coordinates when facing
    /// north or east and towards negative coordinates otherwise, so that a
    /// half-turn maps the footprint onto itself around the same anchor.
    pub fn occupied(center: IVec2, rot: Rot4, size: IVec2) -> Self {
        let rotated = if rot.is_horizontal() { IVec2::new(size.y, size.x) } else { size };
        if rotated == IVec2::ONE {
            return Self::single(center);
        }

        let lean_negative = matches!(rot, Rot4::South | Rot4::West);
        let offset = |extent: i32| -> i32 {
            if extent % 2 == 0 && lean_negative {
                extent / 2
            } else {
                (extent - 1) / 2
            }
        };

        let min = IVec2::new(center.x - offset(rotated.x), center.y - offset(rotated.y));
        Self { min, max: min + rotated - IVec2::ONE }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn area(&self) -> usize {
        (self.width().max(0) * self.height().max(0)) as usize
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Iterate cells row by row
    pub fn cells(&self) -> impl Iterator<Item = IVec2> {
        let CellRect { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
    }

    /// Rectangle grown by `amount` cells on every side
    pub fn expanded_by(&self, amount: i32) -> Self {
        Self {
            min: self.min - IVec2::splat(amount),
            max: self.max + IVec2::splat(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thing_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<ThingId, &str> = HashMap::new();
        map.insert(ThingId(7), "steel");
        assert_eq!(map.get(&ThingId(7)), Some(&"steel"));
        assert_ne!(ThingId(7), ThingId(8));
    }

    #[test]
    fn test_rot4_cycle() {
        assert_eq!(Rot4::North.rotated_clockwise(), Rot4::East);
        assert_eq!(Rot4::West.rotated_clockwise(), Rot4::North);
        assert!(Rot4::East.is_horizontal());
        assert!(!Rot4::South.is_horizontal());
    }

    #[test]
    fn test_single_cell_footprint_ignores_rotation() {
        let cell = IVec2::new(4, 9);
        for rot in [Rot4::North, Rot4::East, Rot4::South, Rot4::West] {
            assert_eq!(CellRect::occupied(cell, rot, IVec2::ONE), CellRect::single(cell));
        }
    }

    #[test]
    fn test_odd_footprint_is_centered() {
        let rect = CellRect::occupied(IVec2::new(5, 5), Rot4::North, IVec2::new(3, 1));
        assert_eq!(rect.min, IVec2::new(4, 5));
        assert_eq!(rect.max, IVec2::new(6, 5));

        // Turning a 3x1 footprint east makes it 1x3
        let turned = CellRect::occupied(IVec2::new(5, 5), Rot4::East, IVec2::new(3, 1));
        assert_eq!(turned.min, IVec2::new(5, 4));
        assert_eq!(turned.max, IVec2::new(5, 6));
    }

    #[test]
    fn test_even_footprint_leans_with_rotation() {
        let north = CellRect::occupied(IVec2::new(5, 5), Rot4::North, IVec2::new(2, 2));
        assert_eq!(north.min, IVec2::new(5, 5));
        let south = CellRect::occupied(IVec2::new(5, 5), Rot4::South, IVec2::new(2, 2));
        assert_eq!(south.min, IVec2::new(4, 4));
        assert_eq!(north.area(), 4);
        assert_eq!(south.cells().count(), 4);
    }

    #[test]
    fn test_rect_contains_and_expand() {
        let rect = CellRect::single(IVec2::new(2, 2)).expanded_by(1);
        assert_eq!(rect.area(), 9);
        assert!(rect.contains(IVec2::new(1, 3)));
        assert!(!rect.contains(IVec2::new(4, 2)));
    }

    #[test]
    fn test_faction_load_id() {
        assert_eq!(FactionId(3).load_id(), "Faction_3");
    }
}
