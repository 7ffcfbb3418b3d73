//! Moving and turning things
//!
//! Unspawned things just take the new value. Spawned ones are moved between
//! footprints on their map so the grid, regions and cover never disagree
//! with the thing's own position.

use std::sync::Arc;

use glam::IVec2;

use super::events::ThingEvent;
use super::lifecycle::relocate;
use super::World;
use crate::core::error::{Result, ThingError};
use crate::core::types::{CellRect, Rot4, ThingId};

impl World {
    pub fn set_position(&mut self, id: ThingId, cell: IVec2) -> Result<()> {
        let thing = self.require(id)?;
        if thing.position == cell {
            return Ok(());
        }
        let from = thing.position;
        let rotation = thing.rotation;
        self.relocate_thing(id, cell, rotation)?;
        self.events.push(ThingEvent::Moved {
            thing: id,
            from,
            to: cell,
        });
        Ok(())
    }

    /// Single-cell things re-register nothing when turned
    pub fn set_rotation(&mut self, id: ThingId, rotation: Rot4) -> Result<()> {
        let thing = self.require(id)?;
        if thing.rotation == rotation {
            return Ok(());
        }
        if !thing.spawned() || thing.def.is_single_cell() {
            if let Some(thing) = self.things.get_mut(&id) {
                thing.rotation = rotation;
            }
            return Ok(());
        }
        let cell = thing.position;
        self.relocate_thing(id, cell, rotation)
    }

    fn relocate_thing(&mut self, id: ThingId, cell: IVec2, rotation: Rot4) -> Result<()> {
        let thing = self.require(id)?;
        let Some(map_id) = thing.map() else {
            if let Some(thing) = self.things.get_mut(&id) {
                thing.position = cell;
                thing.rotation = rotation;
            }
            return Ok(());
        };

        let name = thing.to_string();
        let def = Arc::clone(&thing.def);
        let from = thing.occupied_rect();
        let to = CellRect::occupied(cell, rotation, def.size());

        let Some(map) = self.maps.get(&map_id) else {
            return self.reject(ThingError::StaleMapReference(map_id));
        };
        if !map.thing_grid.rect_in_bounds(&to) {
            return self.reject(ThingError::OutOfBounds { thing: name, cell });
        }
        if def.affects_regions && from != to {
            self.diagnostics
                .warning(ThingError::MovedRegionAffecter(name));
        }

        if let Some(map) = self.maps.get_mut(&map_id) {
            relocate(map, id, &def, &from, &to);
        }
        if let Some(thing) = self.things.get_mut(&id) {
            thing.position = cell;
            thing.rotation = rotation;
        }
        Ok(())
    }
}
