//! Region listers: things bucketed by the coarse regions they touch

use ahash::AHashMap;
use glam::IVec2;

use crate::core::types::{CellRect, ThingId};

/// Sparse region buckets keyed by region coordinate
#[derive(Debug, Clone)]
pub struct RegionListers {
    region_size: i32,
    regions: AHashMap<IVec2, Vec<ThingId>>,
}

impl RegionListers {
    pub fn new(region_size: i32) -> Self {
        Self {
            region_size: region_size.max(1),
            regions: AHashMap::new(),
        }
    }

    #[inline]
    pub fn region_of(&self, cell: IVec2) -> IVec2 {
        IVec2::new(
            cell.x.div_euclid(self.region_size),
            cell.y.div_euclid(self.region_size),
        )
    }

    /// Every region touched by `rect`
    pub fn regions_touching(&self, rect: &CellRect) -> CellRect {
        CellRect {
            min: self.region_of(rect.min),
            max: self.region_of(rect.max),
        }
    }

    pub fn register(&mut self, thing: ThingId, rect: &CellRect) {
        for region in self.regions_touching(rect).cells() {
            let list = self.regions.entry(region).or_default();
            if !list.contains(&thing) {
                list.push(thing);
            }
        }
    }

    pub fn deregister(&mut self, thing: ThingId, rect: &CellRect) {
        for region in self.regions_touching(rect).cells() {
            if let Some(list) = self.regions.get_mut(&region) {
                list.retain(|&t| t != thing);
                if list.is_empty() {
                    self.regions.remove(&region);
                }
            }
        }
    }

    pub fn things_in_region(&self, region: IVec2) -> &[ThingId] {
        self.regions.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.regions.values().any(|list| list.contains(&thing))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}
