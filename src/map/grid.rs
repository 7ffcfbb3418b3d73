//! Dense per-cell grids

use glam::IVec2;

use crate::core::types::{CellRect, ThingId};

/// Generic 2D grid addressed by cell
#[derive(Debug, Clone)]
pub struct CellGrid<T: Clone + Default> {
    pub width: i32,
    pub height: i32,
    data: Vec<T>,
}

impl<T: Clone + Default> CellGrid<T> {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            data: vec![T::default(); len],
        }
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    #[inline]
    pub fn get(&self, cell: IVec2) -> Option<&T> {
        self.index(cell).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, cell: IVec2) -> Option<&mut T> {
        let i = self.index(cell)?;
        self.data.get_mut(i)
    }

    pub fn rect_in_bounds(&self, rect: &CellRect) -> bool {
        self.in_bounds(rect.min) && self.in_bounds(rect.max)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

/// Occupancy grid: which things stand on which cell
#[derive(Debug, Clone)]
pub struct ThingGrid {
    cells: CellGrid<Vec<ThingId>>,
}

impl ThingGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            cells: CellGrid::new(width, height),
        }
    }

    pub fn register(&mut self, thing: ThingId, rect: &CellRect) {
        for cell in rect.cells() {
            if let Some(list) = self.cells.get_mut(cell) {
                if !list.contains(&thing) {
                    list.push(thing);
                }
            }
        }
    }

    pub fn deregister(&mut self, thing: ThingId, rect: &CellRect) {
        for cell in rect.cells() {
            if let Some(list) = self.cells.get_mut(cell) {
                list.retain(|&t| t != thing);
            }
        }
    }

    pub fn things_at(&self, cell: IVec2) -> &[ThingId] {
        self.cells.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.cells.iter().any(|list| list.contains(&thing))
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        self.cells.in_bounds(cell)
    }

    pub fn rect_in_bounds(&self, rect: &CellRect) -> bool {
        self.cells.rect_in_bounds(rect)
    }
}

/// Cover grid: things providing cover and how much of the cell they fill
#[derive(Debug, Clone)]
pub struct CoverGrid {
    cells: CellGrid<Vec<(ThingId, f32)>>,
}

impl CoverGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            cells: CellGrid::new(width, height),
        }
    }

    /// Things filling nothing are not tracked
    pub fn register(&mut self, thing: ThingId, rect: &CellRect, fill_percent: f32) {
        if fill_percent <= 0.0 {
            return;
        }
        for cell in rect.cells() {
            if let Some(list) = self.cells.get_mut(cell) {
                if !list.iter().any(|(t, _)| *t == thing) {
                    list.push((thing, fill_percent));
                }
            }
        }
    }

    pub fn deregister(&mut self, thing: ThingId, rect: &CellRect) {
        for cell in rect.cells() {
            if let Some(list) = self.cells.get_mut(cell) {
                list.retain(|(t, _)| *t != thing);
            }
        }
    }

    /// The thing giving the most cover at `cell`
    pub fn cover_at(&self, cell: IVec2) -> Option<ThingId> {
        self.cells
            .get(cell)?
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(t, _)| *t)
    }

    pub fn contains(&self, thing: ThingId) -> bool {
        self.cells.iter().any(|list| list.iter().any(|(t, _)| *t == thing))
    }
}
