//! Fixed-size square grid of cell property flags.
//! This module exists so terrain and vision state share one indexed store.
//! Vision and routing live in submodules and only read or write cells through it.

mod ascii;
mod hash;
mod pathfinding;
mod visibility;

#[cfg(test)]
mod test_support;

pub use pathfinding::{diagonal_moves_enabled, route_cost, step_cost};
pub use visibility::Line;

use crate::error::MapError;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareMap {
    width: usize,
    height: usize,
    cells: Vec<CellFlags>,
}

impl SquareMap {
    /// Creates a map where every cell starts with no flags.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![CellFlags::empty(); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    /// Every in-grid position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos { y, x }))
    }

    pub fn cell(&self, pos: Pos) -> Result<CellFlags, MapError> {
        let idx = self.checked_index(pos)?;
        Ok(self.cells[idx])
    }

    /// Replaces the whole flag set of one cell.
    pub fn set_cell(&mut self, pos: Pos, flags: CellFlags) -> Result<(), MapError> {
        let idx = self.checked_index(pos)?;
        self.cells[idx] = flags;
        Ok(())
    }

    /// Resets every cell to exactly `flags`.
    pub fn clear(&mut self, flags: CellFlags) {
        self.cells.fill(flags);
    }

    pub fn set_transparent(&mut self, pos: Pos) -> Result<(), MapError> {
        self.insert_flags(pos, CellFlags::TRANSPARENT)
    }

    pub fn is_transparent(&self, pos: Pos) -> Result<bool, MapError> {
        Ok(self.cell(pos)?.contains(CellFlags::TRANSPARENT))
    }

    pub fn set_walkable(&mut self, pos: Pos) -> Result<(), MapError> {
        self.insert_flags(pos, CellFlags::WALKABLE)
    }

    pub fn is_walkable(&self, pos: Pos) -> Result<bool, MapError> {
        Ok(self.cell(pos)?.contains(CellFlags::WALKABLE))
    }

    /// Clears every flag of one cell, vision state included.
    pub fn set_empty(&mut self, pos: Pos) -> Result<(), MapError> {
        self.set_cell(pos, CellFlags::empty())
    }

    pub fn is_in_field_of_vision(&self, pos: Pos) -> Result<bool, MapError> {
        Ok(self.cell(pos)?.contains(CellFlags::VISIBLE))
    }

    pub fn is_explored(&self, pos: Pos) -> Result<bool, MapError> {
        Ok(self.cell(pos)?.contains(CellFlags::EXPLORED))
    }

    /// Removes `VISIBLE` everywhere; `EXPLORED` is untouched.
    pub fn clear_field_of_vision(&mut self) {
        self.remove_everywhere(CellFlags::VISIBLE);
    }

    pub fn clear_explored(&mut self) {
        self.remove_everywhere(CellFlags::EXPLORED);
    }

    pub fn visible_count(&self) -> usize {
        self.count_with(CellFlags::VISIBLE)
    }

    pub fn explored_count(&self) -> usize {
        self.count_with(CellFlags::EXPLORED)
    }

    fn insert_flags(&mut self, pos: Pos, flags: CellFlags) -> Result<(), MapError> {
        let idx = self.checked_index(pos)?;
        self.cells[idx].insert(flags);
        Ok(())
    }

    fn remove_everywhere(&mut self, flags: CellFlags) {
        for cell in &mut self.cells {
            cell.remove(flags);
        }
    }

    fn count_with(&self, flags: CellFlags) -> usize {
        self.cells.iter().filter(|cell| cell.contains(flags)).count()
    }

    fn checked_index(&self, pos: Pos) -> Result<usize, MapError> {
        if !self.in_bounds(pos) {
            return Err(MapError::OutOfRange { pos, width: self.width, height: self.height });
        }
        Ok(self.index(pos))
    }

    /// Caller guarantees `pos` is in bounds.
    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    fn position(&self, idx: usize) -> Pos {
        Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 }
    }

    /// Unchecked flag read for in-bounds positions used by the search loops.
    fn flags_at(&self, pos: Pos) -> CellFlags {
        self.cells[self.index(pos)]
    }

    fn mark(&mut self, pos: Pos, flags: CellFlags) {
        let idx = self.index(pos);
        self.cells[idx].insert(flags);
    }
}
