//! Uniform hash grid
//!
//! Cells hold slot indices into the owning index's per-frame entity table.
//! The grid is rebuilt every frame with `clear()` followed by `insert()` for
//! each collidable entity; there is no per-entity removal.

use std::collections::BTreeMap;

use super::cell::{CellKey, CellRange};
use crate::foundation::math::Rect;

/// Entities whose bounds touch one grid cell
#[derive(Debug, Clone, Default)]
pub struct GridCell {
    entities: Vec<usize>,
}

impl GridCell {
    /// Slots stored in this cell, in insertion order
    pub fn entities(&self) -> &[usize] {
        &self.entities
    }

    /// Number of stored slots
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the cell holds nothing
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Uniform grid of entity lists keyed by cell coordinates
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f32,
    cells: BTreeMap<CellKey, GridCell>,
}

impl GridIndex {
    /// Create an empty grid
    pub const fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: BTreeMap::new(),
        }
    }

    /// Edge length of a cell in world units
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the cell size. Existing cells are dropped since their keys no
    /// longer match the new projection.
    pub fn resize(&mut self, cell_size: f32) {
        self.cell_size = cell_size;
        self.cells.clear();
    }

    /// Cells spanned by `bounds` at the current cell size
    pub fn cell_range(&self, bounds: &Rect) -> CellRange {
        CellRange::covering(bounds, self.cell_size)
    }

    /// Append `slot` to every cell spanned by `bounds`, creating cells on
    /// first use. Cells for which `is_owned` returns true are skipped.
    ///
    /// Returns the number of cells the slot was stored in.
    pub fn insert(
        &mut self,
        slot: usize,
        bounds: &Rect,
        is_owned: impl Fn(CellKey) -> bool,
    ) -> usize {
        let mut stored = 0;
        for key in self.cell_range(bounds).iter() {
            if is_owned(key) {
                continue;
            }
            self.cells.entry(key).or_default().entities.push(slot);
            stored += 1;
        }
        stored
    }

    /// Slots stored in the cell at `(x, y)`, empty if the cell does not exist
    pub fn get_cell(&self, x: i32, y: i32) -> &[usize] {
        match self.get(CellKey::new(x, y)) {
            Some(cell) => cell.entities(),
            None => &[],
        }
    }

    /// Cell at `key`
    pub fn get(&self, key: CellKey) -> Option<&GridCell> {
        self.cells.get(&key)
    }

    /// Whether a cell exists at `key`
    pub fn contains(&self, key: CellKey) -> bool {
        self.cells.contains_key(&key)
    }

    /// Detach a cell from the grid
    pub fn remove(&mut self, key: CellKey) -> Option<GridCell> {
        self.cells.remove(&key)
    }

    /// Iterate cells in key order
    pub fn iter(&self) -> impl Iterator<Item = (CellKey, &GridCell)> {
        self.cells.iter().map(|(key, cell)| (*key, cell))
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cell exists
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of stored slot references, counting multi-cell entities once per cell
    pub fn reference_count(&self) -> usize {
        self.cells.values().map(GridCell::len).sum()
    }

    /// Drop all cells
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_spans_inclusive_range() {
        let mut grid = GridIndex::new(10.0);

        let stored = grid.insert(0, &Rect::new(5.0, 5.0, 10.0, 10.0), |_| false);

        assert_eq!(stored, 4);
        assert_eq!(grid.get_cell(0, 0), &[0]);
        assert_eq!(grid.get_cell(1, 1), &[0]);
        assert!(grid.get_cell(2, 2).is_empty());
    }

    #[test]
    fn test_owned_cells_are_skipped() {
        let mut grid = GridIndex::new(10.0);
        let owned = CellKey::new(1, 0);

        let stored = grid.insert(3, &Rect::new(0.0, 0.0, 15.0, 5.0), |key| key == owned);

        assert_eq!(stored, 1);
        assert!(!grid.contains(owned));
        assert_eq!(grid.get_cell(0, 0), &[3]);
    }

    #[test]
    fn test_clear_and_resize_drop_cells() {
        let mut grid = GridIndex::new(10.0);
        grid.insert(0, &Rect::new(0.0, 0.0, 1.0, 1.0), |_| false);
        grid.insert(1, &Rect::new(0.0, 0.0, 1.0, 1.0), |_| false);

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.reference_count(), 2);

        grid.clear();
        assert!(grid.is_empty());

        grid.insert(0, &Rect::new(0.0, 0.0, 1.0, 1.0), |_| false);
        grid.resize(50.0);
        assert!(grid.is_empty());
        assert_eq!(grid.cell_size(), 50.0);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = GridIndex::new(32.0);
        grid.insert(7, &Rect::new(-40.0, -1.0, 2.0, 2.0), |_| false);

        assert_eq!(grid.get_cell(-2, -1), &[7]);
        assert_eq!(grid.get_cell(-2, 0), &[7]);
    }
}
