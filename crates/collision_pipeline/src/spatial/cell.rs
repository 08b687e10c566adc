//! Integer grid coordinates

use std::fmt;

use crate::foundation::math::Rect;

/// Integer coordinates of a grid cell.
///
/// Ordering is lexicographic on `(x, y)`. The grid relies on this total order
/// to visit every unordered pair of neighbouring cells exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellKey {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

/// Offsets of the 8 cells surrounding a cell
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

impl CellKey {
    /// Create a key from coordinates
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a world-space point
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(x: f32, y: f32, cell_size: f32) -> Self {
        // `as` saturates, so points far outside the i32 range clamp to the border cells
        Self::new((x / cell_size).floor() as i32, (y / cell_size).floor() as i32)
    }

    /// Pack both coordinates into a single 64-bit value (x in the high half)
    #[allow(clippy::cast_sign_loss)]
    pub const fn pack(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    /// Inverse of [`pack`](Self::pack)
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn unpack(bits: u64) -> Self {
        Self::new((bits >> 32) as u32 as i32, bits as u32 as i32)
    }

    /// Key shifted by a cell offset
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// The 8 surrounding cells
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        NEIGHBOR_OFFSETS.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Square block of `(2 * radius + 1)^2` cells centered on this one, row by row
    pub fn block(self, radius: i32) -> impl Iterator<Item = Self> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| self.offset(dx, dy)))
    }

    /// Chebyshev (king-move) distance between two cells
    pub fn ring_distance(self, other: Self) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        #[allow(clippy::cast_possible_truncation)]
        let distance = dx.max(dy) as u32;
        distance
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of cells covered by a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Lowest covered cell
    pub min: CellKey,
    /// Highest covered cell (inclusive)
    pub max: CellKey,
}

impl CellRange {
    /// Cells spanned by `bounds`: `floor(min / size) ..= floor(max / size)` on both axes
    pub fn covering(bounds: &Rect, cell_size: f32) -> Self {
        let min = bounds.min();
        let max = bounds.max();
        Self {
            min: CellKey::containing(min.x, min.y, cell_size),
            max: CellKey::containing(max.x, max.y, cell_size),
        }
    }

    /// Iterate all cells in the range, row by row
    pub fn iter(self) -> impl Iterator<Item = CellKey> {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| CellKey::new(x, y)))
    }

    /// Number of cells in the range
    pub fn len(self) -> usize {
        let width = i64::from(self.max.x) - i64::from(self.min.x) + 1;
        let height = i64::from(self.max.y) - i64::from(self.min.y) + 1;
        usize::try_from(width.max(0) * height.max(0)).unwrap_or(usize::MAX)
    }

    /// True if the range covers no cells
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_round_trip_negative() {
        for key in [CellKey::new(-3, 7), CellKey::new(i32::MIN, i32::MAX), CellKey::new(0, -1)] {
            assert_eq!(CellKey::unpack(key.pack()), key);
        }
    }

    #[test]
    fn test_neighbor_order_visits_each_pair_once() {
        let center = CellKey::new(0, 0);
        let mut visited = Vec::new();

        for cell in center.block(2) {
            for neighbor in cell.neighbors() {
                if neighbor > cell {
                    let pair = (cell.min(neighbor), cell.max(neighbor));
                    assert!(!visited.contains(&pair), "visited {pair:?} twice");
                    visited.push(pair);
                }
            }
        }

        // Every adjacent pair inside the block shows up in exactly one direction
        let inside = center.block(2).collect::<Vec<_>>();
        for a in &inside {
            for b in a.neighbors().filter(|b| inside.contains(b)) {
                assert!(visited.contains(&((*a).min(b), (*a).max(b))));
            }
        }
    }

    #[test]
    fn test_covering_uses_floor() {
        let range = CellRange::covering(&Rect::new(-10.0, 5.0, 80.0, 10.0), 32.0);

        assert_eq!(range.min, CellKey::new(-1, 0));
        assert_eq!(range.max, CellKey::new(2, 0));
        assert_eq!(range.len(), 4);
        assert_eq!(range.iter().count(), 4);
    }

    #[test]
    fn test_block_and_ring_distance() {
        let center = CellKey::new(4, -4);
        let block = center.block(1).collect::<Vec<_>>();

        assert_eq!(block.len(), 9);
        assert!(block.iter().all(|cell| cell.ring_distance(center) <= 1));
        assert_eq!(center.block(2).filter(|cell| cell.ring_distance(center) == 2).count(), 16);
    }
}
