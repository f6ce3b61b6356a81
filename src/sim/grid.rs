//! Blocked cells for the reference environment
//!
//! Cell-based blocking in grid space with O(1) lookup, plus the straight-line
//! rasterization used for line-of-sight and obstacle queries.

use ahash::AHashSet;

use crate::core::types::GridPos;

/// Set of blocked grid cells inside a rectangular area
#[derive(Debug, Clone)]
pub struct BlockedCells {
    cells: AHashSet<GridPos>,
    width: i32,
    height: i32,
}

impl BlockedCells {
    /// Create an area of `width` x `height` cells with nothing blocked
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            cells: AHashSet::new(),
            width,
            height,
        }
    }

    pub fn block(&mut self, cell: GridPos) {
        self.cells.insert(cell);
    }

    pub fn unblock(&mut self, cell: GridPos) {
        self.cells.remove(&cell);
    }

    /// Block every cell on a straight line, both ends included
    pub fn block_line(&mut self, from: GridPos, to: GridPos) {
        for cell in line_cells(from, to) {
            self.block(cell);
        }
    }

    /// Blocked or outside the area
    pub fn is_blocked(&self, cell: GridPos) -> bool {
        !self.in_bounds(cell) || self.cells.contains(&cell)
    }

    pub fn in_bounds(&self, cell: GridPos) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Cells on the straight line from `from` to `to` (Bresenham), both ends included
pub fn line_cells(from: GridPos, to: GridPos) -> Vec<GridPos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        cells.push(GridPos::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_cells_insert_remove() {
        let mut blocked = BlockedCells::new(20, 20);

        blocked.block(GridPos::new(5, 10));
        blocked.block(GridPos::new(5, 11));

        assert!(blocked.is_blocked(GridPos::new(5, 10)));
        assert!(blocked.is_blocked(GridPos::new(5, 11)));
        assert!(!blocked.is_blocked(GridPos::new(5, 12)));

        blocked.unblock(GridPos::new(5, 10));
        assert!(!blocked.is_blocked(GridPos::new(5, 10)));
        assert_eq!(blocked.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let blocked = BlockedCells::new(10, 10);
        assert!(blocked.is_empty());
        assert!(blocked.is_blocked(GridPos::new(-1, 0)));
        assert!(blocked.is_blocked(GridPos::new(10, 5)));
        assert!(!blocked.is_blocked(GridPos::new(9, 9)));
    }

    #[test]
    fn test_line_cells_endpoints() {
        let line = line_cells(GridPos::new(0, 0), GridPos::new(5, 2));
        assert_eq!(line.first(), Some(&GridPos::new(0, 0)));
        assert_eq!(line.last(), Some(&GridPos::new(5, 2)));
        assert_eq!(line.len(), 6);
    }

    #[test]
    fn test_line_cells_single_point() {
        assert_eq!(line_cells(GridPos::new(3, 3), GridPos::new(3, 3)), vec![GridPos::new(3, 3)]);
    }

    #[test]
    fn test_block_line() {
        let mut blocked = BlockedCells::new(20, 20);
        blocked.block_line(GridPos::new(10, 0), GridPos::new(10, 4));
        assert_eq!(blocked.len(), 5);
        assert!(blocked.is_blocked(GridPos::new(10, 2)));
    }
}
