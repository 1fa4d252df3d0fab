use std::collections::VecDeque;

/// Solid/empty tile grid used while carving a cave.
///
/// Coordinates are signed so carve loops can step outside the grid; every
/// out-of-range write is dropped and every out-of-range read reports solid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaveGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl CaveGrid {
    /// Grid with every cell solid.
    pub fn solid(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width * height],
        }
    }

    /// Grid with every cell empty.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// True for cells on the outermost ring.
    pub fn is_ring(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y)
            && (x == 0 || y == 0 || x as usize == self.width - 1 || y as usize == self.height - 1)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Read a cell; anything outside the grid counts as solid.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(true, |idx| self.cells[idx])
    }

    /// Write a cell. Returns `false` when the write was clipped.
    pub fn set(&mut self, x: i32, y: i32, solid: bool) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = solid;
                true
            }
            None => false,
        }
    }

    /// Mark a cell empty (clipped).
    pub fn carve(&mut self, x: i32, y: i32) -> bool {
        self.set(x, y, false)
    }

    /// Force the outer ring solid.
    pub fn fill_ring(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set(x, 0, true);
            self.set(x, h - 1, true);
        }
        for y in 0..h {
            self.set(0, y, true);
            self.set(w - 1, y, true);
        }
    }

    /// Count solid cells in the 3x3 window centred on `(x, y)`, the centre
    /// included. Out-of-bounds neighbours count as solid.
    pub fn solid_window(&self, x: i32, y: i32) -> u8 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.is_solid(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Cells of row `y` (solid = `true`).
    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Total number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// 4-connected flood fill over empty cells.
    ///
    /// Returns a reachability mask in row-major order. A solid or
    /// out-of-range start reaches nothing.
    pub fn flood_fill(&self, start: (i32, i32)) -> Vec<bool> {
        let mut reached = vec![false; self.cells.len()];
        let Some(start_idx) = self.index(start.0, start.1) else {
            return reached;
        };
        if self.cells[start_idx] {
            return reached;
        }
        reached[start_idx] = true;
        let mut queue = VecDeque::from([start]);
        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (x + dx, y + dy);
                if let Some(idx) = self.index(nx, ny) {
                    if !self.cells[idx] && !reached[idx] {
                        reached[idx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_solid_and_writes_clip() {
        let mut grid = CaveGrid::empty(4, 3);
        assert!(grid.is_solid(-1, 0));
        assert!(grid.is_solid(4, 2));
        assert!(!grid.is_solid(3, 2));
        assert!(!grid.carve(-1, 5));
        assert!(!grid.set(4, 0, true));
        assert_eq!(grid.solid_count(), 0);
    }

    #[test]
    fn window_counts_centre_and_outside() {
        let grid = CaveGrid::empty(5, 5);
        // Corner: five of nine window cells lie outside.
        assert_eq!(grid.solid_window(0, 0), 5);
        assert_eq!(grid.solid_window(2, 2), 0);
        let solid = CaveGrid::solid(5, 5);
        assert_eq!(solid.solid_window(2, 2), 9);
    }

    #[test]
    fn ring_fill_leaves_interior() {
        let mut grid = CaveGrid::empty(5, 4);
        grid.fill_ring();
        assert_eq!(grid.solid_count(), 5 * 4 - 3 * 2);
        assert!(grid.is_ring(4, 1));
        assert!(!grid.is_ring(2, 2));
        assert!(!grid.is_ring(7, 7));
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let mut grid = CaveGrid::empty(5, 3);
        for y in 0..3 {
            grid.set(2, y, true);
        }
        let reached = grid.flood_fill((0, 0));
        assert_eq!(reached.iter().filter(|r| **r).count(), 6);
        assert!(!reached[4]);
        assert!(grid.flood_fill((2, 1)).iter().all(|r| !r));
    }

    #[test]
    fn flood_fill_ignores_diagonals() {
        let mut grid = CaveGrid::solid(3, 3);
        grid.carve(0, 0);
        grid.carve(1, 1);
        let reached = grid.flood_fill((0, 0));
        assert_eq!(reached.iter().filter(|r| **r).count(), 1);
    }
}
