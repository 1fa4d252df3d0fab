//! Cave generation: cellular-automata noise plus explicit tunnel carving.
//!
//! Every call into [`SeededRng`] happens in a fixed order; peers only agree
//! on terrain because they replay exactly the same draws. Reordering a step,
//! skipping a draw, or adding one forks the level for every room.

use cavewar_core::SeededRng;
use tracing::{debug, instrument};

use crate::grid::CaveGrid;

const MAIN_TUNNEL_COUNT: (i32, i32) = (4, 7);
const EXTRA_TUNNEL_COUNT: (i32, i32) = (3, 6);
const CLIFF_COUNT: (i32, i32) = (5, 10);
const CHAMBER_COUNT: (i32, i32) = (3, 6);
const SIDE_BRANCH_INTERVAL: i32 = 15;
const BOTTOM_BRANCH_INTERVAL: i32 = 20;
const BRANCH_CHANCE: f64 = 0.05;
const EXTRA_TUNNEL_WIDEN_CHANCE: f64 = 0.6;

/// Cave generation parameters.
#[derive(Debug, Clone)]
pub struct CaveParams {
    /// Grid width in tiles.
    pub width: usize,
    /// Grid height in tiles.
    pub height: usize,
    /// Chance that an interior cell starts solid.
    pub fill_probability: f64,
    /// Number of smoothing passes.
    pub smoothing_passes: u32,
    /// Solid cells (out of the 3x3 window) needed for a cell to stay solid.
    pub solid_threshold: u8,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            width: 120,
            height: 64,
            fill_probability: 0.55,
            smoothing_passes: 5,
            solid_threshold: 5,
        }
    }
}

/// A rectangular room carved in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chamber {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Chamber {
    /// Iterate every cell of the chamber.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct CaveLayout {
    /// Final solid/empty grid.
    pub grid: CaveGrid,
    /// Interior cells carved by the perimeter and main tunnel passes.
    pub network: CaveGrid,
    /// Centre row of every main tunnel, in carve order.
    pub main_tunnels: Vec<i32>,
    /// Chambers in carve order.
    pub chambers: Vec<Chamber>,
}

impl CaveLayout {
    /// True when `(x, y)` belongs to the guaranteed tunnel network.
    pub fn is_network(&self, x: i32, y: i32) -> bool {
        // `network` marks network cells as "solid" so outside reads stay false.
        self.network.in_bounds(x, y) && self.network.is_solid(x, y)
    }
}

/// Seeded cave generator.
pub struct CaveGenerator {
    params: CaveParams,
    rng: SeededRng,
    grid: CaveGrid,
    network: CaveGrid,
}

impl CaveGenerator {
    /// Create a generator for `seed` with default parameters.
    pub fn new(seed: i32) -> Self {
        Self::with_params(seed, CaveParams::default())
    }

    pub fn with_params(seed: i32, params: CaveParams) -> Self {
        let grid = CaveGrid::solid(params.width, params.height);
        let network = CaveGrid::empty(params.width, params.height);
        Self {
            params,
            rng: SeededRng::new(seed),
            grid,
            network,
        }
    }

    /// Run every pass and return the finished layout.
    #[instrument(skip(self), fields(width = self.params.width, height = self.params.height))]
    pub fn generate(mut self) -> CaveLayout {
        self.random_fill();
        for _ in 0..self.params.smoothing_passes {
            self.smooth();
        }
        self.carve_perimeter_tunnels();
        let main_tunnels = self.carve_main_tunnels();
        self.carve_extra_tunnels();
        self.raise_cliffs();
        let chambers = self.carve_chambers(&main_tunnels);
        self.grid.fill_ring();
        debug!(
            tunnels = main_tunnels.len(),
            chambers = chambers.len(),
            solid = self.grid.solid_count(),
            "cave generated"
        );
        CaveLayout {
            grid: self.grid,
            network: self.network,
            main_tunnels,
            chambers,
        }
    }

    fn w(&self) -> i32 {
        self.params.width as i32
    }

    fn h(&self) -> i32 {
        self.params.height as i32
    }

    /// Carve a cell that must stay open: later solid structures skip it.
    fn open(&mut self, x: i32, y: i32) {
        self.grid.carve(x, y);
        if self.grid.in_bounds(x, y) && !self.grid.is_ring(x, y) {
            self.network.set(x, y, true);
        }
    }

    fn random_fill(&mut self) {
        let p = self.params.fill_probability;
        for y in 0..self.h() {
            for x in 0..self.w() {
                let solid = self.grid.is_ring(x, y) || self.rng.chance(p);
                self.grid.set(x, y, solid);
            }
        }
    }

    fn smooth(&mut self) {
        let mut next = CaveGrid::empty(self.params.width, self.params.height);
        for y in 0..self.h() {
            for x in 0..self.w() {
                let solid = self.grid.solid_window(x, y) >= self.params.solid_threshold;
                next.set(x, y, solid);
            }
        }
        self.grid = next;
    }

    fn carve_perimeter_tunnels(&mut self) {
        let (w, h) = (self.w(), self.h());

        let left = 1;
        for y in 2..h - 2 {
            for k in 0..3 {
                self.open(left + k, y);
            }
            if y % SIDE_BRANCH_INTERVAL == 0 || self.rng.chance(BRANCH_CHANCE) {
                for x in left + 3..(left + 20).min(w - 1) {
                    self.open(x, y);
                    self.open(x, y - 1);
                }
            }
        }

        let right = w - 2;
        for y in 2..h - 2 {
            for k in 0..3 {
                self.open(right - k, y);
            }
            if y % SIDE_BRANCH_INTERVAL == 0 || self.rng.chance(BRANCH_CHANCE) {
                let mut x = right - 3;
                while x > (right - 20).max(0) {
                    self.open(x, y);
                    self.open(x, y - 1);
                    x -= 1;
                }
            }
        }

        let bottom = h - 2;
        for x in 1..w - 1 {
            for k in 0..3 {
                self.open(x, bottom - k);
            }
            if x % BOTTOM_BRANCH_INTERVAL == 0 || self.rng.chance(BRANCH_CHANCE) {
                let mut y = bottom - 3;
                while y > (bottom - 25).max(2) {
                    self.open(x, y);
                    self.open(x - 1, y);
                    self.open(x + 1, y);
                    y -= 1;
                }
            }
        }

        // Corner links between the side corridors and the bottom corridor.
        for x in (1..5).chain(w - 5..w - 1) {
            for y in bottom - 2..=bottom {
                if y >= 2 && y < h - 1 {
                    self.open(x, y);
                }
            }
        }
    }

    fn carve_main_tunnels(&mut self) -> Vec<i32> {
        let (w, h) = (self.w(), self.h());
        let count = self.rng.range_i32(MAIN_TUNNEL_COUNT.0, MAIN_TUNNEL_COUNT.1);
        let low = (f64::from(h) * 0.1).floor() as i32;
        let high = (f64::from(h) * 0.9).floor() as i32;
        let mut rows: Vec<i32> = Vec::with_capacity(count.max(0) as usize);

        for t in 0..count {
            let ty = self.rng.range_i32(low, high);
            rows.push(ty);
            // Tunnel thickness draw; the carve below is always three rows.
            let _thickness = self.rng.range_i32(3, 5);

            for x in 5..w - 5 {
                let wobble = ((f64::from(x) * 0.05 + f64::from(t)).sin() * 2.0).floor() as i32;
                let cy = (ty + wobble).min(h - 3).max(2);
                if cy >= 2 && cy < h - 2 {
                    self.open(x, cy);
                    if cy - 1 >= 2 {
                        self.open(x, cy - 1);
                    }
                    if cy + 1 < h - 2 {
                        self.open(x, cy + 1);
                    }
                }
            }

            for y in (ty - 2).max(2)..=(ty + 2).min(h - 3) {
                if y >= 2 && y < h - 2 {
                    for x in (1..5).chain(w - 5..w - 1) {
                        self.open(x, y);
                    }
                }
            }

            if ty >= h - 15 {
                let cx = self.shaft_column();
                for y in ty..=h - 6 {
                    self.open_shaft_row(cx, y, 5, w - 5);
                }
            }

            if t > 0 {
                let prev = rows[t as usize - 1];
                let (top, bottom) = (ty.min(prev), ty.max(prev));
                let shafts = self.rng.range_i32(2, 4);
                for _ in 0..shafts {
                    let cx = self.shaft_column();
                    let mut y = top;
                    while y <= bottom && y < h - 1 {
                        self.open_shaft_row(cx, y, 5, w - 5);
                        y += 1;
                    }
                }
            }
        }
        rows
    }

    fn shaft_column(&mut self) -> i32 {
        let w = f64::from(self.w());
        self.rng
            .range_i32((w * 0.2).floor() as i32, (w * 0.8).floor() as i32)
    }

    /// Open `cx - 1 ..= cx + 1` on row `y`, keeping all three within
    /// `[min_x, max_x)`.
    fn open_shaft_row(&mut self, cx: i32, y: i32, min_x: i32, max_x: i32) {
        if cx >= min_x && cx < max_x {
            self.open(cx, y);
            if cx - 1 >= min_x {
                self.open(cx - 1, y);
            }
            if cx + 1 < max_x {
                self.open(cx + 1, y);
            }
        }
    }

    fn carve_extra_tunnels(&mut self) {
        let (w, h) = (self.w(), self.h());
        let count = self.rng.range_i32(EXTRA_TUNNEL_COUNT.0, EXTRA_TUNNEL_COUNT.1);
        for _ in 0..count {
            let ty = self.rng.range_i32(2, h - 3);
            let length = self.rng.range_i32(3, 6);
            let sx = self.rng.range_i32(5, w - length - 5);
            let mut x = sx;
            while x < sx + length && x < w - 5 {
                let wobble = ((f64::from(x) * 0.1).sin() * 1.5).floor() as i32;
                let cy = (ty + wobble).min(h - 3).max(2);
                if cy >= 2 && cy < h - 2 {
                    self.grid.carve(x, cy);
                    if cy - 1 >= 2 && self.rng.chance(EXTRA_TUNNEL_WIDEN_CHANCE) {
                        self.grid.carve(x, cy - 1);
                    }
                    if cy + 1 < h - 2 && self.rng.chance(EXTRA_TUNNEL_WIDEN_CHANCE) {
                        self.grid.carve(x, cy + 1);
                    }
                }
                x += 1;
            }
        }
    }

    /// Solid columns with cleared flanks. Network cells are never filled.
    fn raise_cliffs(&mut self) {
        let (w, h) = (self.w(), self.h());
        let count = self.rng.range_i32(CLIFF_COUNT.0, CLIFF_COUNT.1);
        for _ in 0..count {
            let sx = self.rng.range_i32(10, w - 10);
            let height = self.rng.range_i32(8, 20);
            let sy = self.rng.range_i32(5, h - height - 5);
            let width = self.rng.range_i32(3, 6);

            let mut y = sy;
            while y < sy + height && y < h - 2 {
                let mut x = sx;
                while x < sx + width && x < w - 5 {
                    let protected = self.network.in_bounds(x, y) && self.network.is_solid(x, y);
                    if !protected {
                        self.grid.set(x, y, true);
                    }
                    x += 1;
                }
                y += 1;
            }

            let mut y = sy;
            while y < sy + height && y < h - 2 {
                if sx - 1 >= 5 {
                    self.grid.carve(sx - 1, y);
                }
                if sx + width < w - 5 {
                    self.grid.carve(sx + width, y);
                }
                y += 1;
            }
        }
    }

    fn carve_chambers(&mut self, tunnels: &[i32]) -> Vec<Chamber> {
        let (w, h) = (self.w(), self.h());
        let count = self.rng.range_i32(CHAMBER_COUNT.0, CHAMBER_COUNT.1);
        let last = tunnels.len() as i32 - 1;
        let mut chambers = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let cw = self.rng.range_i32(5, 9);
            let ch = self.rng.range_i32(5, 8);
            let near = tunnels[self.rng.range_i32(0, last.min(2)) as usize];
            let jitter = self.rng.range_i32(-3, 3);
            let cy0 = (near + jitter).min(h - ch - 2).max(2);
            let cx0 = self.rng.range_i32(2, w - cw - 2);

            for y in (cy0..cy0 + ch).take_while(|y| *y < h - 1) {
                for x in (cx0..cx0 + cw).take_while(|x| *x < w - 1) {
                    self.grid.carve(x, y);
                }
            }
            chambers.push(Chamber {
                x: cx0,
                y: cy0,
                width: cw,
                height: ch,
            });

            let target = tunnels[self.rng.range_i32(0, last) as usize];
            let cx = cx0 + cw / 2;
            let centre = cy0 + ch / 2;
            let mut y = centre.min(target);
            while y <= centre.max(target) && y < h - 1 {
                if cx >= 1 && cx < w - 1 {
                    self.grid.carve(cx, y);
                    if cx - 1 >= 1 {
                        self.grid.carve(cx - 1, y);
                    }
                    if cx + 1 < w - 1 {
                        self.grid.carve(cx + 1, y);
                    }
                }
                y += 1;
            }
        }
        chambers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_grid() {
        let a = CaveGenerator::new(1234).generate();
        let b = CaveGenerator::new(1234).generate();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.main_tunnels, b.main_tunnels);
        assert_eq!(a.chambers, b.chambers);
    }

    #[test]
    fn different_seeds_differ() {
        let a = CaveGenerator::new(1).generate();
        let b = CaveGenerator::new(2).generate();
        assert_ne!(a.grid, b.grid);
    }

    #[test]
    fn ring_is_solid_and_network_is_open() {
        let layout = CaveGenerator::new(77).generate();
        let grid = &layout.grid;
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                if grid.is_ring(x, y) {
                    assert!(grid.is_solid(x, y), "ring cell ({x},{y}) open");
                    assert!(!layout.is_network(x, y));
                } else if layout.is_network(x, y) {
                    assert!(!grid.is_solid(x, y), "network cell ({x},{y}) filled");
                }
            }
        }
    }

    #[test]
    fn tunnel_and_chamber_counts_in_range() {
        for seed in [1, 5, 99, -42, i32::MAX] {
            let layout = CaveGenerator::new(seed).generate();
            assert!((4..=7).contains(&layout.main_tunnels.len()));
            assert!((3..=6).contains(&layout.chambers.len()));
            for row in &layout.main_tunnels {
                assert!((6..=57).contains(row));
            }
        }
    }

    #[test]
    fn perimeter_corridors_are_carved() {
        let layout = CaveGenerator::new(3).generate();
        let h = layout.grid.height() as i32;
        let w = layout.grid.width() as i32;
        for y in 2..h - 2 {
            for x in [1, 2, 3, w - 2, w - 3, w - 4] {
                assert!(!layout.grid.is_solid(x, y));
            }
        }
        for x in 1..w - 1 {
            for y in [h - 2, h - 3, h - 4] {
                assert!(!layout.grid.is_solid(x, y));
            }
        }
    }

    #[test]
    fn tiny_grids_are_clipped_not_rejected() {
        for (width, height) in [(10, 4), (120, 2), (1, 3), (2, 0), (0, 0), (6, 5)] {
            let params = CaveParams {
                width,
                height,
                ..CaveParams::default()
            };
            let layout = CaveGenerator::with_params(7, params).generate();
            let grid = &layout.grid;
            assert_eq!((grid.width(), grid.height()), (width, height));
            assert!((4..=7).contains(&layout.main_tunnels.len()));
            for y in 0..height as i32 {
                for x in 0..width as i32 {
                    if grid.is_ring(x, y) {
                        assert!(grid.is_solid(x, y), "{width}x{height}: ring ({x},{y}) open");
                    }
                }
            }
        }
    }

    #[test]
    fn chamber_cells_are_empty() {
        let layout = CaveGenerator::new(2024).generate();
        for chamber in &layout.chambers {
            for (x, y) in chamber.cells() {
                assert!(!layout.grid.is_solid(x, y));
            }
        }
    }
}
