use crate::error::{Result, SegregationError};
use log::trace;
use rand::Rng;
use segregation_common::Coord;

/// Lattice value of a cell nobody lives in.
pub const EMPTY: u8 = 0;

/// The spatial lattice plus a halo-bordered mirror used for neighborhood scans.
///
/// `cells` is `width * height`, row-major. `padded` is
/// `(width + 2r) * (height + 2r)` and always equals `cells` shifted by `(r, r)`
/// with an empty border, so a window scan never needs a bounds check.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    radius: usize,
    cells: Vec<u8>,
    padded: Vec<u8>,
    /// Flat indices of every empty cell, in no particular order.
    free: Vec<usize>,
}

impl Grid {
    /// Allocates an empty grid with every cell free.
    pub fn new(width: usize, height: usize, radius: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SegregationError::InvalidDimension { width, height, radius });
        }
        let padded_len = (width + 2 * radius) * (height + 2 * radius);
        Ok(Self {
            width,
            height,
            radius,
            cells: vec![EMPTY; width * height],
            padded: vec![EMPTY; padded_len],
            free: (0..width * height).collect(),
        })
    }

    #[inline(always)]
    pub fn width(&self) -> usize { self.width }
    #[inline(always)]
    pub fn height(&self) -> usize { self.height }
    #[inline(always)]
    pub fn radius(&self) -> usize { self.radius }

    /// Number of cells currently free.
    pub fn free_count(&self) -> usize { self.free.len() }

    /// Number of cells holding an agent.
    pub fn occupied_count(&self) -> usize { self.cells.len() - self.free.len() }

    /// Lattice value at `coord`, `EMPTY` when vacant.
    pub fn cell(&self, coord: Coord) -> u8 {
        self.cells[coord.to_index(self.width)]
    }

    /// Row-major view of the lattice, for renderers.
    pub fn cells(&self) -> &[u8] { &self.cells }

    #[inline(always)]
    fn padded_width(&self) -> usize { self.width + 2 * self.radius }

    #[inline(always)]
    fn padded_index(&self, coord: Coord) -> usize {
        (coord.row + self.radius) * self.padded_width() + coord.col + self.radius
    }

    /// Draws a uniformly random free cell and removes it from the free set.
    pub fn allocate_free_cell<R: Rng>(&mut self, rng: &mut R) -> Result<Coord> {
        if self.free.is_empty() {
            return Err(SegregationError::NoFreeCells);
        }
        let pick = rng.random_range(0..self.free.len());
        // Order of the free set carries no meaning, so swap_remove keeps this O(1).
        let index = self.free.swap_remove(pick);
        Ok(Coord::from_index(index, self.width))
    }

    /// Writes `kind` into both lattices. The caller must already own the cell
    /// through `allocate_free_cell`.
    pub fn occupy(&mut self, coord: Coord, kind: u8) {
        debug_assert!(kind != EMPTY);
        let idx = coord.to_index(self.width);
        let padded_idx = self.padded_index(coord);
        self.cells[idx] = kind;
        self.padded[padded_idx] = kind;
    }

    /// Empties `coord` in both lattices and returns it to the free set.
    pub fn vacate(&mut self, coord: Coord) {
        let idx = coord.to_index(self.width);
        let padded_idx = self.padded_index(coord);
        self.cells[idx] = EMPTY;
        self.padded[padded_idx] = EMPTY;
        self.free.push(idx);
        trace!("vacated cell ({}, {})", coord.row, coord.col);
    }

    /// Share of occupied neighbors within `radius` that hold `kind`.
    ///
    /// The center cell is not counted. A cell with no occupied neighbors
    /// reports `1.0`.
    pub fn neighbor_same_type_fraction(&self, coord: Coord, kind: u8) -> f64 {
        let r = self.radius;
        let span = 2 * r + 1;
        let padded_width = self.padded_width();
        // Window top-left in padded space is (row, col) since the halo offsets by r.
        let origin = coord.row * padded_width + coord.col;

        let mut occupied = 0u32;
        let mut same = 0u32;
        for dy in 0..span {
            let row = &self.padded[origin + dy * padded_width..origin + dy * padded_width + span];
            for (dx, &value) in row.iter().enumerate() {
                if value == EMPTY || (dy == r && dx == r) {
                    continue;
                }
                occupied += 1;
                if value == kind {
                    same += 1;
                }
            }
        }

        if occupied == 0 {
            1.0
        } else {
            same as f64 / occupied as f64
        }
    }

    /// Returns the grid to its freshly created state.
    pub fn reset(&mut self) {
        self.cells.fill(EMPTY);
        self.padded.fill(EMPTY);
        self.free.clear();
        self.free.extend(0..self.width * self.height);
    }

    /// Padded interior equals the lattice and the border is empty.
    #[cfg(test)]
    pub(crate) fn padding_is_consistent(&self) -> bool {
        let r = self.radius;
        let pw = self.padded_width();
        let ph = self.height + 2 * r;
        (0..ph).all(|prow| {
            (0..pw).all(|pcol| {
                let value = self.padded[prow * pw + pcol];
                let inside = prow >= r && prow < r + self.height && pcol >= r && pcol < r + self.width;
                if inside {
                    value == self.cell(Coord::new(prow - r, pcol - r))
                } else {
                    value == EMPTY
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(Grid::new(0, 4, 1), Err(SegregationError::InvalidDimension { .. })));
        assert!(matches!(Grid::new(4, 0, 1), Err(SegregationError::InvalidDimension { .. })));
    }

    #[test]
    fn new_grid_is_all_free() {
        let grid = Grid::new(5, 3, 2).unwrap();
        assert_eq!(grid.free_count(), 15);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.padded.len(), 9 * 7);
    }

    #[test]
    fn allocating_every_cell_then_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(3, 3, 1).unwrap();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..9 {
            let c = grid.allocate_free_cell(&mut rng).unwrap();
            assert!(seen.insert(c), "cell {:?} handed out twice", c);
        }
        assert_eq!(grid.allocate_free_cell(&mut rng), Err(SegregationError::NoFreeCells));
    }

    #[test]
    fn occupy_and_vacate_keep_both_lattices_in_step() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(4, 3, 2).unwrap();
        let a = grid.allocate_free_cell(&mut rng).unwrap();
        let b = grid.allocate_free_cell(&mut rng).unwrap();
        grid.occupy(a, 1);
        grid.occupy(b, 2);
        assert!(grid.padding_is_consistent());
        assert_eq!(grid.occupied_count(), 2);

        grid.vacate(a);
        assert_eq!(grid.cell(a), EMPTY);
        assert_eq!(grid.free_count(), 11);
        assert!(grid.padding_is_consistent());
    }

    #[test]
    fn fraction_counts_window_without_center() {
        let mut grid = Grid::new(3, 3, 1).unwrap();
        grid.occupy(Coord::new(1, 1), 1);
        grid.occupy(Coord::new(0, 0), 1);
        grid.occupy(Coord::new(0, 1), 2);
        grid.occupy(Coord::new(2, 2), 2);
        grid.occupy(Coord::new(1, 0), 1);

        // Center sees 2 same (0,0),(1,0) out of 4 occupied neighbors.
        assert_eq!(grid.neighbor_same_type_fraction(Coord::new(1, 1), 1), 0.5);
        // Corner (2,2) sees only (1,1) as an occupied neighbor.
        assert_eq!(grid.neighbor_same_type_fraction(Coord::new(2, 2), 2), 0.0);
    }

    #[test]
    fn isolated_cell_is_vacuously_satisfied() {
        let mut grid = Grid::new(4, 4, 1).unwrap();
        grid.occupy(Coord::new(0, 0), 1);
        grid.occupy(Coord::new(3, 3), 2);
        assert_eq!(grid.neighbor_same_type_fraction(Coord::new(0, 0), 1), 1.0);
    }

    #[test]
    fn zero_radius_sees_no_neighbors() {
        let mut grid = Grid::new(2, 2, 0).unwrap();
        grid.occupy(Coord::new(0, 0), 1);
        grid.occupy(Coord::new(0, 1), 2);
        assert_eq!(grid.neighbor_same_type_fraction(Coord::new(0, 0), 1), 1.0);
    }

    #[test]
    fn reset_restores_empty_state() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = Grid::new(4, 4, 1).unwrap();
        for kind in [1, 2, 1] {
            let c = grid.allocate_free_cell(&mut rng).unwrap();
            grid.occupy(c, kind);
        }
        grid.reset();
        assert_eq!(grid.free_count(), 16);
        assert!(grid.cells().iter().all(|&v| v == EMPTY));
        assert!(grid.padding_is_consistent());
    }
}
