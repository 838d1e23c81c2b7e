use crate::error::Result;
use crate::grid::Grid;
use log::trace;
use rand::Rng;
use segregation_common::Coord;

/// A resident bound to one grid cell.
///
/// The agent does not hold its grid. Every operation borrows the grid the
/// population was built on, which outlives all of its agents.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    kind: u8,
    tolerance_low: f64,
    tolerance_high: f64,
    coord: Coord,
}

impl Agent {
    /// Creates an agent already sitting on `coord`; the cell must hold `kind`.
    pub fn new(kind: u8, coord: Coord, tolerance_low: f64, tolerance_high: f64) -> Self {
        Self { kind, tolerance_low, tolerance_high, coord }
    }

    pub fn kind(&self) -> u8 { self.kind }
    pub fn coord(&self) -> Coord { self.coord }

    /// Whether the same-type neighbor share (0-100) lies inside the tolerance
    /// band, together with the raw fraction in `[0, 1]`.
    pub fn is_satisfied(&self, grid: &Grid) -> (bool, f64) {
        let fraction = grid.neighbor_same_type_fraction(self.coord, self.kind);
        let percent = fraction * 100.0;
        let satisfied = percent >= self.tolerance_low && percent <= self.tolerance_high;
        (satisfied, fraction)
    }

    /// Moves to a random free cell. The new cell is claimed before the old one
    /// is released, so the agent never lands where it started.
    pub fn relocate<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<()> {
        let target = grid.allocate_free_cell(rng)?;
        grid.occupy(target, self.kind);
        grid.vacate(self.coord);
        trace!(
            "type {} moved ({}, {}) -> ({}, {})",
            self.kind, self.coord.row, self.coord.col, target.row, target.col
        );
        self.coord = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegregationError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn place(grid: &mut Grid, coord: Coord, kind: u8) -> Agent {
        grid.occupy(coord, kind);
        Agent::new(kind, coord, 50.0, 100.0)
    }

    #[test]
    fn band_edges_are_inclusive() {
        let mut grid = Grid::new(3, 1, 1).unwrap();
        let a = place(&mut grid, Coord::new(0, 1), 1);
        place(&mut grid, Coord::new(0, 0), 1);
        place(&mut grid, Coord::new(0, 2), 2);

        let (ok, fraction) = a.is_satisfied(&grid);
        assert_eq!(fraction, 0.5);
        assert!(ok);

        let strict = Agent::new(1, Coord::new(0, 1), 51.0, 100.0);
        assert!(!strict.is_satisfied(&grid).0);
        let capped = Agent::new(1, Coord::new(0, 1), 0.0, 50.0);
        assert!(capped.is_satisfied(&grid).0);
    }

    #[test]
    fn relocate_moves_type_and_frees_old_cell() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = Grid::new(3, 3, 1).unwrap();
        let start = grid.allocate_free_cell(&mut rng).unwrap();
        let mut agent = place(&mut grid, start, 2);

        agent.relocate(&mut grid, &mut rng).unwrap();

        assert_ne!(agent.coord(), start);
        assert_eq!(grid.cell(agent.coord()), 2);
        assert_eq!(grid.cell(start), crate::grid::EMPTY);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.free_count(), 8);
        assert!(grid.padding_is_consistent());
    }

    #[test]
    fn relocate_on_full_grid_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(1, 1, 1).unwrap();
        let start = grid.allocate_free_cell(&mut rng).unwrap();
        let mut agent = place(&mut grid, start, 1);

        assert_eq!(agent.relocate(&mut grid, &mut rng), Err(SegregationError::NoFreeCells));
        assert_eq!(agent.coord(), start);
        assert_eq!(grid.cell(start), 1);
    }
}
