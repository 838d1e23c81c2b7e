use serde::{Deserialize, Serialize};

/// A cell position in the lattice, addressed as (row, column).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline(always)]
    pub fn new(row: usize, col: usize) -> Self { Self { row, col } }

    /// Builds a coordinate from a row-major flat index.
    #[inline(always)]
    pub fn from_index(index: usize, width: usize) -> Self {
        Self::new(index / width, index % width)
    }

    /// Row-major flat index of this coordinate.
    #[inline(always)]
    pub fn to_index(self, width: usize) -> usize { self.row * width + self.col }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_follows_row_major_order() {
        let c = Coord::from_index(7, 3);
        assert_eq!(c, Coord::new(2, 1));
        assert_eq!(c.to_index(3), 7);
        assert_eq!(Coord::from_index(0, 5), Coord::new(0, 0));
    }
}
