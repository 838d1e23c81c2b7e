use serde::{Deserialize, Serialize};
use crate::coord::Coord;

/// Everything a renderer needs to draw one reported step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Step counter after the step completed.
    pub step: u32,
    /// Percentage of agents inside their tolerance band.
    pub satisfaction_rate: f64,
    /// Mean same-type neighbor fraction, as a percentage.
    pub segregation_index: f64,
    /// `groups[t - 1]` holds the cell of every agent of type `t`.
    pub groups: Vec<Vec<Coord>>,
    /// Cells of agents still unsatisfied once the step finished.
    pub unsatisfied: Vec<Coord>,
    /// Cells agents moved away from during the step.
    pub relocated_from: Vec<Coord>,
}
