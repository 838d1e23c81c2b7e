use crate::agent::Agent;
use crate::error::{Result, SegregationError};
use crate::grid::Grid;
use log::{debug, info};
use rand::Rng;
use segregation_common::{Coord, SimParams};

// Slack allowed when checking that proportions sum to at most 1.0
const PROPORTION_EPSILON: f64 = 1e-9;

/// Every agent on the grid, in creation order, plus the bookkeeping used to
/// reconstruct type groupings.
#[derive(Debug, Clone)]
pub struct Population {
    agents: Vec<Agent>,
    /// `counts[t - 1]` agents were created with type `t`.
    counts: Vec<usize>,
    vacancy_percent: u32,
    proportions: Vec<f64>,
}

impl Population {
    pub fn len(&self) -> usize { self.agents.len() }
    pub fn is_empty(&self) -> bool { self.agents.is_empty() }
    pub fn agents(&self) -> &[Agent] { &self.agents }
    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] { &mut self.agents }
    pub fn counts(&self) -> &[usize] { &self.counts }
    pub fn vacancy_percent(&self) -> u32 { self.vacancy_percent }
    pub fn proportions(&self) -> &[f64] { &self.proportions }

    /// Current cell of every agent, grouped by type (`groups[t - 1]` for type `t`).
    pub fn groups(&self) -> Vec<Vec<Coord>> {
        let mut groups: Vec<Vec<Coord>> = self.counts.iter().map(|&n| Vec::with_capacity(n)).collect();
        for agent in &self.agents {
            groups[agent.kind() as usize - 1].push(agent.coord());
        }
        groups
    }
}

/// Splits `occupied` agents across `proportions.len() + 1` types.
///
/// Each listed type gets `occupied * p` rounded half-to-even, capped so the
/// running total never passes `occupied`. The last type takes whatever is left.
pub fn partition_counts(occupied: usize, proportions: &[f64]) -> Vec<usize> {
    let mut counts = Vec::with_capacity(proportions.len() + 1);
    let mut assigned = 0usize;
    for &p in proportions {
        let target = (occupied as f64 * p).round_ties_even() as usize;
        let count = target.min(occupied - assigned);
        counts.push(count);
        assigned += count;
    }
    counts.push(occupied - assigned);
    counts
}

fn validate(vacancy_percent: u32, proportions: &[f64], tolerance_low: f64, tolerance_high: f64) -> Result<()> {
    if vacancy_percent > 100 {
        return Err(SegregationError::InvalidProportions(format!(
            "vacancy percent {} exceeds 100",
            vacancy_percent
        )));
    }
    if proportions.len() + 1 > u8::MAX as usize {
        return Err(SegregationError::InvalidProportions(format!(
            "{} types requested, at most {} supported",
            proportions.len() + 1,
            u8::MAX
        )));
    }
    if let Some(bad) = proportions.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(SegregationError::InvalidProportions(format!("proportion {} outside [0, 1]", bad)));
    }
    let sum: f64 = proportions.iter().sum();
    if sum > 1.0 + PROPORTION_EPSILON {
        return Err(SegregationError::InvalidProportions(format!("proportions sum to {} > 1", sum)));
    }
    let in_range = |t: f64| (0.0..=100.0).contains(&t);
    if !in_range(tolerance_low) || !in_range(tolerance_high) || tolerance_low > tolerance_high {
        return Err(SegregationError::InvalidTolerance { low: tolerance_low, high: tolerance_high });
    }
    Ok(())
}

/// Builds an empty grid and fills it with agents on randomly drawn free cells.
///
/// Agents are created type by type, so the population is ordered by type.
#[allow(clippy::too_many_arguments)]
pub fn build<R: Rng>(
    width: usize,
    height: usize,
    vacancy_percent: u32,
    proportions: &[f64],
    tolerance_low: f64,
    tolerance_high: f64,
    radius: usize,
    rng: &mut R,
) -> Result<(Grid, Population)> {
    let mut grid = Grid::new(width, height, radius)?;
    let population = populate(&mut grid, vacancy_percent, proportions, tolerance_low, tolerance_high, rng)?;
    Ok((grid, population))
}

/// Same as [`build`], reading every input from derived parameters.
pub fn build_from_params<R: Rng>(params: &SimParams, rng: &mut R) -> Result<(Grid, Population)> {
    build(
        params.width,
        params.height,
        params.vacancy_percent,
        &params.proportions,
        params.tolerance_low,
        params.tolerance_high,
        params.radius,
        rng,
    )
}

/// Places a fresh population on an empty `grid`.
pub(crate) fn populate<R: Rng>(
    grid: &mut Grid,
    vacancy_percent: u32,
    proportions: &[f64],
    tolerance_low: f64,
    tolerance_high: f64,
    rng: &mut R,
) -> Result<Population> {
    validate(vacancy_percent, proportions, tolerance_low, tolerance_high)?;

    let total = grid.width() * grid.height();
    // Integer percent keeps this an exact floor.
    let occupied = total * (100 - vacancy_percent as usize) / 100;
    if occupied > grid.free_count() {
        return Err(SegregationError::InvalidProportions(format!(
            "{} agents do not fit in {} free cells",
            occupied,
            grid.free_count()
        )));
    }

    let counts = partition_counts(occupied, proportions);
    debug!("Partitioned {} agents as {:?}", occupied, counts);

    let mut agents = Vec::with_capacity(occupied);
    for (type_idx, &count) in counts.iter().enumerate() {
        let kind = (type_idx + 1) as u8;
        for _ in 0..count {
            let coord = grid.allocate_free_cell(rng)?;
            grid.occupy(coord, kind);
            agents.push(Agent::new(kind, coord, tolerance_low, tolerance_high));
        }
    }

    info!(
        "Built population of {} agents on {}x{} grid ({} free cells, radius {}).",
        agents.len(),
        grid.width(),
        grid.height(),
        grid.free_count(),
        grid.radius()
    );

    Ok(Population {
        agents,
        counts,
        vacancy_percent,
        proportions: proportions.to_vec(),
    })
}
