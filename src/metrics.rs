use crate::grid::Grid;
use crate::population::Population;
use serde::{Deserialize, Serialize};

/// Population-wide metrics for one point in time, both in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub satisfaction_rate: f64,
    pub segregation_index: f64,
}

/// Parallel satisfaction/segregation series, one entry per recorded step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsHistory {
    pub satisfaction: Vec<f64>,
    pub segregation: Vec<f64>,
}

impl MetricsHistory {
    pub fn push(&mut self, metrics: Metrics) {
        self.satisfaction.push(metrics.satisfaction_rate);
        self.segregation.push(metrics.segregation_index);
    }

    pub fn len(&self) -> usize { self.satisfaction.len() }
    pub fn is_empty(&self) -> bool { self.satisfaction.is_empty() }

    pub fn last(&self) -> Option<Metrics> {
        Some(Metrics {
            satisfaction_rate: *self.satisfaction.last()?,
            segregation_index: *self.segregation.last()?,
        })
    }
}

/// Evaluates every agent once and derives both metrics from that pass.
///
/// An empty population counts as fully satisfied and fully segregated.
pub fn evaluate(grid: &Grid, population: &Population) -> Metrics {
    if population.is_empty() {
        return Metrics { satisfaction_rate: 100.0, segregation_index: 100.0 };
    }
    let (satisfied, fraction_sum) = population
        .agents()
        .iter()
        .map(|agent| agent.is_satisfied(grid))
        .fold((0usize, 0.0f64), |(count, sum), (ok, fraction)| {
            (count + ok as usize, sum + fraction)
        });
    let n = population.len() as f64;
    Metrics {
        satisfaction_rate: 100.0 * satisfied as f64 / n,
        segregation_index: 100.0 * fraction_sum / n,
    }
}

/// Percentage of agents inside their tolerance band.
pub fn satisfaction_rate(grid: &Grid, population: &Population) -> f64 {
    evaluate(grid, population).satisfaction_rate
}

/// Mean same-type neighbor fraction across agents, as a percentage.
pub fn segregation_index(grid: &Grid, population: &Population) -> f64 {
    evaluate(grid, population).segregation_index
}
