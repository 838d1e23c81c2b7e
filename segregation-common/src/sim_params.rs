use serde::{Deserialize, Serialize};

/// Simulation parameters derived from the configuration, handed to the population factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Grid
    pub width: usize,
    pub height: usize,
    pub radius: usize,

    // Population
    pub vacancy_percent: u32,
    pub proportions: Vec<f64>,
    pub tolerance_low: f64,  // Percent, inclusive
    pub tolerance_high: f64, // Percent, inclusive

    // Run
    pub steps: u32,
    pub seed: Option<u64>,
}

