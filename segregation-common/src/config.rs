use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::Path;

// Lattice dimensions and neighborhood radius
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    /// Number of columns. Also the number of rows unless `height` is given.
    pub side: usize,
    #[serde(default)]
    pub height: Option<usize>,
    #[serde(default = "default_radius")]
    pub radius: usize,
}

// Population make-up and tolerance band, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationConfig {
    #[serde(default = "default_types")]
    pub types: usize,
    /// Percentage of cells left empty (0-100).
    #[serde(default = "default_vacancy_percent")]
    pub vacancy_percent: u32,
    /// Share of the occupied cells for every type but the last one.
    #[serde(default = "default_proportions")]
    pub proportions: Vec<f64>,
    /// Minimum acceptable same-type neighbor percentage.
    #[serde(default = "default_tolerance_low")]
    pub tolerance_low: f64,
    /// Maximum acceptable same-type neighbor percentage.
    #[serde(default = "default_tolerance_high")]
    pub tolerance_high: f64,
}

// Step budget and RNG seed
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RunConfig {
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SegregationConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { side: default_side(), height: None, radius: default_radius() }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            types: default_types(),
            vacancy_percent: default_vacancy_percent(),
            proportions: default_proportions(),
            tolerance_low: default_tolerance_low(),
            tolerance_high: default_tolerance_high(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { steps: default_steps(), seed: None }
    }
}

impl Default for SegregationConfig {
    fn default() -> Self {
        SegregationConfig {
            grid: GridConfig::default(),
            population: PopulationConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SegregationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SegregationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        let pop = &self.population;

        if grid.side == 0 || grid.height == Some(0) {
            anyhow::bail!("grid side and height must be positive.");
        }
        if pop.types < 2 {
            anyhow::bail!("population.types must be at least 2 (got {}).", pop.types);
        }
        if pop.proportions.len() != pop.types - 1 {
            anyhow::bail!(
                "population.proportions must list {} values (types - 1), got {}.",
                pop.types - 1,
                pop.proportions.len()
            );
        }
        if pop.vacancy_percent > 100 {
            anyhow::bail!("vacancy_percent must be within 0-100 (got {}).", pop.vacancy_percent);
        }
        // Relocation needs at least one free cell to move into.
        let total = grid.side * grid.height.unwrap_or(grid.side);
        let occupied = total * (100 - pop.vacancy_percent as usize) / 100;
        if occupied >= total {
            anyhow::bail!(
                "vacancy_percent {} leaves no free cell on a {}-cell grid.",
                pop.vacancy_percent,
                total
            );
        }
        if !(0.0..=100.0).contains(&pop.tolerance_low)
            || !(0.0..=100.0).contains(&pop.tolerance_high)
            || pop.tolerance_low > pop.tolerance_high
        {
            anyhow::bail!(
                "tolerance band [{}, {}] must satisfy 0 <= low <= high <= 100.",
                pop.tolerance_low,
                pop.tolerance_high
            );
        }
        // Proportion ranges and capacity are checked again by the population factory.
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let width = self.grid.side;
        let height = self.grid.height.unwrap_or(width); // Square unless told otherwise

        SimParams {
            width,
            height,
            radius: self.grid.radius,
            vacancy_percent: self.population.vacancy_percent,
            proportions: self.population.proportions.clone(),
            tolerance_low: self.population.tolerance_low,
            tolerance_high: self.population.tolerance_high,
            steps: self.run.steps,
            seed: self.run.seed,
        }
    }
}

fn default_side() -> usize {
    20
}

fn default_radius() -> usize {
    1
}

fn default_types() -> usize {
    2
}

fn default_vacancy_percent() -> u32 {
    20
}

fn default_proportions() -> Vec<f64> {
    vec![0.5]
}

fn default_tolerance_low() -> f64 {
    30.0
}

fn default_tolerance_high() -> f64 {
    100.0
}

fn default_steps() -> u32 {
    20
}
