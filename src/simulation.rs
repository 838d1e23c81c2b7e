use crate::error::Result;
use crate::grid::Grid;
use crate::metrics::{self, Metrics, MetricsHistory};
use crate::population::{self, Population};
use log::{debug, info, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use segregation_common::{Coord, SegregationConfig, SimParams, Snapshot};

/// Owns the grid, its population and the RNG, and advances them step by step.
pub struct Simulation {
    /// Parameters the population was built from, kept for `reset`.
    params: SimParams,
    grid: Grid,
    population: Population,
    /// Sole source of randomness: every free-cell draw goes through it.
    rng: ChaCha12Rng,
    /// Number of steps taken since the population was built.
    current_step: u32,
    /// Metrics after each step; entry 0 describes the freshly built population.
    history: MetricsHistory,
}

fn make_rng(seed: Option<u64>) -> ChaCha12Rng {
    match seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_os_rng(),
    }
}

impl Simulation {
    /// Builds the grid and population described by `params` and records the
    /// initial metrics.
    pub fn new(params: SimParams) -> Result<Self> {
        let mut rng = make_rng(params.seed);
        let (grid, population) = population::build_from_params(&params, &mut rng)?;

        let mut sim = Self {
            params,
            grid,
            population,
            rng,
            current_step: 0,
            history: MetricsHistory::default(),
        };
        sim.record_metrics();
        Ok(sim)
    }

    pub fn from_config(config: &SegregationConfig) -> Result<Self> {
        Self::new(config.get_sim_params())
    }

    pub fn params(&self) -> &SimParams { &self.params }
    pub fn current_step(&self) -> u32 { self.current_step }
    pub fn history(&self) -> &MetricsHistory { &self.history }
    /// Read-only; the lattice only changes through agent relocation.
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn population(&self) -> &Population { &self.population }

    fn record_metrics(&mut self) -> Metrics {
        let m = metrics::evaluate(&self.grid, &self.population);
        self.history.push(m);
        m
    }

    /// Visits agents in creation order and moves each unsatisfied one as soon
    /// as it is found, so earlier moves affect later evaluations in the pass.
    /// Returns the cells that were left behind.
    fn relocation_pass(&mut self) -> Result<Vec<Coord>> {
        let mut moved_from = Vec::new();
        for agent in self.population.agents_mut() {
            if !agent.is_satisfied(&self.grid).0 {
                let from = agent.coord();
                agent.relocate(&mut self.grid, &mut self.rng)?;
                moved_from.push(from);
            }
        }
        Ok(moved_from)
    }

    /// One relocation pass followed by a metrics update.
    pub fn step_silent(&mut self) -> Result<Metrics> {
        let moved_from = self.relocation_pass()?;
        self.current_step += 1;
        let m = self.record_metrics();
        debug!(
            "Step {} | moved: {} | satisfaction: {:.2}% | segregation: {:.2}%",
            self.current_step,
            moved_from.len(),
            m.satisfaction_rate,
            m.segregation_index
        );
        Ok(m)
    }

    /// Same as [`step_silent`](Self::step_silent), also returning what a
    /// renderer needs to draw the resulting state.
    pub fn step_reported(&mut self) -> Result<Snapshot> {
        let relocated_from = self.relocation_pass()?;
        self.current_step += 1;
        let m = self.record_metrics();

        let unsatisfied: Vec<Coord> = self
            .population
            .agents()
            .iter()
            .filter(|agent| !agent.is_satisfied(&self.grid).0)
            .map(|agent| agent.coord())
            .collect();

        info!(
            "Step {} | moved: {} | unsatisfied: {} | satisfaction: {:.2}% | segregation: {:.2}%",
            self.current_step,
            relocated_from.len(),
            unsatisfied.len(),
            m.satisfaction_rate,
            m.segregation_index
        );

        Ok(Snapshot {
            step: self.current_step,
            satisfaction_rate: m.satisfaction_rate,
            segregation_index: m.segregation_index,
            groups: self.population.groups(),
            unsatisfied,
            relocated_from,
        })
    }

    /// Runs exactly `steps` steps: all silent except the last one, whose
    /// report is returned along with the updated step counter. There is no
    /// early stop once the population settles. A `NoFreeCells` error aborts
    /// the run.
    pub fn run(&mut self, steps: u32) -> Result<(u32, Option<Snapshot>)> {
        if steps == 0 {
            return Ok((self.current_step, None));
        }
        info!("Running {} steps from step {}...", steps, self.current_step);
        for i in 1..steps {
            self.step_silent()?;
            trace!("Silent step {}/{} done", i, steps);
        }
        let report = self.step_reported()?;
        Ok((self.current_step, Some(report)))
    }

    /// Empties the grid and rebuilds the population from the parameters it
    /// was built with. With a configured seed the rebuilt state matches the
    /// first build exactly.
    pub fn reset(&mut self) -> Result<()> {
        if self.params.seed.is_some() {
            self.rng = make_rng(self.params.seed);
        }
        self.grid.reset();
        self.population = population::populate(
            &mut self.grid,
            self.params.vacancy_percent,
            &self.params.proportions,
            self.params.tolerance_low,
            self.params.tolerance_high,
            &mut self.rng,
        )?;
        self.current_step = 0;
        self.history = MetricsHistory::default();
        self.record_metrics();
        debug!("Simulation reset with {} agents.", self.population.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegregationError;

    fn params(width: usize, height: usize, vacancy_percent: u32, seed: u64) -> SimParams {
        SimParams {
            width,
            height,
            radius: 1,
            vacancy_percent,
            proportions: vec![0.5],
            tolerance_low: 50.0,
            tolerance_high: 100.0,
            steps: 5,
            seed: Some(seed),
        }
    }

    #[test]
    fn new_records_initial_metrics() {
        let sim = Simulation::new(params(4, 4, 25, 1)).unwrap();
        assert_eq!(sim.current_step(), 0);
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.population().len(), 12);
    }

    #[test]
    fn step_silent_appends_one_entry() {
        let mut sim = Simulation::new(params(4, 4, 25, 2)).unwrap();
        let m = sim.step_silent().unwrap();
        assert_eq!(sim.current_step(), 1);
        assert_eq!(sim.history().len(), 2);
        assert_eq!(sim.history().last(), Some(m));
    }

    #[test]
    fn run_takes_exactly_the_requested_steps() {
        let mut sim = Simulation::new(params(4, 4, 25, 3)).unwrap();
        let (step, report) = sim.run(7).unwrap();
        let report = report.expect("non-zero run reports");
        assert_eq!(step, 7);
        assert_eq!(report.step, 7);
        assert_eq!(sim.current_step(), 7);
        assert_eq!(sim.history().len(), 8);
        assert_eq!(report.groups.iter().map(Vec::len).sum::<usize>(), 12);
        assert_eq!(sim.history().last().unwrap().satisfaction_rate, report.satisfaction_rate);

        let (step, _) = sim.run(2).unwrap();
        assert_eq!(step, 9);
    }

    #[test]
    fn zero_step_run_is_a_no_op() {
        let mut sim = Simulation::new(params(4, 4, 25, 4)).unwrap();
        let (step, report) = sim.run(0).unwrap();
        assert_eq!(step, 0);
        assert!(report.is_none());
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn report_lists_current_unsatisfied_agents() {
        let mut sim = Simulation::new(params(4, 4, 25, 5)).unwrap();
        let report = sim.step_reported().unwrap();
        let expected = sim
            .population
            .agents()
            .iter()
            .filter(|a| !a.is_satisfied(&sim.grid).0)
            .count();
        assert_eq!(report.unsatisfied.len(), expected);
        let rate = 100.0 * (12 - expected) as f64 / 12.0;
        assert_eq!(report.satisfaction_rate, rate);
    }

    #[test]
    fn padded_lattice_tracks_lattice_through_steps() {
        let mut sim = Simulation::new(params(9, 7, 20, 17)).unwrap();
        assert!(sim.grid.padding_is_consistent());
        for _ in 0..10 {
            sim.step_silent().unwrap();
            assert!(sim.grid.padding_is_consistent());
            for agent in sim.population.agents() {
                assert_eq!(sim.grid.cell(agent.coord()), agent.kind());
            }
        }
        sim.step_reported().unwrap();
        assert!(sim.grid.padding_is_consistent());
    }

    #[test]
    fn full_grid_aborts_run_with_no_free_cells() {
        let mut sim = Simulation::new(params(6, 6, 0, 3)).unwrap();
        assert_eq!(sim.grid.free_count(), 0);
        assert_eq!(sim.run(3), Err(SegregationError::NoFreeCells));
    }

    #[test]
    fn reset_reproduces_initial_lattice() {
        let mut sim = Simulation::new(params(4, 4, 25, 6)).unwrap();
        let initial = sim.grid.cells().to_vec();
        let initial_metrics = sim.history().clone();
        sim.run(3).unwrap();

        sim.reset().unwrap();
        assert_eq!(sim.grid.cells(), initial.as_slice());
        assert_eq!(sim.history(), &initial_metrics);
        assert_eq!(sim.current_step(), 0);
    }
}
