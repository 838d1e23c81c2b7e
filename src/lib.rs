//! Grid-based neighborhood-preference (Schelling) segregation engine.

pub mod agent;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod population;
pub mod simulation;

pub use agent::Agent;
pub use error::{Result, SegregationError};
pub use grid::{Grid, EMPTY};
pub use metrics::{Metrics, MetricsHistory};
pub use population::Population;
pub use simulation::Simulation;
