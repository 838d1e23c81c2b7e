pub mod config;
pub mod coord;
pub mod sim_params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{GridConfig, PopulationConfig, RunConfig, SegregationConfig};
pub use coord::Coord;
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
