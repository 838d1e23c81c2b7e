use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SegregationError>;

/// Errors raised by the grid, the population factory and the stepper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegregationError {
    #[error("invalid grid dimensions {width}x{height} (radius {radius})")]
    InvalidDimension { width: usize, height: usize, radius: usize },
    #[error("invalid proportions: {0}")]
    InvalidProportions(String),
    #[error("invalid tolerance band [{low}, {high}]: expected 0 <= low <= high <= 100")]
    InvalidTolerance { low: f64, high: f64 },
    /// Only possible mid-run when an agent invariant is already broken.
    #[error("no free cells left on the grid")]
    NoFreeCells,
}
