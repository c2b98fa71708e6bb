//! # Phreatic Core
//!
//! Core types for the phreatic water-table interpolation engine.
//!
//! This crate provides:
//! - `SampleSet`: immutable, non-empty collection of measured control points
//! - `Grid`: rectilinear evaluation domain with strictly increasing axes
//! - `Surface`: grid-shaped prediction or variance values
//! - `Interpolator`: the contract shared by every estimation method
//! - The error taxonomy surfaced by all operations

pub mod error;
pub mod grid;
pub mod sample;

pub use error::{Error, Result};
pub use grid::{Grid, Surface, SurfaceStatistics};
pub use sample::{Point2D, Sample, SampleSet, WellRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Grid, Surface};
    pub use crate::sample::{Point2D, Sample, SampleSet, WellRecord};
    pub use crate::{Interpolation, Interpolator};
}

/// Output of one interpolation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    /// Predicted values, shaped like the grid
    pub estimate: Surface,
    /// Estimation variance, shaped like the grid. Only kriging-based
    /// methods produce one.
    pub variance: Option<Surface>,
}

impl Interpolation {
    pub fn estimate_only(estimate: Surface) -> Self {
        Self {
            estimate,
            variance: None,
        }
    }
}

/// Common contract for surface estimators.
///
/// Implementors hold only their configuration; every call builds fresh
/// surfaces from read-only inputs, so one instance may serve concurrent runs.
pub trait Interpolator: Send + Sync {
    /// Returns the method name
    fn name(&self) -> &'static str;

    /// Returns a description of what the method does
    fn description(&self) -> &'static str;

    /// Estimate the field at every point of `grid` from `samples`.
    fn interpolate(&self, samples: &SampleSet, grid: &Grid) -> Result<Interpolation>;

    /// Estimate the field at a single location.
    fn interpolate_at(&self, samples: &SampleSet, x: f64, y: f64) -> Result<f64> {
        let grid = Grid::point(x, y)?;
        self.interpolate(samples, &grid)?.estimate.get(0, 0)
    }
}
