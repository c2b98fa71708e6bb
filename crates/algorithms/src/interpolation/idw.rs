//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates values at unknown locations as a weighted average of all
//! sample points, where weights are inversely proportional to distance
//! raised to a power parameter.
//!
//! The default power is 1 (weight = 1/d). The conventional inverse-square
//! variant is available with `power: 2.0`.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use phreatic_core::{Error, Grid, Interpolation, Interpolator, Result, SampleSet, Surface};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid_eval::evaluate_grid;

/// Parameters for IDW interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdwParams {
    /// Power parameter (default: 1.0).
    /// Higher values give more weight to nearby points.
    pub power: f64,
    /// Snap distance (default: 1e-5). If a sample lies within this distance
    /// of the target, its value is returned directly. When several samples
    /// qualify, the first one in sample order wins.
    pub snap_distance: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 1.0,
            snap_distance: 1e-5,
        }
    }
}

impl IdwParams {
    /// Inverse-square weighting
    pub fn inverse_square() -> Self {
        Self {
            power: 2.0,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::InvalidModelParameter {
                name: "power",
                value: self.power,
                reason: "must be positive and finite".into(),
            });
        }
        if !(self.snap_distance.is_finite() && self.snap_distance >= 0.0) {
            return Err(Error::InvalidModelParameter {
                name: "snap_distance",
                value: self.snap_distance,
                reason: "must be non-negative and finite".into(),
            });
        }
        Ok(())
    }
}

/// IDW estimate at a single location.
///
/// ```text
/// z(x,y) = Σ(wᵢ · zᵢ) / Σ(wᵢ)     wᵢ = 1 / d(x,y, xᵢ,yᵢ)^p
/// ```
///
/// If some sample lies within `snap_distance` of `(x, y)`, the first such
/// sample's value is returned unchanged.
pub fn idw_at(samples: &SampleSet, x: f64, y: f64, params: &IdwParams) -> f64 {
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;

    for s in samples {
        let d = s.dist(x, y);
        if d <= params.snap_distance {
            return s.z;
        }
        let w = if params.power == 1.0 {
            1.0 / d
        } else {
            d.powf(-params.power)
        };
        sum_w += w;
        sum_wz += w * s.z;
    }

    sum_wz / sum_w
}

/// Perform IDW interpolation from scattered samples onto a grid.
///
/// # Returns
/// Surface shaped like `grid`. Every cell is defined; the estimate is a
/// convex combination of the sample values except where the snap rule
/// applies.
///
/// # Errors
/// [`Error::InvalidModelParameter`] for a non-positive power or a negative
/// snap distance. (An empty sample set cannot be constructed.)
pub fn idw(samples: &SampleSet, grid: &Grid, params: IdwParams) -> Result<Surface> {
    params.validate()?;
    debug!(
        "IDW: {} samples onto {} x {} grid (power {}, snap {})",
        samples.len(),
        grid.cols(),
        grid.rows(),
        params.power,
        params.snap_distance
    );

    let data = evaluate_grid(grid, |x, y| Ok(idw_at(samples, x, y, &params)))?;
    Surface::from_vec(data, grid.rows(), grid.cols())
}

/// [`Interpolator`] wrapper around [`idw`].
#[derive(Debug, Clone, Default)]
pub struct IdwInterpolator {
    pub params: IdwParams,
}

impl IdwInterpolator {
    pub fn new(params: IdwParams) -> Self {
        Self { params }
    }
}

impl Interpolator for IdwInterpolator {
    fn name(&self) -> &'static str {
        "idw"
    }

    fn description(&self) -> &'static str {
        "Inverse distance weighted mean of all samples"
    }

    fn interpolate(&self, samples: &SampleSet, grid: &Grid) -> Result<Interpolation> {
        idw(samples, grid, self.params).map(Interpolation::estimate_only)
    }
}
