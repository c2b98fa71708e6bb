//! Ordinary Kriging interpolation
//!
//! Best Linear Unbiased Estimator (BLUE) for spatial data. Uses a supplied
//! variogram model to compute optimal interpolation weights that minimize
//! estimation variance while satisfying an unbiasedness constraint.
//!
//! The kriging system for n sample points, in covariance form
//! C(h) = C(0) − γ(h):
//! ```text
//! [C(x₁,x₁) ... C(x₁,xₙ) 1] [λ₁]   [C(x₁,x₀)]
//! [   ...     ...    ...   .] [. ] = [   ...   ]
//! [C(xₙ,x₁) ... C(xₙ,xₙ) 1] [λₙ]   [C(xₙ,x₀)]
//! [  1       ...    1      0] [μ ]   [    1    ]
//! ```
//! where x₀ is the target location and μ is the Lagrange multiplier
//! ensuring Σλᵢ = 1. The estimate is Σλᵢ·zᵢ and the kriging variance is
//! σ² = C(0) − Σλᵢ·C(xᵢ,x₀) − μ.
//!
//! The left-hand matrix does not depend on x₀, so it is factorized once per
//! run and every grid point only performs a forward/back substitution.
//!
//! # Covariance ceiling C(0)
//!
//! Bounded models use their sill. The power model has no sill, so C(0) is
//! taken as the larger of the sample variance and the model semivariance at
//! the largest sample separation. Because the weights sum to one, the
//! weights and the kriging variance do not depend on this constant; it only
//! keeps the matrix entries on a sensible scale. Override it with
//! [`OrdinaryKrigingParams::covariance_ceiling`].
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use ndarray::Array2;
use phreatic_core::{Error, Grid, Interpolation, Interpolator, Result, SampleSet, Surface};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid_eval::evaluate_grid;
use crate::linalg::LuFactorization;

use super::variogram_model::VariogramModel;

/// Parameters for Ordinary Kriging interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrdinaryKrigingParams {
    /// Variogram model and its (fixed) parameters
    pub model: VariogramModel,
    /// C(0) used to turn semivariances into covariances. `None` picks the
    /// sill, or for sill-less models the convention described in the
    /// module docs.
    #[serde(default)]
    pub covariance_ceiling: Option<f64>,
}

impl OrdinaryKrigingParams {
    pub fn new(model: VariogramModel) -> Self {
        Self {
            model,
            covariance_ceiling: None,
        }
    }

    pub fn with_covariance_ceiling(mut self, c0: f64) -> Self {
        self.covariance_ceiling = Some(c0);
        self
    }
}

/// Kriging solution at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct KrigingEstimate {
    /// Predicted value Σλᵢ·zᵢ
    pub value: f64,
    /// Kriging variance, clamped at zero
    pub variance: f64,
    /// True if a negative variance (numerical noise) was clamped to zero
    pub clamped: bool,
    /// Weight λᵢ of each sample, in sample order
    pub weights: Vec<f64>,
    /// Lagrange multiplier μ
    pub lagrange: f64,
}

/// Result of Ordinary Kriging interpolation
#[derive(Debug, Clone, PartialEq)]
pub struct KrigingResult {
    /// Interpolated values
    pub estimate: Surface,
    /// Kriging variance (estimation uncertainty), always ≥ 0
    pub variance: Surface,
}

/// An ordinary kriging system with its factorized matrix, ready to be
/// evaluated at any number of locations.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct OrdinaryKriging<'a> {
    samples: &'a SampleSet,
    model: VariogramModel,
    c0: f64,
    system: LuFactorization,
}

impl<'a> OrdinaryKriging<'a> {
    /// Build and factorize the kriging matrix for `samples`.
    ///
    /// # Errors
    /// - [`Error::DegenerateInput`] if fewer than 2 samples are provided
    /// - [`Error::InvalidModelParameter`] if the model or ceiling is invalid
    /// - [`Error::SingularMatrix`] if the system cannot be factorized, e.g.
    ///   two samples at the same location with a zero nugget. Adding a small
    ///   nugget regularizes coincident samples.
    pub fn new(samples: &'a SampleSet, params: OrdinaryKrigingParams) -> Result<Self> {
        let n = samples.len();
        if n < 2 {
            return Err(Error::DegenerateInput(
                "Kriging requires at least 2 sample points".into(),
            ));
        }

        let model = params.model;
        model.validate()?;

        let c0 = match params.covariance_ceiling {
            Some(c0) if c0.is_finite() && c0 >= 0.0 => c0,
            Some(c0) => {
                return Err(Error::InvalidModelParameter {
                    name: "covariance_ceiling",
                    value: c0,
                    reason: "must be non-negative and finite".into(),
                });
            }
            None => default_ceiling(samples, &model),
        };

        let pts = samples.as_slice();
        let m = n + 1;
        let mut mat = Array2::<f64>::zeros((m, m));

        for i in 0..n {
            mat[[i, i]] = c0;
            for j in (i + 1)..n {
                let c = c0 - model.pair_semivariance(pts[i].dist_to(&pts[j]));
                mat[[i, j]] = c;
                mat[[j, i]] = c;
            }
            // Lagrange constraint row and column
            mat[[i, n]] = 1.0;
            mat[[n, i]] = 1.0;
        }

        let system = LuFactorization::new(mat).map_err(|e| match e {
            Error::SingularMatrix(msg) => Error::SingularMatrix(format!(
                "kriging system is singular ({}); coincident samples need a positive nugget",
                msg
            )),
            other => other,
        })?;

        debug!(
            "Kriging system factorized: {} samples, {} model, C(0) = {:.6e}",
            n,
            model.kind(),
            c0
        );

        Ok(Self {
            samples,
            model,
            c0,
            system,
        })
    }

    /// The covariance ceiling C(0) in use
    pub fn covariance_ceiling(&self) -> f64 {
        self.c0
    }

    pub fn model(&self) -> &VariogramModel {
        &self.model
    }

    /// Solve the kriging system for the target `(x, y)`.
    pub fn estimate(&self, x: f64, y: f64) -> Result<KrigingEstimate> {
        let n = self.samples.len();
        let mut rhs = Vec::with_capacity(n + 1);
        rhs.extend(
            self.samples
                .iter()
                .map(|s| self.model.covariance(s.dist(x, y), self.c0)),
        );
        rhs.push(1.0);

        let solution = self.system.solve(&rhs)?;
        let (weights, lagrange) = (&solution[..n], solution[n]);

        let value: f64 = weights
            .iter()
            .zip(self.samples)
            .map(|(w, s)| w * s.z)
            .sum();

        let explained: f64 = weights.iter().zip(&rhs[..n]).map(|(w, c)| w * c).sum();
        let raw = self.c0 - explained - lagrange;

        Ok(KrigingEstimate {
            value,
            variance: raw.max(0.0),
            clamped: raw < 0.0,
            weights: weights.to_vec(),
            lagrange,
        })
    }

    /// Evaluate at every grid point.
    pub fn predict(&self, grid: &Grid) -> Result<KrigingResult> {
        let cells = evaluate_grid(grid, |x, y| {
            let est = self.estimate(x, y)?;
            Ok((est.value, est.variance, est.clamped))
        })?;

        let clamped = cells.iter().filter(|c| c.2).count();
        if clamped > 0 {
            warn!("Kriging: clamped {} negative variances to zero", clamped);
        }

        let (rows, cols) = grid.shape();
        let estimate = Surface::from_vec(cells.iter().map(|c| c.0).collect(), rows, cols)?;
        let variance = Surface::from_vec(cells.iter().map(|c| c.1).collect(), rows, cols)?;

        Ok(KrigingResult { estimate, variance })
    }
}

/// C(0) for a model: the sill when it exists, otherwise
/// max(sample variance, γ(largest sample separation)).
fn default_ceiling(samples: &SampleSet, model: &VariogramModel) -> f64 {
    if let Some(sill) = model.sill() {
        return sill;
    }

    let pts = samples.as_slice();
    let mut max_dist = 0.0_f64;
    for i in 0..pts.len() {
        for j in (i + 1)..pts.len() {
            max_dist = max_dist.max(pts[i].dist_to(&pts[j]));
        }
    }

    samples.variance().max(model.pair_semivariance(max_dist))
}

/// Perform Ordinary Kriging interpolation from scattered samples onto a grid.
///
/// # Returns
/// [`KrigingResult`] with the prediction surface and the kriging variance
/// surface. Negative variances caused by rounding are reported as zero.
///
/// # Errors
/// See [`OrdinaryKriging::new`].
pub fn ordinary_kriging(
    samples: &SampleSet,
    grid: &Grid,
    params: OrdinaryKrigingParams,
) -> Result<KrigingResult> {
    debug!(
        "Ordinary kriging: {} samples onto {} x {} grid",
        samples.len(),
        grid.cols(),
        grid.rows()
    );
    OrdinaryKriging::new(samples, params)?.predict(grid)
}

/// [`Interpolator`] wrapper around [`ordinary_kriging`].
#[derive(Debug, Clone)]
pub struct KrigingInterpolator {
    pub params: OrdinaryKrigingParams,
}

impl KrigingInterpolator {
    pub fn new(params: OrdinaryKrigingParams) -> Self {
        Self { params }
    }
}

impl Interpolator for KrigingInterpolator {
    fn name(&self) -> &'static str {
        "kriging"
    }

    fn description(&self) -> &'static str {
        "Ordinary kriging with a fixed variogram model"
    }

    fn interpolate(&self, samples: &SampleSet, grid: &Grid) -> Result<Interpolation> {
        let result = ordinary_kriging(samples, grid, self.params)?;
        Ok(Interpolation {
            estimate: result.estimate,
            variance: Some(result.variance),
        })
    }
}
