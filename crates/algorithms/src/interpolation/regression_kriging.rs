//! Regression Kriging (RK) interpolation
//!
//! Hybrid method that decomposes the spatial field into:
//! ```text
//! Z(x) = m(x) + ε(x)
//! ```
//! where m(x) is a polynomial trend estimated by least squares and ε(x) is a
//! spatially correlated residual interpolated by Ordinary Kriging. The
//! variogram model describes the residuals, not the raw values.
//!
//! Reference:
//! Hengl, T. et al. (2007). About regression-kriging. Computers & Geosciences.

use phreatic_core::{Grid, Interpolation, Interpolator, Result, Sample, SampleSet, Surface};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kriging::{OrdinaryKriging, OrdinaryKrigingParams};
use super::polynomial::{fit_polynomial, PolynomialDegree, PolynomialSurface};
use super::variogram_model::VariogramModel;

/// Parameters for Regression Kriging interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionKrigingParams {
    /// Degree of the polynomial trend
    pub degree: PolynomialDegree,
    /// Variogram model of the trend residuals
    pub model: VariogramModel,
    /// C(0) for the residual kriging system (see [`OrdinaryKrigingParams`])
    #[serde(default)]
    pub covariance_ceiling: Option<f64>,
}

impl RegressionKrigingParams {
    pub fn new(degree: PolynomialDegree, model: VariogramModel) -> Self {
        Self {
            degree,
            model,
            covariance_ceiling: None,
        }
    }

    fn kriging_params(&self) -> OrdinaryKrigingParams {
        OrdinaryKrigingParams {
            model: self.model,
            covariance_ceiling: self.covariance_ceiling,
        }
    }
}

/// Result of Regression Kriging interpolation
#[derive(Debug, Clone)]
pub struct RegressionKrigingResult {
    /// Final interpolated values (trend + kriged residuals)
    pub estimate: Surface,
    /// Kriging variance of the residual component
    pub variance: Surface,
    /// The fitted trend, including coefficients and residuals
    pub trend: PolynomialSurface,
}

/// Perform Regression Kriging interpolation.
///
/// Steps:
/// 1. Fit the polynomial trend m(x,y) of the requested degree
/// 2. Compute residuals: ε(xᵢ) = z(xᵢ) − m(xᵢ)
/// 3. Krige the residuals with the supplied model
/// 4. Final: Z̃(x) = m(x) + ε̃(x)
///
/// # Errors
/// Any error of [`fit_polynomial`] (too few or badly placed samples for the
/// trend) or of [`OrdinaryKriging::new`] (invalid model, singular system).
pub fn regression_kriging(
    samples: &SampleSet,
    grid: &Grid,
    params: RegressionKrigingParams,
) -> Result<RegressionKrigingResult> {
    debug!(
        "Regression kriging: {} samples onto {} x {} grid, degree {} trend, {} residual model",
        samples.len(),
        grid.cols(),
        grid.rows(),
        params.degree.order(),
        params.model.kind()
    );

    let trend = fit_polynomial(samples, params.degree)?;
    let residuals = residual_samples(samples, &trend)?;

    let kriged = OrdinaryKriging::new(&residuals, params.kriging_params())?.predict(grid)?;
    let trend_surface = trend.predict(grid)?;

    let estimate = Surface::from_array(trend_surface.data() + kriged.estimate.data());

    Ok(RegressionKrigingResult {
        estimate,
        variance: kriged.variance,
        trend,
    })
}

/// Samples carrying the trend residuals instead of the measured values
fn residual_samples(samples: &SampleSet, trend: &PolynomialSurface) -> Result<SampleSet> {
    SampleSet::new(
        samples
            .iter()
            .zip(trend.residuals())
            .map(|(s, &r)| Sample::new(s.x(), s.y(), r))
            .collect(),
    )
}

/// [`Interpolator`] wrapper around [`regression_kriging`].
#[derive(Debug, Clone)]
pub struct RegressionKrigingInterpolator {
    pub params: RegressionKrigingParams,
}

impl RegressionKrigingInterpolator {
    pub fn new(params: RegressionKrigingParams) -> Self {
        Self { params }
    }
}

impl Interpolator for RegressionKrigingInterpolator {
    fn name(&self) -> &'static str {
        "regression-kriging"
    }

    fn description(&self) -> &'static str {
        "Polynomial trend plus ordinary kriging of its residuals"
    }

    fn interpolate(&self, samples: &SampleSet, grid: &Grid) -> Result<Interpolation> {
        let result = regression_kriging(samples, grid, self.params)?;
        Ok(Interpolation {
            estimate: result.estimate,
            variance: Some(result.variance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phreatic_core::Error;

    fn trended_points() -> SampleSet {
        // Linear trend z = 100 + 0.5x + 0.3y plus a small local bump
        let mut triples = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let x = 10.0 + 20.0 * i as f64;
                let y = 10.0 + 20.0 * j as f64;
                let bump = if i == 2 && j == 2 { 3.0 } else { 0.0 };
                triples.push((x, y, 100.0 + 0.5 * x + 0.3 * y + bump));
            }
        }
        SampleSet::from_xyz(&triples).unwrap()
    }

    fn params() -> RegressionKrigingParams {
        RegressionKrigingParams::new(
            PolynomialDegree::Linear,
            VariogramModel::exponential(0.0, 1.0, 40.0).unwrap(),
        )
    }

    fn grid_10() -> Grid {
        Grid::with_step((0.0, 100.0), (0.0, 100.0), 10.0).unwrap()
    }

    #[test]
    fn test_rk_basic() {
        let samples = trended_points();
        let result = regression_kriging(&samples, &grid_10(), params()).unwrap();

        assert_eq!(result.estimate.shape(), (11, 11));
        assert_eq!(result.trend.coefficients().len(), 3);
        for &v in result.estimate.data().iter() {
            assert!(v.is_finite());
        }
        for &v in result.variance.data().iter() {
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn test_rk_exact_at_samples() {
        let samples = trended_points();
        let result = regression_kriging(&samples, &grid_10(), params()).unwrap();
        let grid = grid_10();

        // Samples sit on odd grid nodes (10, 30, 50, 70, 90)
        for s in &samples {
            let (row, col) = grid.nearest_cell(s.x(), s.y());
            let v = result.estimate.get(row, col).unwrap();
            assert!((v - s.z).abs() < 1e-6, "RK at ({}, {}) = {}, expected {}", s.x(), s.y(), v, s.z);
        }
    }

    #[test]
    fn test_rk_follows_trend_far_away() {
        let samples = trended_points();
        let grid = Grid::point(400.0, 400.0).unwrap();
        let result = regression_kriging(&samples, &grid, params()).unwrap();

        // Residual covariance has vanished; only the trend (plus the kriged
        // mean residual) remains
        let trend = result.trend.evaluate(400.0, 400.0);
        let v = result.estimate.get(0, 0).unwrap();
        assert!((v - trend).abs() < 0.5, "far estimate {} vs trend {}", v, trend);
    }

    #[test]
    fn test_rk_too_few_points() {
        let samples = SampleSet::from_xyz(&[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0)]).unwrap();
        let err = regression_kriging(&samples, &grid_10(), params()).unwrap_err();
        assert!(matches!(err, Error::UnderdeterminedSystem { samples: 2, coefficients: 3 }));
    }

    #[test]
    fn test_interpolator() {
        let interp = RegressionKrigingInterpolator::new(params());
        let out = interp.interpolate(&trended_points(), &grid_10()).unwrap();
        assert!(out.variance.is_some());
        assert_eq!(interp.name(), "regression-kriging");
    }
}
