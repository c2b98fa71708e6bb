//! Polynomial trend surfaces fitted by ordinary least squares
//!
//! The surface is a linear combination of coordinate monomials:
//! ```text
//! degree 1:  z = β₀ + β₁x + β₂y
//! degree 2:  z = β₀ + β₁x + β₂y + β₃xy + β₄x² + β₅y²
//! ```
//! Coefficients minimize Σ(zᵢ − ẑᵢ)² and are obtained from a Householder
//! QR factorization of the design matrix rather than the normal equations.
//!
//! x and y above are not raw coordinates but the sample-centred, half-range
//! scaled coordinates of a [`CoordinateFrame`]. With projected coordinates
//! (northings in the millions) the raw x², xy and y² columns are numerically
//! collinear with the constant and linear ones.

use ndarray::Array2;
use phreatic_core::{Error, Grid, Interpolation, Interpolator, Result, SampleSet, Surface};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid_eval::evaluate_grid;
use crate::linalg::least_squares;

/// Polynomial degree of a trend surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialDegree {
    /// Planar surface: terms {1, x, y}
    Linear,
    /// Quadratic surface: terms {1, x, y, xy, x², y²}
    Quadratic,
}

impl PolynomialDegree {
    /// Numeric polynomial order (1 or 2)
    pub fn order(self) -> u8 {
        match self {
            PolynomialDegree::Linear => 1,
            PolynomialDegree::Quadratic => 2,
        }
    }

    /// Number of monomial terms, i.e. the minimum number of samples
    #[inline]
    pub fn n_terms(self) -> usize {
        match self {
            PolynomialDegree::Linear => 3,
            PolynomialDegree::Quadratic => 6,
        }
    }

    /// Monomial values at a point, in coefficient order. Only the first
    /// [`n_terms`](Self::n_terms) entries are meaningful; the rest are zero.
    #[inline]
    pub fn terms(self, x: f64, y: f64) -> [f64; MAX_TERMS] {
        match self {
            PolynomialDegree::Linear => [1.0, x, y, 0.0, 0.0, 0.0],
            PolynomialDegree::Quadratic => [1.0, x, y, x * y, x * x, y * y],
        }
    }
}

/// Number of terms of the highest supported degree
pub const MAX_TERMS: usize = 6;

/// Affine map from world coordinates to the frame the coefficients refer to:
/// `u = (x − origin_x) / scale_x`, `v = (y − origin_y) / scale_y`.
///
/// The origin is the sample centroid and the scales are the half-ranges of
/// the sample coordinates, so fitted samples fall within roughly [−1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateFrame {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CoordinateFrame {
    fn from_samples(samples: &SampleSet) -> Self {
        let n = samples.len() as f64;
        let origin_x = samples.iter().map(|s| s.x()).sum::<f64>() / n;
        let origin_y = samples.iter().map(|s| s.y()).sum::<f64>() / n;
        let (x0, y0, x1, y1) = samples.bounds();

        // A degenerate axis keeps unit scale; its column is then all zeros
        // and the fit reports it as singular.
        let half = |lo: f64, hi: f64| {
            let h = 0.5 * (hi - lo);
            if h > 0.0 { h } else { 1.0 }
        };

        Self {
            origin_x,
            origin_y,
            scale_x: half(x0, x1),
            scale_y: half(y0, y1),
        }
    }

    /// World coordinates to frame coordinates
    #[inline]
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.scale_x,
            (y - self.origin_y) / self.scale_y,
        )
    }
}

impl TryFrom<u8> for PolynomialDegree {
    type Error = Error;

    fn try_from(order: u8) -> Result<Self> {
        match order {
            1 => Ok(PolynomialDegree::Linear),
            2 => Ok(PolynomialDegree::Quadratic),
            _ => Err(Error::Configuration(format!(
                "polynomial degree must be 1 or 2, got {}",
                order
            ))),
        }
    }
}

/// A fitted polynomial trend surface.
///
/// Evaluation is a plain linear combination and is defined everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialSurface {
    degree: PolynomialDegree,
    frame: CoordinateFrame,
    coefficients: Vec<f64>,
    residuals: Vec<f64>,
    rss: f64,
    tss: f64,
}

impl PolynomialSurface {
    pub fn degree(&self) -> PolynomialDegree {
        self.degree
    }

    /// Coordinate frame of the coefficients
    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    /// Coefficients in term order (see [`PolynomialDegree::terms`]), in the
    /// units of [`frame`](Self::frame)
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Training residuals `zᵢ − ẑᵢ`, in sample order
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Residual sum of squares on the training samples
    pub fn rss(&self) -> f64 {
        self.rss
    }

    /// Coefficient of determination. `None` when the samples have no spread.
    pub fn r_squared(&self) -> Option<f64> {
        (self.tss > 0.0).then(|| 1.0 - self.rss / self.tss)
    }

    /// Evaluate the surface at `(x, y)`
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let (u, v) = self.frame.to_local(x, y);
        self.degree
            .terms(u, v)
            .iter()
            .zip(&self.coefficients)
            .map(|(t, c)| t * c)
            .sum()
    }

    /// Evaluate the surface at every grid point
    pub fn predict(&self, grid: &Grid) -> Result<Surface> {
        let data = evaluate_grid(grid, |x, y| Ok(self.evaluate(x, y)))?;
        Surface::from_vec(data, grid.rows(), grid.cols())
    }
}

/// Fit a least-squares polynomial surface of the given degree.
///
/// # Errors
/// - [`Error::UnderdeterminedSystem`] if there are fewer samples than terms
///   (3 for linear, 6 for quadratic)
/// - [`Error::SingularMatrix`] if the sample layout cannot determine the
///   terms, e.g. collinear samples, or all samples sharing one x value
pub fn fit_polynomial(samples: &SampleSet, degree: PolynomialDegree) -> Result<PolynomialSurface> {
    let n = samples.len();
    let p = degree.n_terms();
    if n < p {
        return Err(Error::UnderdeterminedSystem {
            samples: n,
            coefficients: p,
        });
    }

    let frame = CoordinateFrame::from_samples(samples);
    let mut design = Array2::<f64>::zeros((n, p));
    for (i, s) in samples.iter().enumerate() {
        let (u, v) = frame.to_local(s.x(), s.y());
        for (j, &t) in degree.terms(u, v)[..p].iter().enumerate() {
            design[[i, j]] = t;
        }
    }
    let z = samples.values();

    let coefficients = least_squares(&design, &z)?;

    let mut surface = PolynomialSurface {
        degree,
        frame,
        coefficients,
        residuals: Vec::with_capacity(n),
        rss: 0.0,
        tss: 0.0,
    };
    surface.residuals = samples
        .iter()
        .map(|s| s.z - surface.evaluate(s.x(), s.y()))
        .collect();
    surface.rss = surface.residuals.iter().map(|r| r * r).sum();

    let mean = z.iter().sum::<f64>() / n as f64;
    surface.tss = z.iter().map(|v| (v - mean) * (v - mean)).sum();

    debug!(
        "Polynomial fit (degree {}): {} samples, RSS {:.6e}",
        degree.order(),
        n,
        surface.rss
    );

    Ok(surface)
}

/// [`Interpolator`] that fits a polynomial trend and evaluates it on the grid.
#[derive(Debug, Clone)]
pub struct PolynomialInterpolator {
    pub degree: PolynomialDegree,
}

impl PolynomialInterpolator {
    pub fn new(degree: PolynomialDegree) -> Self {
        Self { degree }
    }
}

impl Interpolator for PolynomialInterpolator {
    fn name(&self) -> &'static str {
        match self.degree {
            PolynomialDegree::Linear => "polynomial-1",
            PolynomialDegree::Quadratic => "polynomial-2",
        }
    }

    fn description(&self) -> &'static str {
        "Least-squares polynomial trend surface"
    }

    fn interpolate(&self, samples: &SampleSet, grid: &Grid) -> Result<Interpolation> {
        let fitted = fit_polynomial(samples, self.degree)?;
        fitted.predict(grid).map(Interpolation::estimate_only)
    }
}
