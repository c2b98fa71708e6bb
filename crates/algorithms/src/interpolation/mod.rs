//! Spatial interpolation algorithms
//!
//! Estimate a scalar field on a rectilinear grid from scattered samples:
//! - IDW: Inverse Distance Weighting
//! - Polynomial: least-squares trend surfaces of degree 1 or 2
//! - Variogram: empirical variogram and closed-form variogram models
//! - Ordinary Kriging: BLUE geostatistical interpolation with variance
//! - Regression Kriging: polynomial trend + OK on residuals

mod idw;
pub mod kriging;
mod polynomial;
mod regression_kriging;
pub mod variogram;
mod variogram_model;

pub use idw::{idw, idw_at, IdwInterpolator, IdwParams};
pub use kriging::{
    ordinary_kriging, KrigingEstimate, KrigingInterpolator, KrigingResult, OrdinaryKriging,
    OrdinaryKrigingParams,
};
pub use polynomial::{
    fit_polynomial, CoordinateFrame, PolynomialDegree, PolynomialInterpolator, PolynomialSurface,
};
pub use regression_kriging::{
    regression_kriging, RegressionKrigingInterpolator, RegressionKrigingParams,
    RegressionKrigingResult,
};
pub use variogram::{
    empirical_variogram, EmpiricalVariogram, EmpiricalVariogramBin, VariogramParams,
};
pub use variogram_model::VariogramModel;
