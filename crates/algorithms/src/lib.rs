//! # Phreatic Algorithms
//!
//! Surface estimation from scattered water-table measurements.
//!
//! ## Available Algorithm Categories
//!
//! - **interpolation**: IDW, polynomial trend surfaces, empirical variogram,
//!   ordinary kriging, regression kriging
//! - **evaluation**: leave-one-out cross-validation of any [`Interpolator`]
//! - **linalg**: the dense solvers behind the regression and kriging systems
//!
//! [`Interpolator`]: phreatic_core::Interpolator

pub mod evaluation;
pub mod interpolation;
pub mod linalg;

mod grid_eval;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::evaluation::{leave_one_out, CrossValidation};
    pub use crate::interpolation::{
        empirical_variogram, fit_polynomial, idw, ordinary_kriging, regression_kriging,
        EmpiricalVariogram, IdwInterpolator, IdwParams, KrigingInterpolator,
        OrdinaryKriging, OrdinaryKrigingParams, PolynomialDegree, PolynomialInterpolator,
        PolynomialSurface, RegressionKrigingInterpolator, RegressionKrigingParams,
        VariogramModel, VariogramParams,
    };
    pub use phreatic_core::prelude::*;
}
