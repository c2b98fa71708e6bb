//! Leave-one-out cross-validation
//!
//! Each sample is withheld in turn, predicted from the remaining ones with
//! the interpolator under test, and compared to its measured value. The
//! summary statistics allow the estimation methods to be compared on the
//! same sample set.

use phreatic_core::{Error, Interpolator, Result, SampleSet};
use serde::Serialize;
use tracing::debug;

use crate::maybe_rayon::*;

/// Leave-one-out report for one interpolation method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    /// Name of the method that was validated
    pub method: &'static str,
    /// Prediction at each sample location from the other samples
    pub predictions: Vec<f64>,
    /// `prediction − measured` for each sample, in sample order
    pub errors: Vec<f64>,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean error (bias)
    pub mean_error: f64,
}

/// Run leave-one-out cross-validation of `interpolator` on `samples`.
///
/// # Errors
/// - [`Error::DegenerateInput`] with fewer than 2 samples
/// - Any error the interpolator raises on a reduced sample set, e.g. a
///   quadratic fit left with fewer than 6 samples
pub fn leave_one_out(interpolator: &dyn Interpolator, samples: &SampleSet) -> Result<CrossValidation> {
    let n = samples.len();
    if n < 2 {
        return Err(Error::DegenerateInput(
            "Cross-validation requires at least 2 sample points".into(),
        ));
    }

    debug!(
        "Leave-one-out cross-validation of {} over {} samples",
        interpolator.name(),
        n
    );

    let predictions: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| {
            let rest = samples.without(i)?;
            let s = &samples.as_slice()[i];
            interpolator.interpolate_at(&rest, s.x(), s.y())
        })
        .collect::<Result<Vec<f64>>>()?;

    let errors: Vec<f64> = predictions
        .iter()
        .zip(samples)
        .map(|(p, s)| p - s.z)
        .collect();

    let nf = n as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / nf).sqrt();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / nf;
    let mean_error = errors.iter().sum::<f64>() / nf;

    Ok(CrossValidation {
        method: interpolator.name(),
        predictions,
        errors,
        rmse,
        mae,
        mean_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::{
        IdwInterpolator, KrigingInterpolator, OrdinaryKrigingParams, PolynomialDegree,
        PolynomialInterpolator, VariogramModel,
    };

    fn plane_samples() -> SampleSet {
        let mut triples = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                let x = 25.0 * i as f64;
                let y = 25.0 * j as f64;
                triples.push((x, y, 10.0 + 0.2 * x - 0.1 * y));
            }
        }
        SampleSet::from_xyz(&triples).unwrap()
    }

    #[test]
    fn test_polynomial_recovers_plane() {
        let cv = leave_one_out(&PolynomialInterpolator::new(PolynomialDegree::Linear), &plane_samples())
            .unwrap();
        assert_eq!(cv.method, "polynomial-1");
        assert_eq!(cv.errors.len(), 16);
        assert!(cv.rmse < 1e-9, "Plane should be predicted exactly, RMSE = {}", cv.rmse);
    }

    #[test]
    fn test_statistics_consistent() {
        let cv = leave_one_out(&IdwInterpolator::default(), &plane_samples()).unwrap();
        assert!(cv.rmse > 0.0);
        assert!(cv.mae <= cv.rmse + 1e-12, "MAE {} > RMSE {}", cv.mae, cv.rmse);
        assert!(cv.mean_error.abs() <= cv.mae + 1e-12);

        for ((p, e), s) in cv.predictions.iter().zip(&cv.errors).zip(&plane_samples()) {
            assert!((p - s.z - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kriging_beats_idw_on_plane() {
        let samples = plane_samples();
        let idw = leave_one_out(&IdwInterpolator::default(), &samples).unwrap();
        let kriging = leave_one_out(
            &KrigingInterpolator::new(OrdinaryKrigingParams::new(
                VariogramModel::power(0.0, 1.0, 1.5).unwrap(),
            )),
            &samples,
        )
        .unwrap();
        assert!(
            kriging.rmse < idw.rmse,
            "kriging RMSE {} should beat IDW RMSE {}",
            kriging.rmse,
            idw.rmse
        );
    }

    #[test]
    fn test_too_few_samples() {
        let samples = SampleSet::from_xyz(&[(0.0, 0.0, 1.0)]).unwrap();
        let err = leave_one_out(&IdwInterpolator::default(), &samples).unwrap_err();
        assert!(matches!(err, Error::DegenerateInput(_)));
    }

    #[test]
    fn test_method_error_propagates() {
        // Quadratic needs 6 samples; withholding one from 6 leaves 5
        let samples = SampleSet::from_xyz(&[
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 2.0),
            (0.0, 1.0, 3.0),
            (1.0, 1.0, 4.0),
            (2.0, 0.5, 5.0),
            (0.5, 2.0, 6.0),
        ])
        .unwrap();
        let err = leave_one_out(&PolynomialInterpolator::new(PolynomialDegree::Quadratic), &samples)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnderdeterminedSystem { samples: 5, coefficients: 6 }
        ));
    }
}
