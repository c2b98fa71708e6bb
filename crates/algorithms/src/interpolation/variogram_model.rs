//! Theoretical variogram models
//!
//! Closed-form semivariance functions γ(h) with externally supplied
//! parameters. Nothing here estimates parameters from data; compare a model
//! against an [`EmpiricalVariogram`](super::EmpiricalVariogram) with
//! [`EmpiricalVariogram::model_rss`](super::EmpiricalVariogram::model_rss).
//!
//! Every model has γ(0) = 0 and jumps to the nugget c₀ for h > 0.
//!
//! Reference:
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.
//! Webster, R. & Oliver, M.A. (2007). Geostatistics for Environmental
//! Scientists. Wiley.

use phreatic_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Variogram model with its parameters.
///
/// Construct through [`VariogramModel::power`], [`VariogramModel::spherical`],
/// [`VariogramModel::exponential`] or [`VariogramModel::gaussian`], which
/// validate the parameters. Values built directly (or deserialized) are
/// validated again by the kriging solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariogramModel {
    /// Power model: γ(h) = c₀ + s·h^α, 0 < α < 2. Unbounded (no sill).
    Power {
        nugget: f64,
        scale: f64,
        exponent: f64,
    },
    /// Spherical model: γ(h) = c₀ + c·[1.5(h/a) − 0.5(h/a)³] for h ≤ a; c₀ + c beyond
    Spherical {
        nugget: f64,
        partial_sill: f64,
        range: f64,
    },
    /// Exponential model: γ(h) = c₀ + c·[1 − exp(−3h/a)] (practical range a)
    Exponential {
        nugget: f64,
        partial_sill: f64,
        range: f64,
    },
    /// Gaussian model: γ(h) = c₀ + c·[1 − exp(−3h²/a²)] (practical range a)
    Gaussian {
        nugget: f64,
        partial_sill: f64,
        range: f64,
    },
}

impl VariogramModel {
    pub fn power(nugget: f64, scale: f64, exponent: f64) -> Result<Self> {
        let model = VariogramModel::Power {
            nugget,
            scale,
            exponent,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn spherical(nugget: f64, partial_sill: f64, range: f64) -> Result<Self> {
        let model = VariogramModel::Spherical {
            nugget,
            partial_sill,
            range,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn exponential(nugget: f64, partial_sill: f64, range: f64) -> Result<Self> {
        let model = VariogramModel::Exponential {
            nugget,
            partial_sill,
            range,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn gaussian(nugget: f64, partial_sill: f64, range: f64) -> Result<Self> {
        let model = VariogramModel::Gaussian {
            nugget,
            partial_sill,
            range,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check the parameter domain.
    ///
    /// # Errors
    /// [`Error::InvalidModelParameter`] for a negative or non-finite nugget,
    /// a non-positive scale, partial sill or range, or a power exponent
    /// outside (0, 2).
    pub fn validate(&self) -> Result<()> {
        check(
            "nugget",
            self.nugget(),
            |v| v >= 0.0,
            "must be non-negative",
        )?;
        match *self {
            VariogramModel::Power {
                scale, exponent, ..
            } => {
                check("scale", scale, |v| v > 0.0, "must be positive")?;
                check(
                    "exponent",
                    exponent,
                    |v| v > 0.0 && v < 2.0,
                    "must lie in (0, 2)",
                )
            }
            VariogramModel::Spherical {
                partial_sill,
                range,
                ..
            }
            | VariogramModel::Exponential {
                partial_sill,
                range,
                ..
            }
            | VariogramModel::Gaussian {
                partial_sill,
                range,
                ..
            } => {
                check("partial_sill", partial_sill, |v| v > 0.0, "must be positive")?;
                check("range", range, |v| v > 0.0, "must be positive")
            }
        }
    }

    /// Short model name
    pub fn kind(&self) -> &'static str {
        match self {
            VariogramModel::Power { .. } => "power",
            VariogramModel::Spherical { .. } => "spherical",
            VariogramModel::Exponential { .. } => "exponential",
            VariogramModel::Gaussian { .. } => "gaussian",
        }
    }

    /// Nugget (c₀): semivariance just above zero separation
    pub fn nugget(&self) -> f64 {
        match *self {
            VariogramModel::Power { nugget, .. }
            | VariogramModel::Spherical { nugget, .. }
            | VariogramModel::Exponential { nugget, .. }
            | VariogramModel::Gaussian { nugget, .. } => nugget,
        }
    }

    /// Total sill (c₀ + c). `None` for the unbounded power model.
    pub fn sill(&self) -> Option<f64> {
        match *self {
            VariogramModel::Power { .. } => None,
            VariogramModel::Spherical {
                nugget,
                partial_sill,
                ..
            }
            | VariogramModel::Exponential {
                nugget,
                partial_sill,
                ..
            }
            | VariogramModel::Gaussian {
                nugget,
                partial_sill,
                ..
            } => Some(nugget + partial_sill),
        }
    }

    /// Semivariance γ(h). γ(0) = 0; for h > 0 the nugget is included.
    pub fn semivariance(&self, h: f64) -> f64 {
        if h <= 0.0 {
            return 0.0;
        }
        self.nugget() + self.structured(h)
    }

    /// Semivariance between two *distinct* observations separated by `h`.
    ///
    /// Identical to [`semivariance`](Self::semivariance) except at h = 0,
    /// where two different measurements still differ by the nugget. This
    /// is what keeps coincident samples from making the kriging system
    /// singular when the nugget is positive.
    pub fn pair_semivariance(&self, h: f64) -> f64 {
        self.nugget() + self.structured(h.max(0.0))
    }

    /// Covariance C(h) = C(0) − γ(h) relative to the ceiling `c0`.
    #[inline]
    pub fn covariance(&self, h: f64, c0: f64) -> f64 {
        c0 - self.semivariance(h)
    }

    /// Nugget-free part of the model, zero at h = 0
    fn structured(&self, h: f64) -> f64 {
        match *self {
            VariogramModel::Power {
                scale, exponent, ..
            } => scale * h.powf(exponent),
            VariogramModel::Spherical {
                partial_sill,
                range,
                ..
            } => {
                if h >= range {
                    partial_sill
                } else {
                    let hr = h / range;
                    partial_sill * (1.5 * hr - 0.5 * hr * hr * hr)
                }
            }
            VariogramModel::Exponential {
                partial_sill,
                range,
                ..
            } => partial_sill * (1.0 - (-3.0 * h / range).exp()),
            VariogramModel::Gaussian {
                partial_sill,
                range,
                ..
            } => partial_sill * (1.0 - (-3.0 * h * h / (range * range)).exp()),
        }
    }
}

fn check(name: &'static str, value: f64, ok: impl Fn(f64) -> bool, reason: &str) -> Result<()> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(Error::InvalidModelParameter {
            name,
            value,
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_model() {
        let model = VariogramModel::power(0.5, 2.0, 1.5).unwrap();
        assert_eq!(model.semivariance(0.0), 0.0);
        assert!((model.semivariance(4.0) - (0.5 + 2.0 * 8.0)).abs() < 1e-12);
        assert_eq!(model.sill(), None);
        assert_eq!(model.kind(), "power");
    }

    #[test]
    fn test_power_model_parameter_domain() {
        assert!(matches!(
            VariogramModel::power(-0.1, 1.0, 1.0),
            Err(Error::InvalidModelParameter { name: "nugget", .. })
        ));
        assert!(matches!(
            VariogramModel::power(0.0, 1.0, 0.0),
            Err(Error::InvalidModelParameter { name: "exponent", .. })
        ));
        assert!(matches!(
            VariogramModel::power(0.0, 1.0, 2.0),
            Err(Error::InvalidModelParameter { name: "exponent", .. })
        ));
        assert!(matches!(
            VariogramModel::power(0.0, 0.0, 1.0),
            Err(Error::InvalidModelParameter { name: "scale", .. })
        ));
        assert!(VariogramModel::power(0.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_spherical_evaluation() {
        let model = VariogramModel::spherical(1.0, 9.0, 50.0).unwrap();

        assert!(model.semivariance(0.0).abs() < 1e-10);
        assert!((model.semivariance(50.0) - 10.0).abs() < 1e-10);
        assert!((model.semivariance(100.0) - 10.0).abs() < 1e-10);

        let mid = model.semivariance(25.0);
        assert!(mid > 1.0 && mid < 10.0, "Mid should be between nugget and sill: {:.2}", mid);
        assert_eq!(model.sill(), Some(10.0));
    }

    #[test]
    fn test_exponential_practical_range() {
        let model = VariogramModel::exponential(0.0, 10.0, 30.0).unwrap();
        let at_range = model.semivariance(30.0);
        assert!(
            at_range > 9.0 && at_range < 10.0,
            "At range, should be ~95% of sill: got {:.2}",
            at_range
        );
    }

    #[test]
    fn test_gaussian_smooth_origin() {
        let model = VariogramModel::gaussian(0.0, 4.0, 10.0).unwrap();
        // Parabolic near the origin: much smaller than linear growth
        assert!(model.semivariance(0.1) < 0.01);
        assert!((model.semivariance(1e6) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_semivariance_keeps_nugget_at_zero() {
        let model = VariogramModel::power(0.25, 1.0, 1.0).unwrap();
        assert_eq!(model.semivariance(0.0), 0.0);
        assert_eq!(model.pair_semivariance(0.0), 0.25);
        assert_eq!(model.pair_semivariance(3.0), model.semivariance(3.0));
    }

    #[test]
    fn test_covariance_from_ceiling() {
        let model = VariogramModel::spherical(0.0, 10.0, 20.0).unwrap();
        assert_eq!(model.covariance(0.0, 10.0), 10.0);
        assert!(model.covariance(40.0, 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_serde_tagged() {
        let json = r#"{"kind":"power","nugget":0.0,"scale":0.8,"exponent":1.2}"#;
        let model: VariogramModel = serde_json::from_str(json).unwrap();
        assert_eq!(model, VariogramModel::power(0.0, 0.8, 1.2).unwrap());

        let back = serde_json::to_string(&model).unwrap();
        assert!(back.contains(r#""kind":"power""#), "{}", back);
    }
}
