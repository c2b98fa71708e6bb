//! Empirical (experimental) variogram
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! separation distance h:
//! ```text
//! γ(h) = (1/N(h)) Σ ½·[z(xᵢ) − z(xⱼ)]²   over the N(h) pairs with |xᵢ−xⱼ| in bin h
//! ```
//!
//! The binned values are a diagnostic: they let a supplied
//! [`VariogramModel`] be checked against the data. Kriging itself uses the
//! model directly.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use phreatic_core::{Error, Result, SampleSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::variogram_model::VariogramModel;

/// Parameters for empirical variogram computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariogramParams {
    /// Number of equal-width distance bins (default 10)
    pub n_bins: usize,
    /// Maximum lag distance. If `None`, bins span the observed range of
    /// pair distances, [min, max]. If set, bins span [0, max_lag] and
    /// pairs farther apart are ignored.
    pub max_lag: Option<f64>,
}

impl Default for VariogramParams {
    fn default() -> Self {
        Self {
            n_bins: 10,
            max_lag: None,
        }
    }
}

/// One distance bin of the empirical variogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalVariogramBin {
    /// Lower bin edge (inclusive)
    pub lower: f64,
    /// Upper bin edge (exclusive, except for the last bin)
    pub upper: f64,
    /// Mean separation of the pairs in the bin. `None` if the bin is empty.
    pub mean_distance: Option<f64>,
    /// Mean half squared difference. `None` if the bin is empty.
    pub semivariance: Option<f64>,
    /// Number of sample pairs in the bin
    pub pair_count: usize,
}

impl EmpiricalVariogramBin {
    /// Midpoint of the bin edges
    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count == 0
    }
}

/// Empirical variogram: semivariance per distance bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalVariogram {
    pub bins: Vec<EmpiricalVariogramBin>,
}

impl EmpiricalVariogram {
    /// Compute with `n_bins` equal-width bins over the observed distance range.
    pub fn compute(samples: &SampleSet, n_bins: usize) -> Result<Self> {
        empirical_variogram(
            samples,
            VariogramParams {
                n_bins,
                ..Default::default()
            },
        )
    }

    /// Bins that received at least one pair
    pub fn populated(&self) -> impl Iterator<Item = &EmpiricalVariogramBin> {
        self.bins.iter().filter(|b| !b.is_empty())
    }

    /// Total number of pairs binned
    pub fn total_pairs(&self) -> usize {
        self.bins.iter().map(|b| b.pair_count).sum()
    }

    /// Pair-count-weighted residual sum of squares of `model` against the
    /// populated bins, evaluated at each bin's mean separation. Lower means
    /// a closer match; this does not adjust the model.
    pub fn model_rss(&self, model: &VariogramModel) -> f64 {
        self.populated()
            .filter_map(|b| Some((b.mean_distance?, b.semivariance?, b.pair_count)))
            .map(|(h, sv, cnt)| {
                let residual = sv - model.semivariance(h);
                cnt as f64 * residual * residual
            })
            .sum()
    }
}

/// Compute the empirical variogram from sample points.
///
/// Every unordered pair of distinct samples contributes its separation and
/// ½(zᵢ − zⱼ)² to one bin. Bins are equal-width; when all pairs share one
/// distance they all land in the first bin.
///
/// # Errors
/// - [`Error::DegenerateInput`] if fewer than 2 samples are provided
/// - [`Error::Configuration`] if `n_bins` is zero or `max_lag` is not positive
pub fn empirical_variogram(
    samples: &SampleSet,
    params: VariogramParams,
) -> Result<EmpiricalVariogram> {
    let n = samples.len();
    if n < 2 {
        return Err(Error::DegenerateInput(
            "Need at least 2 points for variogram".into(),
        ));
    }
    if params.n_bins == 0 {
        return Err(Error::Configuration(
            "Variogram needs at least one bin".into(),
        ));
    }

    let pts = samples.as_slice();
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = pts[i].dist_to(&pts[j]);
            let dz = pts[i].z - pts[j].z;
            pairs.push((d, 0.5 * dz * dz));
        }
    }

    let (lo, hi) = match params.max_lag {
        Some(m) if m.is_finite() && m > 0.0 => {
            pairs.retain(|&(d, _)| d <= m);
            (0.0, m)
        }
        Some(m) => {
            return Err(Error::Configuration(format!(
                "Max lag must be positive, got {}",
                m
            )));
        }
        None => pairs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(d, _)| {
                (lo.min(d), hi.max(d))
            }),
    };

    let n_bins = params.n_bins;
    let width = (hi - lo) / n_bins as f64;

    let mut dist_sum = vec![0.0_f64; n_bins];
    let mut sv_sum = vec![0.0_f64; n_bins];
    let mut counts = vec![0_usize; n_bins];

    for &(d, half_sq) in &pairs {
        let bin = if width > 0.0 {
            (((d - lo) / width).floor() as usize).min(n_bins - 1)
        } else {
            0
        };
        dist_sum[bin] += d;
        sv_sum[bin] += half_sq;
        counts[bin] += 1;
    }

    let bins = (0..n_bins)
        .map(|k| {
            let cnt = counts[k];
            EmpiricalVariogramBin {
                lower: lo + k as f64 * width,
                upper: lo + (k + 1) as f64 * width,
                mean_distance: (cnt > 0).then(|| dist_sum[k] / cnt as f64),
                semivariance: (cnt > 0).then(|| sv_sum[k] / cnt as f64),
                pair_count: cnt,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "Empirical variogram: {} pairs into {} bins over [{:.4}, {:.4}]",
        pairs.len(),
        n_bins,
        lo,
        hi
    );

    Ok(EmpiricalVariogram { bins })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_spatially_correlated(n: usize, range: f64, seed: u64) -> SampleSet {
        // Simple pseudo-random spatially correlated points
        let mut pts = Vec::with_capacity(n);
        let mut rng = seed;
        let mut next = || {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 33) as f64 / (1u64 << 31) as f64
        };

        for _ in 0..n {
            let x = next() * 100.0;
            let y = next() * 100.0;
            let noise = next() * 2.0 - 1.0;
            let value = 0.5 * x + 0.3 * y + 10.0 * ((x / range).sin() + (y / range).sin());
            pts.push((x, y, value + noise));
        }

        SampleSet::from_xyz(&pts).unwrap()
    }

    #[test]
    fn test_empirical_variogram_basic() {
        let samples = generate_spatially_correlated(100, 20.0, 42);
        let result = empirical_variogram(&samples, VariogramParams::default()).unwrap();

        assert_eq!(result.bins.len(), 10);
        assert_eq!(result.total_pairs(), 100 * 99 / 2);
        assert!(result.bins[0].pair_count > 0, "First bin should have pairs");

        // Semivariance grows with distance for spatially correlated data
        let first = result.bins[0].semivariance.unwrap();
        let mid = result.bins[5].semivariance.unwrap();
        assert!(first < mid, "Semivariance should increase: first={:.2}, mid={:.2}", first, mid);
    }

    #[test]
    fn test_hand_computed_bins() {
        // Pairs: (0,1) d=1 ½·1²; (0,2) d=3 ½·3²; (1,2) d=2 ½·2²
        let samples =
            SampleSet::from_xyz(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (3.0, 0.0, 3.0)]).unwrap();
        let result = EmpiricalVariogram::compute(&samples, 2).unwrap();

        // Observed range [1, 3], width 1: bin 0 = [1, 2), bin 1 = [2, 3]
        assert_eq!(result.bins[0].lower, 1.0);
        assert_eq!(result.bins[1].upper, 3.0);
        assert_eq!(result.bins[0].pair_count, 1);
        assert_eq!(result.bins[1].pair_count, 2);
        assert_eq!(result.bins[0].semivariance, Some(0.5));
        assert_eq!(result.bins[1].semivariance, Some((4.5 + 2.0) / 2.0));
        assert_eq!(result.bins[1].mean_distance, Some(2.5));
    }

    #[test]
    fn test_empty_bins_marked() {
        // Two clusters: short and long separations only
        let samples = SampleSet::from_xyz(&[
            (0.0, 0.0, 1.0),
            (0.1, 0.0, 1.1),
            (100.0, 0.0, 5.0),
            (100.1, 0.0, 5.2),
        ])
        .unwrap();
        let result = EmpiricalVariogram::compute(&samples, 10).unwrap();

        let empty: Vec<_> = result.bins.iter().filter(|b| b.is_empty()).collect();
        assert!(!empty.is_empty(), "Expected empty middle bins");
        for b in empty {
            assert_eq!(b.semivariance, None);
            assert_eq!(b.mean_distance, None);
        }
        assert_eq!(result.total_pairs(), 6);
    }

    #[test]
    fn test_max_lag_drops_far_pairs() {
        let samples =
            SampleSet::from_xyz(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (10.0, 0.0, 3.0)]).unwrap();
        let params = VariogramParams {
            n_bins: 4,
            max_lag: Some(2.0),
        };
        let result = empirical_variogram(&samples, params).unwrap();
        assert_eq!(result.total_pairs(), 1);
        assert_eq!(result.bins[0].lower, 0.0);
        assert_eq!(result.bins[3].upper, 2.0);
        assert_eq!(result.bins[2].pair_count, 1);
    }

    #[test]
    fn test_single_distance() {
        let samples = SampleSet::from_xyz(&[(0.0, 0.0, 2.0), (3.0, 4.0, 6.0)]).unwrap();
        let result = EmpiricalVariogram::compute(&samples, 5).unwrap();
        assert_eq!(result.bins[0].pair_count, 1);
        assert_eq!(result.bins[0].semivariance, Some(8.0));
        assert_eq!(result.populated().count(), 1);
    }

    #[test]
    fn test_too_few_points() {
        let samples = SampleSet::from_xyz(&[(0.0, 0.0, 1.0)]).unwrap();
        assert!(matches!(
            EmpiricalVariogram::compute(&samples, 5),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_invalid_configuration() {
        let samples = SampleSet::from_xyz(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0)]).unwrap();
        assert!(matches!(
            EmpiricalVariogram::compute(&samples, 0),
            Err(Error::Configuration(_))
        ));
        let params = VariogramParams {
            n_bins: 3,
            max_lag: Some(-1.0),
        };
        assert!(matches!(
            empirical_variogram(&samples, params),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_model_rss_prefers_matching_model() {
        // Values linear in x: γ(h) = ½h² along a line
        let pts: Vec<(f64, f64, f64)> = (0..12).map(|i| (i as f64, 0.0, i as f64)).collect();
        let samples = SampleSet::from_xyz(&pts).unwrap();
        let emp = EmpiricalVariogram::compute(&samples, 6).unwrap();

        let good = VariogramModel::power(0.0, 0.5, 1.99).unwrap();
        let bad = VariogramModel::power(0.0, 0.5, 0.5).unwrap();
        assert!(emp.model_rss(&good) < emp.model_rss(&bad));
    }
}
