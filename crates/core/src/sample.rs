//! Control points: measured values at scattered locations

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A location in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another location
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another location
    #[inline]
    pub fn dist(&self, other_x: f64, other_y: f64) -> f64 {
        self.dist_sq(other_x, other_y).sqrt()
    }
}

/// A measured value `z` at a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub location: Point2D,
    pub z: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            location: Point2D::new(x, y),
            z,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.location.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.location.y
    }

    /// Euclidean distance from this sample to `(x, y)`
    #[inline]
    pub fn dist(&self, x: f64, y: f64) -> f64 {
        self.location.dist(x, y)
    }

    /// Euclidean distance between two samples
    #[inline]
    pub fn dist_to(&self, other: &Sample) -> f64 {
        self.location.dist(other.x(), other.y())
    }
}

/// One row of a monitoring-well table.
///
/// The water-table elevation is the surveyed top-of-casing elevation minus
/// the measured depth to water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub top_of_casing: f64,
    pub depth_to_water: f64,
}

impl WellRecord {
    pub fn water_table_elevation(&self) -> f64 {
        self.top_of_casing - self.depth_to_water
    }
}

impl From<&WellRecord> for Sample {
    fn from(well: &WellRecord) -> Self {
        Sample::new(well.x, well.y, well.water_table_elevation())
    }
}

/// Immutable, non-empty, ordered collection of samples.
///
/// Order carries no meaning for the estimators except as the tie-break
/// when several samples coincide with a query location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Build a sample set, rejecting empty input and non-finite values.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::DegenerateInput("No sample points provided".into()));
        }
        if let Some((i, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.x().is_finite() && s.y().is_finite() && s.z.is_finite()))
        {
            return Err(Error::DegenerateInput(format!(
                "Sample {} has a non-finite coordinate or value: ({}, {}, {})",
                i,
                s.x(),
                s.y(),
                s.z
            )));
        }
        Ok(Self { samples })
    }

    /// Build a sample set from `(x, y, z)` triples.
    pub fn from_xyz(triples: &[(f64, f64, f64)]) -> Result<Self> {
        Self::new(
            triples
                .iter()
                .map(|&(x, y, z)| Sample::new(x, y, z))
                .collect(),
        )
    }

    /// Build a sample set from well records.
    pub fn from_wells(wells: &[WellRecord]) -> Result<Self> {
        Self::new(wells.iter().map(Sample::from).collect())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Measured values in sample order
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.z).collect()
    }

    /// (min, max) of the measured values
    pub fn value_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.z), hi.max(s.z))
            })
    }

    /// Sample variance of the measured values (divisor n, zero for n = 1)
    pub fn variance(&self) -> f64 {
        let n = self.samples.len() as f64;
        let mean = self.samples.iter().map(|s| s.z).sum::<f64>() / n;
        self.samples
            .iter()
            .map(|s| (s.z - mean) * (s.z - mean))
            .sum::<f64>()
            / n
    }

    /// Bounding box (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.samples.iter().fold(
            (
                f64::INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
            ),
            |(x0, y0, x1, y1), s| (x0.min(s.x()), y0.min(s.y()), x1.max(s.x()), y1.max(s.y())),
        )
    }

    /// A copy of the set with the sample at `index` removed.
    ///
    /// Fails if the result would be empty or `index` is out of range.
    pub fn without(&self, index: usize) -> Result<Self> {
        if index >= self.samples.len() {
            return Err(Error::Configuration(format!(
                "Sample index {} out of range for {} samples",
                index,
                self.samples.len()
            )));
        }
        let mut rest = self.samples.clone();
        rest.remove(index);
        Self::new(rest)
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<'de> Deserialize<'de> for SampleSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let samples = Vec::<Sample>::deserialize(deserializer)?;
        SampleSet::new(samples).map_err(serde::de::Error::custom)
    }
}
