//! Grid-shaped value surfaces

use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::error::{Error, Result};

/// A dense `(rows, cols)` array of values aligned with a [`Grid`](super::Grid).
///
/// Used for both prediction and kriging-variance surfaces. Each interpolation
/// run creates fresh surfaces owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Values in row-major order (row = y index, col = x index)
    data: Array2<f64>,
}

impl Surface {
    /// Create a surface filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create a surface from row-major data
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: data.len() / cols.max(1),
                ac: cols,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data).map_err(|_| Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: rows,
            ac: cols,
        })?;

        Ok(Self { data: array })
    }

    /// Create a surface from an ndarray
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume and return the underlying array
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Consume into the `(rows, cols, values)` form handed to renderers,
    /// values in row-major order.
    pub fn into_raw(self) -> (usize, usize, Vec<f64>) {
        let (rows, cols) = self.data.dim();
        let values = if self.data.is_standard_layout() {
            self.data.into_raw_vec_and_offset().0
        } else {
            self.data.iter().copied().collect()
        };
        (rows, cols, values)
    }

    /// Rows as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Calculate basic statistics over the finite cells
    pub fn statistics(&self) -> SurfaceStatistics {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter().filter(|v| v.is_finite()) {
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
            sum += value;
            count += 1;
        }

        SurfaceStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
        }
    }
}

/// Basic statistics for a surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_creation() {
        let surface = Surface::filled(100, 200, 0.0);
        assert_eq!(surface.rows(), 100);
        assert_eq!(surface.cols(), 200);
        assert_eq!(surface.shape(), (100, 200));
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        assert!(Surface::from_vec(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let s = Surface::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(s.get(1, 0).unwrap(), 3.0);
        assert!(s.get(2, 0).is_err());
    }

    #[test]
    fn test_into_raw_row_major() {
        let s = Surface::from_vec((0..6).map(f64::from).collect(), 2, 3).unwrap();
        assert_eq!(s.to_rows(), vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
        let (rows, cols, values) = s.into_raw();
        assert_eq!((rows, cols), (2, 3));
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_surface_statistics() {
        let data: Vec<f64> = (0..100).map(f64::from).collect();
        let surface = Surface::from_vec(data, 10, 10).unwrap();

        let stats = surface.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.mean, Some(49.5));
        assert_eq!(stats.valid_count, 100);
    }
}
