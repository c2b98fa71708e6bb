//! Rectilinear evaluation grid

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest number of nodes [`Grid::with_step`] will place on one axis.
pub const MAX_AXIS_LEN: usize = 100_000;

/// Largest number of grid nodes [`Grid::with_step`] will create.
pub const MAX_GRID_NODES: usize = 25_000_000;

/// Target evaluation domain defined by two strictly increasing axes.
///
/// The grid holds `xs.len() × ys.len()` query points. Surfaces built on a
/// grid are shaped `(rows, cols) = (ys.len(), xs.len())`: the cell at
/// `(row, col)` lies at `(xs[col], ys[row])`. Spacing need not be uniform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Grid {
    /// Create a grid from explicit axis coordinates.
    ///
    /// # Errors
    /// [`Error::Configuration`] if an axis is empty, contains a non-finite
    /// value, or is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        check_axis("x", &xs)?;
        check_axis("y", &ys)?;
        Ok(Self { xs, ys })
    }

    /// Create a grid with a constant step on both axes, from `min` up to and
    /// including `max` (within half a step).
    ///
    /// `Grid::with_step((1.0, 50.0), (1.0, 50.0), 1.0)` yields the 50 × 50
    /// integer lattice `1..=50`.
    ///
    /// # Errors
    /// [`Error::Configuration`] for a non-positive step, an inverted range,
    /// more than [`MAX_AXIS_LEN`] nodes on an axis, or more than
    /// [`MAX_GRID_NODES`] nodes in total.
    pub fn with_step(x_range: (f64, f64), y_range: (f64, f64), step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::Configuration(format!(
                "Grid step must be positive and finite, got {}",
                step
            )));
        }
        let nx = axis_len("x", x_range, step)?;
        let ny = axis_len("y", y_range, step)?;
        match nx.checked_mul(ny) {
            Some(total) if total <= MAX_GRID_NODES => {}
            _ => {
                return Err(Error::Configuration(format!(
                    "Grid of {} x {} nodes exceeds the limit of {} nodes",
                    nx, ny, MAX_GRID_NODES
                )));
            }
        }
        Self::new(
            stepped_axis(x_range.0, nx, step),
            stepped_axis(y_range.0, ny, step),
        )
    }

    /// A single-point grid, used to evaluate an interpolator at one location.
    pub fn point(x: f64, y: f64) -> Result<Self> {
        Self::new(vec![x], vec![y])
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Number of rows (length of the y axis)
    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    /// Number of columns (length of the x axis)
    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Total number of query points
    pub fn len(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of cell `(row, col)`. Panics if out of range.
    #[inline]
    pub fn coord(&self, row: usize, col: usize) -> (f64, f64) {
        (self.xs[col], self.ys[row])
    }

    /// Bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            self.xs[0],
            self.ys[0],
            self.xs[self.xs.len() - 1],
            self.ys[self.ys.len() - 1],
        )
    }

    /// Cell `(row, col)` whose coordinates are closest to `(x, y)`.
    ///
    /// Ties between two neighbouring axis values go to the lower index.
    pub fn nearest_cell(&self, x: f64, y: f64) -> (usize, usize) {
        (nearest_index(&self.ys, y), nearest_index(&self.xs, x))
    }
}

fn check_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(Error::Configuration(format!("{} axis is empty", name)));
    }
    if let Some(v) = axis.iter().find(|v| !v.is_finite()) {
        return Err(Error::Configuration(format!(
            "{} axis contains non-finite value {}",
            name, v
        )));
    }
    if let Some(i) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::Configuration(format!(
            "{} axis is not strictly increasing at index {} ({} then {})",
            name,
            i + 1,
            axis[i],
            axis[i + 1]
        )));
    }
    Ok(())
}

/// Number of nodes from `min` to `max` (within half a step).
fn axis_len(name: &str, (min, max): (f64, f64), step: f64) -> Result<usize> {
    if !(min.is_finite() && max.is_finite()) || max < min {
        return Err(Error::Configuration(format!(
            "Invalid {} axis range [{}, {}]",
            name, min, max
        )));
    }
    let intervals = ((max - min) / step + 0.5).floor();
    if !(intervals.is_finite() && intervals < MAX_AXIS_LEN as f64) {
        return Err(Error::Configuration(format!(
            "Step {} over [{}, {}] gives more than {} {} nodes",
            step, min, max, MAX_AXIS_LEN, name
        )));
    }
    (intervals as usize).checked_add(1).ok_or_else(|| {
        Error::Configuration(format!("{} axis node count overflows", name))
    })
}

fn stepped_axis(min: f64, n: usize, step: f64) -> Vec<f64> {
    (0..n).map(|i| min + i as f64 * step).collect()
}

fn nearest_index(axis: &[f64], v: f64) -> usize {
    let upper = axis.partition_point(|&a| a < v);
    if upper == 0 {
        0
    } else if upper == axis.len() {
        axis.len() - 1
    } else if v - axis[upper - 1] <= axis[upper] - v {
        upper - 1
    } else {
        upper
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Axes {
            xs: Vec<f64>,
            ys: Vec<f64>,
        }
        let axes = Axes::deserialize(deserializer)?;
        Grid::new(axes.xs, axes.ys).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_step_reference_lattice() {
        let grid = Grid::with_step((1.0, 50.0), (1.0, 50.0), 1.0).unwrap();
        assert_eq!(grid.shape(), (50, 50));
        assert_eq!(grid.xs()[0], 1.0);
        assert_eq!(grid.xs()[49], 50.0);
        assert_eq!(grid.coord(2, 7), (8.0, 3.0));
        assert_eq!(grid.len(), 2500);
    }

    #[test]
    fn test_uneven_axes_accepted() {
        let grid = Grid::new(vec![0.0, 0.5, 3.0], vec![-1.0, 10.0]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.bounds(), (0.0, -1.0, 3.0, 10.0));
    }

    #[test]
    fn test_non_increasing_axis_rejected() {
        let err = Grid::new(vec![0.0, 1.0, 1.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = Grid::new(vec![0.0], vec![2.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        assert!(Grid::new(vec![], vec![0.0]).is_err());
        assert!(Grid::new(vec![f64::NAN], vec![0.0]).is_err());
    }

    #[test]
    fn test_bad_step_rejected() {
        assert!(Grid::with_step((0.0, 1.0), (0.0, 1.0), 0.0).is_err());
        assert!(Grid::with_step((1.0, 0.0), (0.0, 1.0), 0.1).is_err());
    }

    #[test]
    fn test_tiny_step_rejected() {
        for step in [1e-300, 1e-9, f64::MIN_POSITIVE] {
            let err = Grid::with_step((0.0, 1.0), (0.0, 1.0), step).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "step {}: {:?}", step, err);
        }
        let err = Grid::with_step((1.0, 50.0), (1.0, 50.0), 1e-9).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_node_limits() {
        // Within the per-axis limit but too many nodes overall
        let err = Grid::with_step((0.0, 9_999.0), (0.0, 9_999.0), 1.0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let grid = Grid::with_step((0.0, 99_998.0), (0.0, 0.0), 1.0).unwrap();
        assert_eq!(grid.shape(), (1, MAX_AXIS_LEN - 1));
    }

    #[test]
    fn test_nearest_cell() {
        let grid = Grid::new(vec![0.0, 1.0, 2.0, 4.0], vec![10.0, 20.0]).unwrap();
        assert_eq!(grid.nearest_cell(2.9, 14.0), (0, 2));
        assert_eq!(grid.nearest_cell(3.1, 16.0), (1, 3));
        assert_eq!(grid.nearest_cell(-5.0, 100.0), (1, 0));
        // Equidistant goes to the lower index
        assert_eq!(grid.nearest_cell(0.5, 15.0), (0, 0));
    }

    #[test]
    fn test_single_point_grid() {
        let grid = Grid::point(3.0, 4.0).unwrap();
        assert_eq!(grid.shape(), (1, 1));
        assert_eq!(grid.coord(0, 0), (3.0, 4.0));
    }
}
