//! Cell-by-cell evaluation of an estimator over a grid.
//!
//! With the `parallel` feature, rows are distributed over the rayon pool;
//! without it (e.g. WASM builds) the same code runs sequentially. Results are
//! placed by grid index, so scheduling order never affects the output.

use crate::maybe_rayon::*;
use phreatic_core::{Grid, Result};

/// Evaluate `f(x, y)` at every cell of `grid`, returning the results in
/// row-major order. The first error encountered aborts the run.
pub(crate) fn evaluate_grid<T, F>(grid: &Grid, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(f64, f64) -> Result<T> + Sync,
{
    let eval_row = |row: usize| -> Result<Vec<T>> {
        let y = grid.ys()[row];
        grid.xs().iter().map(|&x| f(x, y)).collect()
    };

    let rows: Result<Vec<Vec<T>>> = (0..grid.rows()).into_par_iter().map(eval_row).collect();

    Ok(rows?.into_iter().flatten().collect())
}
