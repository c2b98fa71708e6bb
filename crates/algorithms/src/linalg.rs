//! Dense linear algebra for the small systems built by the estimators
//!
//! - [`LuFactorization`]: Gaussian elimination with partial pivoting, kept
//!   so that one factorization can serve many right-hand sides (kriging
//!   solves the same system for every grid point).
//! - [`least_squares`]: Householder QR solve of an overdetermined system
//!   (polynomial trend surfaces).

use ndarray::Array2;
use phreatic_core::{Error, Result};

/// Pivots smaller than this fraction of the largest matrix entry are
/// treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// A diagonal of R smaller than this fraction of its original column norm
/// marks a rank-deficient design matrix.
const RANK_TOLERANCE: f64 = 1e-10;

/// LU factorization `P·A = L·U` of a square matrix.
///
/// L (unit lower, multipliers below the diagonal) and U share one array.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    lu: Array2<f64>,
    /// `perm[i]` is the original row placed at position `i`
    perm: Vec<usize>,
}

impl LuFactorization {
    /// Factorize `mat`.
    ///
    /// # Errors
    /// [`Error::SingularMatrix`] if the matrix is not square or a pivot
    /// vanishes relative to the matrix scale.
    pub fn new(mut mat: Array2<f64>) -> Result<Self> {
        let (n, m) = mat.dim();
        if n != m {
            return Err(Error::SingularMatrix(format!(
                "cannot factorize a non-square {}x{} matrix",
                n, m
            )));
        }

        let scale = mat.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if n == 0 || scale == 0.0 || !scale.is_finite() {
            return Err(Error::SingularMatrix(
                "matrix is empty, all zero or non-finite".into(),
            ));
        }
        let threshold = PIVOT_TOLERANCE * scale;
        let mut perm: Vec<usize> = (0..n).collect();

        for col in 0..n {
            let mut max_val = mat[[col, col]].abs();
            let mut max_row = col;
            for row in (col + 1)..n {
                let val = mat[[row, col]].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            if max_val <= threshold {
                return Err(Error::SingularMatrix(format!(
                    "pivot {:.3e} in column {} is below tolerance {:.3e}",
                    max_val, col, threshold
                )));
            }

            if max_row != col {
                for j in 0..n {
                    mat.swap([col, j], [max_row, j]);
                }
                perm.swap(col, max_row);
            }

            let pivot = mat[[col, col]];
            for row in (col + 1)..n {
                let factor = mat[[row, col]] / pivot;
                mat[[row, col]] = factor;
                for j in (col + 1)..n {
                    mat[[row, j]] -= factor * mat[[col, j]];
                }
            }
        }

        Ok(Self { lu: mat, perm })
    }

    /// Order of the factorized matrix
    pub fn dim(&self) -> usize {
        self.perm.len()
    }

    /// Solve `A·x = rhs`.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `rhs.len()` differs from [`dim`](Self::dim).
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = self.dim();
        check_rhs_len(rhs.len(), n)?;

        // Forward substitution with the row permutation applied
        let mut x: Vec<f64> = self.perm.iter().map(|&p| rhs[p]).collect();
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }

        // Back substitution
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }

        Ok(x)
    }
}

fn check_rhs_len(actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "right-hand side has {} entries, system has {} rows",
            actual, expected
        )))
    }
}

/// Minimize `‖A·x − b‖²` for a tall (`rows ≥ cols`) design matrix.
///
/// # Errors
/// - [`Error::UnderdeterminedSystem`] if `A` has fewer rows than columns
/// - [`Error::SingularMatrix`] if `A` is rank deficient
/// - [`Error::Configuration`] if `rhs` does not have one entry per row
pub fn least_squares(design: &Array2<f64>, rhs: &[f64]) -> Result<Vec<f64>> {
    let (m, n) = design.dim();
    if m < n {
        return Err(Error::UnderdeterminedSystem {
            samples: m,
            coefficients: n,
        });
    }
    check_rhs_len(rhs.len(), m)?;

    let mut a = design.to_owned();
    let mut b = rhs.to_vec();
    let col_norms: Vec<f64> = a
        .columns()
        .into_iter()
        .map(|c| c.dot(&c).sqrt())
        .collect();

    let mut v = vec![0.0_f64; m];
    for k in 0..n {
        let norm = (k..m).map(|i| a[[i, k]] * a[[i, k]]).sum::<f64>().sqrt();
        if norm <= RANK_TOLERANCE * col_norms[k] || col_norms[k] == 0.0 {
            return Err(Error::SingularMatrix(format!(
                "design matrix is rank deficient at column {}",
                k
            )));
        }

        let alpha = if a[[k, k]] > 0.0 { -norm } else { norm };
        for i in k..m {
            v[i] = a[[i, k]];
        }
        v[k] -= alpha;
        let v_norm_sq: f64 = (k..m).map(|i| v[i] * v[i]).sum();

        if v_norm_sq > 0.0 {
            for j in k..n {
                let dot: f64 = (k..m).map(|i| v[i] * a[[i, j]]).sum();
                let f = 2.0 * dot / v_norm_sq;
                for i in k..m {
                    a[[i, j]] -= f * v[i];
                }
            }
            let dot: f64 = (k..m).map(|i| v[i] * b[i]).sum();
            let f = 2.0 * dot / v_norm_sq;
            for i in k..m {
                b[i] -= f * v[i];
            }
        }
    }

    let mut x = vec![0.0_f64; n];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[[i, j]] * x[j];
        }
        x[i] = sum / a[[i, i]];
    }

    Ok(x)
}
