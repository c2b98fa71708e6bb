//! Error types for phreatic

use thiserror::Error;

/// Main error type for phreatic operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Sample set is empty, contains non-finite values, or is too small
    /// for the requested method.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error(
        "Underdetermined system: {samples} samples cannot determine {coefficients} coefficients"
    )]
    UnderdeterminedSystem { samples: usize, coefficients: usize },

    /// Collinear samples, coincident samples without nugget, or any other
    /// non-invertible system.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Invalid model parameter: {name} = {value} ({reason})")]
    InvalidModelParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    /// Grid axes, polynomial degree or binning configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Index out of bounds: ({row}, {col}) in surface of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Surface size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch {
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },
}

/// Result type alias for phreatic operations
pub type Result<T> = std::result::Result<T, Error>;
