//! Error types for the pivot-point library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Out-of-range parameter, unknown alternative, malformed table.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Business-level input the calculators refuse to run on
    /// (more conversions than visitors, non-positive revenue, ...).
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, PivotError>;

/// Check that a probability-like parameter lies strictly inside (0, 1).
pub(crate) fn check_open_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(PivotError::InvalidArgument(format!(
            "{} must be in (0, 1), got {}",
            name, value
        )))
    }
}
