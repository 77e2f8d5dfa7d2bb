//! Reference distributions shared by the engines.

use crate::error::{PivotError, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| PivotError::Numerical(format!("normal distribution: {}", e)))
}

pub(crate) fn chi_squared(df: f64) -> Result<ChiSquared> {
    ChiSquared::new(df)
        .map_err(|e| PivotError::Numerical(format!("chi-square distribution (df = {}): {}", df, e)))
}

pub(crate) fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| PivotError::Numerical(format!("t distribution (df = {}): {}", df, e)))
}

/// Upper-tail probability of the chi-square distribution.
pub(crate) fn chi_squared_sf(statistic: f64, df: f64) -> Result<f64> {
    Ok(chi_squared(df)?.sf(statistic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_quantiles() {
        let n = standard_normal().unwrap();
        assert_relative_eq!(n.inverse_cdf(0.975), 1.959963984540054, epsilon = 1e-9);
        assert_relative_eq!(n.inverse_cdf(0.8), 0.8416212335729143, epsilon = 1e-9);
    }

    #[test]
    fn test_chi_squared_sf() {
        // 3.841 is the 95% quantile of chi-square(1)
        assert_relative_eq!(chi_squared_sf(3.841458820694124, 1.0).unwrap(), 0.05, epsilon = 1e-8);
        assert_relative_eq!(chi_squared_sf(0.0, 1.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_df() {
        assert!(chi_squared(0.0).is_err());
        assert!(students_t(-1.0).is_err());
    }
}
