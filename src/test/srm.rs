//! Sample ratio mismatch detection.
//!
//! Compares the observed number of visitors per group against the intended
//! traffic split with Pearson's chi-square goodness-of-fit test. A small
//! p-value means the assignment mechanism did not deliver the split it was
//! configured for, and the experiment's results should not be trusted until
//! the cause is found.

use crate::data::{TestKind, TestResult};
use crate::distributions::chi_squared_sf;
use crate::error::{PivotError, Result};

/// Allowed deviation of the expected frequencies' sum from 1.0.
///
/// Only absorbs floating-point representation error (e.g. `0.1 + 0.2 + 0.7`);
/// any real deviation is rejected.
pub const FREQUENCY_SUM_TOLERANCE: f64 = 1e-9;

/// Chi-square goodness-of-fit test of observed group sizes.
///
/// # Arguments
/// * `observed_counts` - Visitors per group (at least 2 groups)
/// * `expected_frequencies` - Intended share of each group, summing to 1.0;
///   `None` assumes an equal split
///
/// # Returns
/// TestResult with the χ² statistic, p-value and `groups - 1` degrees of freedom.
pub fn srm_test(
    observed_counts: &[u64],
    expected_frequencies: Option<&[f64]>,
) -> Result<TestResult> {
    let k = observed_counts.len();
    if k < 2 {
        return Err(PivotError::InvalidArgument(format!(
            "SRM test needs at least 2 groups, got {}",
            k
        )));
    }

    let total: u64 = observed_counts.iter().sum();
    if total == 0 {
        return Err(PivotError::InvalidArgument(
            "SRM test needs at least one observed visitor".to_string(),
        ));
    }
    let total = total as f64;

    let expected: Vec<f64> = match expected_frequencies {
        None => vec![total / k as f64; k],
        Some(freqs) => {
            validate_frequencies(freqs, k)?;
            freqs.iter().map(|f| f * total).collect()
        }
    };

    let statistic: f64 = observed_counts
        .iter()
        .zip(&expected)
        .map(|(&o, &e)| (o as f64 - e).powi(2) / e)
        .sum();
    let df = (k - 1) as f64;
    let p_value = chi_squared_sf(statistic, df)?;

    Ok(TestResult::new(
        TestKind::ChiSquareGoodnessOfFit,
        statistic,
        p_value,
        Some(df),
    ))
}

fn validate_frequencies(freqs: &[f64], k: usize) -> Result<()> {
    if freqs.len() != k {
        return Err(PivotError::InvalidArgument(format!(
            "Got {} expected frequencies for {} groups",
            freqs.len(),
            k
        )));
    }
    if let Some(f) = freqs.iter().find(|f| !f.is_finite() || **f <= 0.0) {
        return Err(PivotError::InvalidArgument(format!(
            "Expected frequencies must be positive, got {}",
            f
        )));
    }
    let sum: f64 = freqs.iter().sum();
    if (sum - 1.0).abs() > FREQUENCY_SUM_TOLERANCE {
        return Err(PivotError::InvalidArgument(format!(
            "Expected frequencies should sum up to 1.00, got {}",
            sum
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::SRM_THRESHOLD;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_counts_no_mismatch() {
        for n in [1u64, 500, 12_345, 1_000_000] {
            let r = srm_test(&[n, n], None).unwrap();
            assert_relative_eq!(r.statistic, 0.0);
            assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-12);
            assert!(!r.is_significant_at(SRM_THRESHOLD));
        }
    }

    #[test]
    fn test_clear_imbalance_detected() {
        let r = srm_test(&[100, 300], Some(&[0.5, 0.5])).unwrap();
        // expected 200 each: (100^2 + 100^2) / 200 = 100
        assert_relative_eq!(r.statistic, 100.0, epsilon = 1e-9);
        assert_eq!(r.degrees_of_freedom, Some(1.0));
        assert!(r.p_value < SRM_THRESHOLD);
    }

    #[test]
    fn test_uniform_default_matches_explicit() {
        let a = srm_test(&[480, 520, 505], None).unwrap();
        let third = 1.0 / 3.0;
        let b = srm_test(&[480, 520, 505], Some(&[third, third, third])).unwrap();
        assert_relative_eq!(a.statistic, b.statistic, epsilon = 1e-9);
        assert_eq!(a.degrees_of_freedom, Some(2.0));
    }

    #[test]
    fn test_unequal_split() {
        // 90/10 split observed as intended
        let r = srm_test(&[9_000, 1_000], Some(&[0.9, 0.1])).unwrap();
        assert!(r.statistic < 1e-9);
        assert!(r.p_value > SRM_THRESHOLD);
    }

    #[test]
    fn test_known_p_value() {
        // chi2 = (10^2 + 10^2) / 50 = 4, df = 1 -> p = 0.0455
        let r = srm_test(&[40, 60], None).unwrap();
        assert_relative_eq!(r.statistic, 4.0, epsilon = 1e-12);
        assert_relative_eq!(r.p_value, 0.04550026389635842, epsilon = 1e-8);
    }

    #[test]
    fn test_frequencies_must_sum_to_one() {
        let err = srm_test(&[100, 100], Some(&[0.5, 0.4])).unwrap_err();
        assert!(matches!(err, PivotError::InvalidArgument(_)));
    }

    #[test]
    fn test_frequency_rounding_tolerated() {
        assert!(srm_test(&[100, 200, 700], Some(&[0.1, 0.2, 0.7])).is_ok());
    }

    #[test]
    fn test_frequency_length_mismatch() {
        assert!(srm_test(&[100, 100, 100], Some(&[0.5, 0.5])).is_err());
    }

    #[test]
    fn test_zero_frequency_rejected() {
        assert!(srm_test(&[100, 0], Some(&[1.0, 0.0])).is_err());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(srm_test(&[100], None).is_err());
        assert!(srm_test(&[0, 0], None).is_err());
    }
}
