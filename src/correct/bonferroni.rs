//! Bonferroni family-wise error rate correction.

use serde::{Deserialize, Serialize};

/// Result of Bonferroni correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonferroniCorrected {
    /// Comparison labels in original order.
    pub labels: Vec<String>,
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values: min(p * n, 1).
    pub adjusted: Vec<f64>,
    /// Number of tests.
    pub n_tests: usize,
}

impl BonferroniCorrected {
    /// Get adjusted p-value for a specific comparison.
    pub fn get_adjusted(&self, label: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.adjusted.get(idx).copied()
    }

    /// Count comparisons significant at a family-wise threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.adjusted.iter().filter(|&&p| p < alpha).count()
    }
}

/// Per-comparison threshold when `comparisons` tests share a family-wise `alpha`.
///
/// Zero or one comparison leaves alpha unchanged.
pub fn corrected_alpha(alpha: f64, comparisons: usize) -> f64 {
    if comparisons <= 1 {
        alpha
    } else {
        alpha / comparisons as f64
    }
}

/// Apply Bonferroni correction to a set of p-values.
///
/// Comparing `p * n` against alpha is equivalent to comparing `p` against
/// `alpha / n`.
pub fn correct_bonferroni(p_values: &[f64], labels: &[String]) -> BonferroniCorrected {
    let n = p_values.len();
    let adjusted = p_values
        .iter()
        .map(|&p| (p * n as f64).min(1.0))
        .collect();

    BonferroniCorrected {
        labels: labels.to_vec(),
        p_values: p_values.to_vec(),
        adjusted,
        n_tests: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corrected_alpha() {
        assert_relative_eq!(corrected_alpha(0.05, 1), 0.05);
        assert_relative_eq!(corrected_alpha(0.05, 2), 0.025);
        assert_relative_eq!(corrected_alpha(0.05, 5), 0.01, epsilon = 1e-12);
        assert_relative_eq!(corrected_alpha(0.05, 0), 0.05);
    }

    #[test]
    fn test_bonferroni_adjusted() {
        let labels: Vec<String> = ["B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let corrected = correct_bonferroni(&[0.01, 0.02, 0.5], &labels);

        assert_eq!(corrected.n_tests, 3);
        assert_relative_eq!(corrected.adjusted[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(corrected.adjusted[1], 0.06, epsilon = 1e-12);
        assert_relative_eq!(corrected.adjusted[2], 1.0);
        assert_eq!(corrected.n_significant(0.05), 1);
        assert_relative_eq!(corrected.get_adjusted("C").unwrap(), 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_bonferroni_empty() {
        let corrected = correct_bonferroni(&[], &[]);
        assert_eq!(corrected.n_tests, 0);
        assert!(corrected.adjusted.is_empty());
    }
}
