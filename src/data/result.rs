//! Result types for experiment analysis.

use crate::correct::bonferroni::{correct_bonferroni, BonferroniCorrected};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Which test produced a [`TestResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Pearson chi-square goodness-of-fit (SRM).
    ChiSquareGoodnessOfFit,
    /// Chi-square test of independence (interaction).
    ChiSquareIndependence,
    /// Pooled two-proportion z-test.
    ProportionsZ,
    /// Welch's unequal-variance t-test.
    WelchT,
    /// Student's pooled-variance t-test.
    StudentT,
}

impl TestKind {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChiSquareGoodnessOfFit => "chi_square_gof",
            Self::ChiSquareIndependence => "chi_square_independence",
            Self::ProportionsZ => "proportions_z",
            Self::WelchT => "welch_t",
            Self::StudentT => "student_t",
        }
    }
}

/// Outcome of a single hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test that was run.
    pub test: TestKind,
    /// Test statistic (χ², z or t).
    pub statistic: f64,
    /// P-value in [0, 1].
    pub p_value: f64,
    /// Degrees of freedom; `None` for z-tests, fractional for Welch.
    pub degrees_of_freedom: Option<f64>,
}

impl TestResult {
    pub(crate) fn new(
        test: TestKind,
        statistic: f64,
        p_value: f64,
        degrees_of_freedom: Option<f64>,
    ) -> Self {
        Self {
            test,
            statistic,
            p_value: p_value.clamp(0.0, 1.0),
            degrees_of_freedom,
        }
    }

    /// Check if the p-value falls strictly below a threshold.
    pub fn is_significant_at(&self, threshold: f64) -> bool {
        self.p_value < threshold
    }
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: statistic = {:.4}, p-value = {:.4}",
            self.test.name(),
            self.statistic,
            self.p_value
        )?;
        if let Some(df) = self.degrees_of_freedom {
            write!(f, ", df = {:.2}", df)?;
        }
        Ok(())
    }
}

/// One variant judged against control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Variant label (e.g. "B").
    pub label: String,
    /// Control point estimate (conversion rate or revenue per visitor).
    pub control_value: f64,
    /// Variant point estimate.
    pub variant_value: f64,
    /// Variant minus control.
    pub difference: f64,
    /// Relative lift in percent; NaN when the control value is zero.
    pub lift: f64,
    /// Test outcome.
    pub result: TestResult,
    /// Bonferroni-adjusted p-value, min(p * k, 1) over k comparisons.
    pub adjusted_p_value: f64,
    /// Significance threshold this comparison was judged against.
    pub threshold: f64,
    /// Whether `p_value < threshold`.
    pub significant: bool,
}

impl Comparison {
    /// Create a comparison; difference, lift and decision are derived here.
    pub fn new(
        label: String,
        control_value: f64,
        variant_value: f64,
        result: TestResult,
        threshold: f64,
    ) -> Self {
        let difference = variant_value - control_value;
        let lift = if control_value != 0.0 {
            difference / control_value * 100.0
        } else {
            f64::NAN
        };
        Self {
            label,
            control_value,
            variant_value,
            difference,
            lift,
            significant: result.is_significant_at(threshold),
            adjusted_p_value: result.p_value,
            result,
            threshold,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.significant {
            "statistically significant"
        } else {
            "not statistically significant"
        };
        write!(
            f,
            "{}: control = {:.4}, variant = {:.4}, lift = {:.2}%, p = {:.4} (threshold {:.4}) -> {}",
            self.label,
            self.control_value,
            self.variant_value,
            self.lift,
            self.result.p_value,
            self.threshold,
            verdict
        )
    }
}

/// Results of comparing one control against k variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiVariantResult {
    /// Family-wise significance level requested.
    pub alpha: f64,
    /// Per-comparison threshold after Bonferroni correction (alpha / k).
    pub corrected_alpha: f64,
    /// Comparisons in variant order.
    pub comparisons: Vec<Comparison>,
}

impl MultiVariantResult {
    /// Number of comparisons.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Test results in variant order.
    pub fn results(&self) -> Vec<TestResult> {
        self.comparisons.iter().map(|c| c.result).collect()
    }

    /// Bonferroni adjustment of the p-values, labelled by variant.
    pub fn bonferroni(&self) -> BonferroniCorrected {
        let p_values: Vec<f64> = self.results().iter().map(|r| r.p_value).collect();
        let labels: Vec<String> = self.comparisons.iter().map(|c| c.label.clone()).collect();
        correct_bonferroni(&p_values, &labels)
    }

    /// Comparisons that beat the corrected threshold.
    pub fn significant(&self) -> Vec<&Comparison> {
        self.comparisons.iter().filter(|c| c.significant).collect()
    }

    /// Get comparison for a specific variant label.
    pub fn get_variant(&self, label: &str) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.label == label)
    }

    /// Write comparisons to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "variant\ttest\tcontrol\tvariant_value\tdifference\tlift_pct\tstatistic\tp_value\tadjusted_p_value\tthreshold\tsignificant"
        )?;

        for c in &self.comparisons {
            writeln!(
                writer,
                "{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.4}\t{:.4}\t{:.2e}\t{:.2e}\t{:.4}\t{}",
                c.label,
                c.result.test.name(),
                c.control_value,
                c.variant_value,
                c.difference,
                c.lift,
                c.result.statistic,
                c.result.p_value,
                c.adjusted_p_value,
                c.threshold,
                c.significant
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for MultiVariantResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} comparison(s) against control, alpha = {} (per comparison {:.4})",
            self.len(),
            self.alpha,
            self.corrected_alpha
        )?;
        for c in &self.comparisons {
            writeln!(f, "  {}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn z_result(p: f64) -> TestResult {
        TestResult::new(TestKind::ProportionsZ, 2.0, p, None)
    }

    #[test]
    fn test_comparison_lift() {
        let c = Comparison::new("B".to_string(), 0.10, 0.12, z_result(0.01), 0.05);
        assert_relative_eq!(c.difference, 0.02, epsilon = 1e-12);
        assert_relative_eq!(c.lift, 20.0, epsilon = 1e-9);
        assert!(c.significant);
    }

    #[test]
    fn test_comparison_zero_control() {
        let c = Comparison::new("B".to_string(), 0.0, 0.5, z_result(0.5), 0.05);
        assert!(c.lift.is_nan());
        assert!(!c.significant);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!z_result(0.05).is_significant_at(0.05));
        assert!(z_result(0.0499).is_significant_at(0.05));
    }

    #[test]
    fn test_p_value_clamped() {
        let r = TestResult::new(TestKind::ProportionsZ, 0.0, 1.0 + 1e-15, None);
        assert!(r.p_value <= 1.0);
    }

    #[test]
    fn test_to_tsv() {
        let result = MultiVariantResult {
            alpha: 0.05,
            corrected_alpha: 0.025,
            comparisons: vec![
                Comparison::new("B".to_string(), 0.10, 0.15, z_result(0.001), 0.025),
                Comparison::new("C".to_string(), 0.10, 0.10, z_result(0.9), 0.025),
            ],
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        result.to_tsv(file.path()).unwrap();
        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("variant\ttest"));
        assert!(lines[1].starts_with("B\tproportions_z"));
        assert!(lines[0].contains("\tp_value\tadjusted_p_value\t"));
        assert_eq!(lines[1].split('\t').count(), 11);
        assert!(lines[1].ends_with("true"));
        assert!(lines[2].ends_with("false"));
        assert_eq!(result.significant().len(), 1);
        assert!(result.get_variant("C").is_some());
    }

    #[test]
    fn test_results_in_variant_order() {
        let result = MultiVariantResult {
            alpha: 0.05,
            corrected_alpha: 0.05 / 3.0,
            comparisons: vec![
                Comparison::new("B".to_string(), 0.10, 0.12, z_result(0.2), 0.05 / 3.0),
                Comparison::new("C".to_string(), 0.10, 0.15, z_result(0.001), 0.05 / 3.0),
                Comparison::new("D".to_string(), 0.10, 0.11, z_result(0.5), 0.05 / 3.0),
            ],
        };
        let p: Vec<f64> = result.results().iter().map(|r| r.p_value).collect();
        assert_eq!(p, vec![0.2, 0.001, 0.5]);

        let corrected = result.bonferroni();
        assert_eq!(corrected.labels, vec!["B", "C", "D"]);
        assert_relative_eq!(corrected.adjusted[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(corrected.get_adjusted("C").unwrap(), 0.003, epsilon = 1e-12);
        assert_relative_eq!(corrected.adjusted[2], 1.0);
        assert_eq!(corrected.n_significant(result.alpha), 1);
    }
}
