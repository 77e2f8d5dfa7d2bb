//! Decision thresholds and advisory flags.
//!
//! Advisories never stop a calculation. They are the warnings a front end
//! shows next to a result: parameters outside the usual range, an MDE too
//! large to be useful, or a data-quality problem (SRM, interaction) that
//! should be investigated before trusting the test outcome.

use crate::data::{ProportionSample, TestResult};
use crate::power::{ProjectionTable, DEFAULT_WEEKS};
use serde::{Deserialize, Serialize};

/// SRM is flagged below this p-value (not 0.05).
pub const SRM_THRESHOLD: f64 = 0.10;

/// Traffic interaction is flagged below this p-value.
pub const INTERACTION_THRESHOLD: f64 = 0.10;

/// Power below this is considered low.
pub const MIN_RECOMMENDED_POWER: f64 = 0.80;

/// Significance levels above this are considered high.
pub const MAX_RECOMMENDED_ALPHA: f64 = 0.10;

/// Relative MDE (percent) after six projected weeks above which the
/// experiment's contrast is questionable.
pub const MAX_PROJECTED_MDE: f64 = 5.0;

/// Advisory raised alongside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Planned or achieved power below the minimum.
    LowPower { power: f64 },
    /// Significance level above the maximum.
    HighAlpha { alpha: f64 },
    /// Relative MDE after the full projected runtime still too large.
    HighMde { weeks: usize, mde_pct: f64 },
    /// Every visitor converted; nothing left to optimize.
    SaturatedConversion,
    /// Observed split deviates from the intended one.
    SampleRatioMismatch { p_value: f64, threshold: f64 },
    /// Groups of two experiments are not independent.
    TrafficInteraction { p_value: f64, threshold: f64 },
}

impl Advisory {
    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::LowPower { power } => {
                format!("This statistical power ({:.2}) is considered low!", power)
            }
            Self::HighAlpha { alpha } => format!(
                "This statistical significance level ({:.2}) is considered high!",
                alpha
            ),
            Self::HighMde { weeks, mde_pct } => format!(
                "Your MDE after {} weeks is quite high ({:.2} %). Consider if the contrast of your A/B test is high enough.",
                weeks, mde_pct
            ),
            Self::SaturatedConversion => {
                "You have a conversion rate of 100 %, there seems to be nothing left to optimize."
                    .to_string()
            }
            Self::SampleRatioMismatch { p_value, threshold } => format!(
                "The p-value is smaller than {} ({:.3}). A possible SRM is detected. Please check your data collection process before analysing the test results.",
                threshold, p_value
            ),
            Self::TrafficInteraction { p_value, threshold } => format!(
                "The p-value is smaller than {} ({:.3}). A possible traffic interaction between your experiments was detected.",
                threshold, p_value
            ),
        }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Decision thresholds used when flagging results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// SRM flagged when p < this.
    pub srm: f64,
    /// Traffic interaction flagged when p < this.
    pub interaction: f64,
    pub min_power: f64,
    pub max_alpha: f64,
    /// Relative MDE in percent at the last projected week.
    pub max_projected_mde: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            srm: SRM_THRESHOLD,
            interaction: INTERACTION_THRESHOLD,
            min_power: MIN_RECOMMENDED_POWER,
            max_alpha: MAX_RECOMMENDED_ALPHA,
            max_projected_mde: MAX_PROJECTED_MDE,
        }
    }
}

impl Thresholds {
    pub fn check_power(&self, power: f64) -> Option<Advisory> {
        (power < self.min_power).then_some(Advisory::LowPower { power })
    }

    pub fn check_alpha(&self, alpha: f64) -> Option<Advisory> {
        (alpha > self.max_alpha).then_some(Advisory::HighAlpha { alpha })
    }

    /// Advisories for the planning parameters alpha and power.
    pub fn check_parameters(&self, alpha: f64, power: f64) -> Vec<Advisory> {
        [self.check_power(power), self.check_alpha(alpha)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Flag a projection whose relative MDE after [`DEFAULT_WEEKS`] weeks is
    /// still too large. Shorter projections are judged on their last week.
    pub fn check_projection(&self, table: &ProjectionTable) -> Option<Advisory> {
        let row = table
            .rows
            .iter()
            .find(|row| row.week == DEFAULT_WEEKS)
            .or_else(|| table.rows.last())?;
        (row.mde_relative_pct >= self.max_projected_mde).then_some(Advisory::HighMde {
            weeks: row.week,
            mde_pct: row.mde_relative_pct,
        })
    }

    /// Flag an SRM test result.
    pub fn check_srm(&self, result: &TestResult) -> Option<Advisory> {
        result
            .is_significant_at(self.srm)
            .then_some(Advisory::SampleRatioMismatch {
                p_value: result.p_value,
                threshold: self.srm,
            })
    }

    /// Flag an interaction test result.
    pub fn check_interaction(&self, result: &TestResult) -> Option<Advisory> {
        result
            .is_significant_at(self.interaction)
            .then_some(Advisory::TrafficInteraction {
                p_value: result.p_value,
                threshold: self.interaction,
            })
    }
}

pub fn check_saturation(sample: &ProportionSample) -> Option<Advisory> {
    sample.is_saturated().then_some(Advisory::SaturatedConversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ContingencyTable, PowerParameters};
    use crate::power::project_runtime;
    use crate::test::{interaction_test, srm_test};

    #[test]
    fn test_parameter_advisories() {
        assert!(Thresholds::default().check_parameters(0.05, 0.8).is_empty());
        assert_eq!(
            Thresholds::default().check_parameters(0.2, 0.7),
            vec![
                Advisory::LowPower { power: 0.7 },
                Advisory::HighAlpha { alpha: 0.2 }
            ]
        );
        assert!(Thresholds::default().check_alpha(0.10).is_none());
    }

    #[test]
    fn test_srm_flag() {
        let t = Thresholds::default();
        let balanced = srm_test(&[500, 500], None).unwrap();
        assert!(t.check_srm(&balanced).is_none());

        let skewed = srm_test(&[100, 300], None).unwrap();
        assert!(matches!(
            t.check_srm(&skewed),
            Some(Advisory::SampleRatioMismatch { .. })
        ));
    }

    #[test]
    fn test_srm_threshold_is_ten_percent() {
        let t = Thresholds::default();
        // chi2 = 2 * 28^2 / 500 = 3.136, p ~ 0.077
        let r = srm_test(&[472, 528], None).unwrap();
        assert!(r.p_value > 0.05 && r.p_value < 0.10, "p = {}", r.p_value);
        assert!(t.check_srm(&r).is_some());

        let strict = Thresholds {
            srm: 0.05,
            ..Default::default()
        };
        assert!(strict.check_srm(&r).is_none());
    }

    #[test]
    fn test_interaction_flag() {
        let t = Thresholds::default();
        let r = interaction_test(&ContingencyTable::two_by_two(900, 100, 100, 900)).unwrap();
        assert!(t.check_interaction(&r).is_some());
    }

    #[test]
    fn test_projection_flag() {
        let t = Thresholds::default();
        let params = PowerParameters::default();
        let low_traffic = project_runtime(1_000, 20, 2, &params, 6).unwrap();
        assert!(matches!(
            t.check_projection(&low_traffic),
            Some(Advisory::HighMde { weeks: 6, .. })
        ));

        let high_traffic = project_runtime(2_000_000, 100_000, 2, &params, 6).unwrap();
        assert!(t.check_projection(&high_traffic).is_none());
    }

    #[test]
    fn test_projection_judged_at_week_six() {
        // 5.5% relative MDE at week 6, 4.3% at week 10.
        let t = Thresholds::default();
        let params = PowerParameters::default();
        let long = project_runtime(33_000, 1_650, 2, &params, 10).unwrap();
        assert!(long.final_mde_pct().unwrap() < t.max_projected_mde);
        assert!(matches!(
            t.check_projection(&long),
            Some(Advisory::HighMde { weeks: 6, .. })
        ));

        let short = project_runtime(33_000, 1_650, 2, &params, 4).unwrap();
        assert!(matches!(
            t.check_projection(&short),
            Some(Advisory::HighMde { weeks: 4, .. })
        ));
    }

    #[test]
    fn test_saturation() {
        let s = ProportionSample::new(50, 50).unwrap();
        assert_eq!(check_saturation(&s), Some(Advisory::SaturatedConversion));
    }

    #[test]
    fn test_message_mentions_threshold() {
        let msg = Advisory::SampleRatioMismatch {
            p_value: 0.01,
            threshold: SRM_THRESHOLD,
        }
        .message();
        assert!(msg.contains("0.1"));
        assert!(msg.contains("0.010"));
    }
}
