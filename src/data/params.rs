//! Hypothesis direction and power-analysis parameters.

use crate::error::{check_open_unit, PivotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alternative hypothesis, always stated as variant relative to control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// H1: variant ≠ control.
    #[default]
    TwoSided,
    /// H1: variant > control.
    Larger,
    /// H1: variant < control.
    Smaller,
}

impl Alternative {
    /// Check if this is the two-sided alternative.
    pub fn is_two_sided(&self) -> bool {
        matches!(self, Self::TwoSided)
    }

    /// One-sided alternative pointing in the direction of an observed
    /// difference (variant minus control).
    ///
    /// A zero difference has no direction and falls back to two-sided.
    pub fn toward_observed(diff: f64) -> Self {
        if diff > 0.0 {
            Self::Larger
        } else if diff < 0.0 {
            Self::Smaller
        } else {
            Self::TwoSided
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TwoSided => "two-sided",
            Self::Larger => "larger",
            Self::Smaller => "smaller",
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alternative {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two-sided" | "two_sided" => Ok(Self::TwoSided),
            // "one-sided" without a direction means an increase
            "larger" | "one-sided" | "one_sided" => Ok(Self::Larger),
            "smaller" => Ok(Self::Smaller),
            other => Err(PivotError::InvalidArgument(format!(
                "Unknown alternative '{}'. Expected one of: two-sided, one-sided, larger, smaller",
                other
            ))),
        }
    }
}

/// Significance level, target power and direction of a planned test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerParameters {
    /// Type I error rate.
    pub alpha: f64,
    /// Probability of detecting a true effect (1 - β).
    pub power: f64,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

impl Default for PowerParameters {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            power: 0.80,
            alternative: Alternative::TwoSided,
        }
    }
}

impl PowerParameters {
    /// Create validated parameters.
    pub fn new(alpha: f64, power: f64, alternative: Alternative) -> Result<Self> {
        let params = Self {
            alpha,
            power,
            alternative,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check alpha and power are both inside (0, 1).
    pub fn validate(&self) -> Result<()> {
        check_open_unit("alpha", self.alpha)?;
        check_open_unit("power", self.power)
    }

    /// Same parameters with alpha divided across `comparisons` tests.
    pub fn bonferroni(&self, comparisons: usize) -> Self {
        Self {
            alpha: crate::correct::bonferroni::corrected_alpha(self.alpha, comparisons),
            ..*self
        }
    }
}
