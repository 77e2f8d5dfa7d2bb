//! Analysis configuration.
//!
//! Defaults for the calculators, loadable from YAML so a team can pin its
//! significance level, power and decision thresholds in one file.

use crate::advisory::Thresholds;
use crate::data::{Alternative, PowerParameters};
use crate::error::{check_open_unit, PivotError, Result};
use crate::power::DEFAULT_WEEKS;
use crate::test::{VarianceModel, YatesCorrection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an analysis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Family-wise significance level.
    pub alpha: f64,
    /// Target statistical power.
    pub power: f64,
    /// Alternative hypothesis.
    pub alternative: Alternative,
    /// Variance model for revenue t-tests.
    pub variance_model: VarianceModel,
    /// Continuity correction for 2x2 interaction tables.
    pub yates: YatesCorrection,
    /// Weeks covered by the runtime projection.
    pub weeks: usize,
    pub thresholds: Thresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            power: 0.80,
            alternative: Alternative::TwoSided,
            variance_model: VarianceModel::Welch,
            yates: YatesCorrection::SingleDof,
            weeks: DEFAULT_WEEKS,
            thresholds: Thresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(PivotError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        check_open_unit("alpha", self.alpha)?;
        check_open_unit("power", self.power)?;
        if self.weeks == 0 {
            return Err(PivotError::InvalidArgument(
                "weeks must be at least 1".to_string(),
            ));
        }
        let t = &self.thresholds;
        check_open_unit("thresholds.srm", t.srm)?;
        check_open_unit("thresholds.interaction", t.interaction)?;
        check_open_unit("thresholds.min_power", t.min_power)?;
        check_open_unit("thresholds.max_alpha", t.max_alpha)?;
        if !(t.max_projected_mde.is_finite() && t.max_projected_mde > 0.0) {
            return Err(PivotError::InvalidArgument(format!(
                "thresholds.max_projected_mde must be positive, got {}",
                t.max_projected_mde
            )));
        }
        Ok(())
    }

    /// Power parameters carried by this configuration.
    pub fn power_parameters(&self) -> PowerParameters {
        PowerParameters {
            alpha: self.alpha,
            power: self.power,
            alternative: self.alternative,
        }
    }
}
