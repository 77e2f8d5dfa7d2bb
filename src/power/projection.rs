//! MDE over experiment runtime.
//!
//! Given average weekly traffic, projects how the minimum detectable effect
//! shrinks as the experiment runs longer. Traffic is split evenly across all
//! experiment groups, and with more than one variant the significance level
//! is Bonferroni-corrected by the number of variant-vs-control comparisons.

use crate::correct::bonferroni::corrected_alpha;
use crate::data::{Alternative, PowerParameters};
use crate::error::{PivotError, Result};
use crate::power::mde::{mde_continuous, mde_proportion};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default number of weeks projected.
pub const DEFAULT_WEEKS: usize = 6;

/// MDE reachable after a given number of weeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// Runtime in weeks.
    pub week: usize,
    /// Visitors per experiment group after `week` weeks.
    pub sample_size_per_variant: u64,
    /// MDE relative to the baseline rate, in percent.
    pub mde_relative_pct: f64,
    /// MDE as an absolute change, in percentage points.
    pub mde_pp: f64,
    /// Conversion rate the variant would need to show, in percent.
    pub potential_rate_pct: f64,
}

/// MDE of a continuous metric after a given number of weeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousProjectionRow {
    pub week: usize,
    pub sample_size_per_variant: u64,
    /// Absolute MDE in the metric's own unit.
    pub mde: f64,
}

/// Runtime projection for a conversion-rate experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionTable {
    /// Baseline conversion rate (0.0-1.0).
    pub baseline_rate: f64,
    /// Average visitors per week across all groups.
    pub weekly_visitors: u64,
    /// Number of experiment groups, control included.
    pub groups: usize,
    /// Significance level after Bonferroni correction.
    pub corrected_alpha: f64,
    /// Target power.
    pub power: f64,
    /// Alternative hypothesis.
    pub alternative: Alternative,
    /// One row per week.
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionTable {
    /// Relative MDE (percent) at the last projected week.
    pub fn final_mde_pct(&self) -> Option<f64> {
        self.rows.last().map(|r| r.mde_relative_pct)
    }

    /// Visitors per group after `week` weeks, before rounding down.
    pub fn sample_size(&self, week: usize) -> f64 {
        week as f64 * self.weekly_visitors as f64 / self.groups as f64
    }

    /// Project the MDE of a continuous metric with standard deviation
    /// `std_dev` over the same weeks, alpha and power.
    pub fn continuous_mde(&self, std_dev: f64) -> Result<Vec<ContinuousProjectionRow>> {
        self.rows
            .iter()
            .map(|row| {
                let mde = mde_continuous(
                    self.corrected_alpha,
                    self.power,
                    std_dev,
                    self.sample_size(row.week),
                    self.alternative,
                )?;
                Ok(ContinuousProjectionRow {
                    week: row.week,
                    sample_size_per_variant: row.sample_size_per_variant,
                    mde,
                })
            })
            .collect()
    }

    /// Write the projection to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "week\tmde_pct\tmde_pp\tpotential_cr_pct\tsample_size_per_variant"
        )?;
        for r in &self.rows {
            writeln!(
                writer,
                "{}\t{:.2}\t{:.3}\t{:.2}\t{}",
                r.week, r.mde_relative_pct, r.mde_pp, r.potential_rate_pct, r.sample_size_per_variant
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for ProjectionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Conversion rate: {:.2} %", self.baseline_rate * 100.0)?;
        writeln!(
            f,
            "Groups: {}, alpha (corrected): {:.4}, power: {:.2}, {}",
            self.groups, self.corrected_alpha, self.power, self.alternative
        )?;
        writeln!(
            f,
            "  {:>5}  {:>9}  {:>10}  {:>13}  {:>14}",
            "Weeks", "MDE (%)", "MDE (PP)", "Potential CR", "Visitors/group"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "  {:>5}  {:>7.2} %  {:>7.3} PP  {:>11.2} %  {:>14}",
                r.week, r.mde_relative_pct, r.mde_pp, r.potential_rate_pct, r.sample_size_per_variant
            )?;
        }
        Ok(())
    }
}

/// Project MDE for weeks `1..=weeks`.
///
/// # Arguments
/// * `weekly_visitors` - Average visitors per week across all groups
/// * `weekly_conversions` - Average conversions per week across all groups
/// * `groups` - Number of experiment groups, control included (>= 2)
/// * `params` - Family-wise alpha, power and alternative
/// * `weeks` - Number of weeks to project
pub fn project_runtime(
    weekly_visitors: u64,
    weekly_conversions: u64,
    groups: usize,
    params: &PowerParameters,
    weeks: usize,
) -> Result<ProjectionTable> {
    params.validate()?;
    if groups < 2 {
        return Err(PivotError::InvalidArgument(format!(
            "An experiment needs at least 2 groups, got {}",
            groups
        )));
    }
    if weeks == 0 {
        return Err(PivotError::InvalidArgument(
            "weeks must be at least 1".to_string(),
        ));
    }
    if weekly_visitors == 0 {
        return Err(PivotError::DegenerateInput(
            "Weekly visitors must be at least 1".to_string(),
        ));
    }
    if weekly_conversions > weekly_visitors {
        return Err(PivotError::DegenerateInput(
            "You can't have more conversions than visits".to_string(),
        ));
    }
    if weekly_conversions == weekly_visitors {
        return Err(PivotError::DegenerateInput(
            "Conversion rate is 100 %, there is nothing left to optimize".to_string(),
        ));
    }
    if weekly_conversions == 0 {
        return Err(PivotError::DegenerateInput(
            "Conversion rate is 0 %, an effect cannot be expressed relative to it".to_string(),
        ));
    }

    let baseline = weekly_conversions as f64 / weekly_visitors as f64;
    let alpha = corrected_alpha(params.alpha, groups - 1);

    let mut table = ProjectionTable {
        baseline_rate: baseline,
        weekly_visitors,
        groups,
        corrected_alpha: alpha,
        power: params.power,
        alternative: params.alternative,
        rows: Vec::with_capacity(weeks),
    };
    for week in 1..=weeks {
        let n = table.sample_size(week);
        let mde = mde_proportion(alpha, params.power, baseline, n, params.alternative)?;
        let relative = mde / baseline;
        table.rows.push(ProjectionRow {
            week,
            sample_size_per_variant: n.floor() as u64,
            mde_relative_pct: relative * 100.0,
            mde_pp: mde * 100.0,
            potential_rate_pct: baseline * (1.0 + relative) * 100.0,
        });
    }
    Ok(table)
}
