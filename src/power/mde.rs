//! Closed-form minimum detectable effect.
//!
//! For a two-sample comparison with `n` visitors per group:
//!
//! ```text
//! MDE = (z_alpha + z_power) * SE
//! ```
//!
//! where `z_alpha = Φ⁻¹(1 - alpha/2)` (two-sided) or `Φ⁻¹(1 - alpha)`
//! (one-sided) and `z_power = Φ⁻¹(power)`.
//!
//! - Proportion metric: `SE = sqrt(2 p (1 - p) / n)`, MDE is an absolute
//!   difference in conversion rate.
//! - Continuous metric: `SE = std_dev / sqrt(n)`, MDE is in the metric's unit.

use crate::data::{Alternative, PowerParameters};
use crate::distributions::standard_normal;
use crate::error::{check_open_unit, PivotError, Result};
use statrs::distribution::ContinuousCDF;

/// Critical value of the standard normal for the given alpha and direction.
pub fn z_alpha(alpha: f64, alternative: Alternative) -> Result<f64> {
    check_open_unit("alpha", alpha)?;
    let normal = standard_normal()?;
    let tail = if alternative.is_two_sided() {
        alpha / 2.0
    } else {
        alpha
    };
    Ok(normal.inverse_cdf(1.0 - tail))
}

/// Standard normal quantile of the target power.
pub fn z_power(power: f64) -> Result<f64> {
    check_open_unit("power", power)?;
    Ok(standard_normal()?.inverse_cdf(power))
}

pub(crate) fn check_sample_size(sample_size: f64) -> Result<()> {
    if sample_size.is_finite() && sample_size > 0.0 {
        Ok(())
    } else {
        Err(PivotError::InvalidArgument(format!(
            "sample_size must be positive, got {}",
            sample_size
        )))
    }
}

/// Minimum detectable absolute change in conversion rate.
///
/// `baseline_rate` must lie strictly inside (0, 1): at 0 % or 100 % there is
/// nothing to detect and the standard error collapses.
pub fn mde_proportion(
    alpha: f64,
    power: f64,
    baseline_rate: f64,
    sample_size: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_open_unit("baseline_rate", baseline_rate)?;
    check_sample_size(sample_size)?;

    let multiplier = z_alpha(alpha, alternative)? + z_power(power)?;
    let se = (2.0 * baseline_rate * (1.0 - baseline_rate) / sample_size).sqrt();
    Ok(multiplier * se)
}

/// Minimum detectable change of a continuous metric.
pub fn mde_continuous(
    alpha: f64,
    power: f64,
    std_dev: f64,
    sample_size: f64,
    alternative: Alternative,
) -> Result<f64> {
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return Err(PivotError::InvalidArgument(format!(
            "std_dev must be positive, got {}",
            std_dev
        )));
    }
    check_sample_size(sample_size)?;

    let multiplier = z_alpha(alpha, alternative)? + z_power(power)?;
    Ok(multiplier * std_dev / sample_size.sqrt())
}

/// [`mde_proportion`] taking bundled parameters.
pub fn mde_proportion_with(
    params: &PowerParameters,
    baseline_rate: f64,
    sample_size: f64,
) -> Result<f64> {
    mde_proportion(
        params.alpha,
        params.power,
        baseline_rate,
        sample_size,
        params.alternative,
    )
}
