//! Power of the two-sample z-test and its inverse.
//!
//! The power function works on a standardized effect size `d` (difference
//! divided by the per-visitor standard deviation). With `n1` visitors in the
//! first group and `ratio * n1` in the second, the test statistic is shifted
//! by `d / sqrt(1/n1 + 1/(ratio * n1))`.
//!
//! [`solve_effect_size`] inverts the power function by bracketing and
//! bisection. It is the iterative counterpart of the closed forms in
//! [`mde`](super::mde) and agrees with them up to the far-tail term of the
//! two-sided power function.

use crate::data::{Alternative, ProportionSample};
use crate::distributions::standard_normal;
use crate::error::{check_open_unit, PivotError, Result};
use crate::power::effect::cohens_h;
use crate::power::mde::{check_sample_size, z_alpha};
use statrs::distribution::ContinuousCDF;

const MAX_BRACKET_EXPANSIONS: usize = 50;
const MAX_BISECTION_ITER: usize = 200;
const EFFECT_TOLERANCE: f64 = 1e-12;

/// Power of the two-sample z-test for standardized effect `effect_size`.
///
/// `ratio` is the second group's size relative to `nobs1`.
pub fn normal_power(
    effect_size: f64,
    nobs1: f64,
    ratio: f64,
    alpha: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_sample_size(nobs1)?;
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(PivotError::InvalidArgument(format!(
            "ratio must be positive, got {}",
            ratio
        )));
    }
    if !effect_size.is_finite() {
        return Err(PivotError::InvalidArgument(format!(
            "effect_size must be finite, got {}",
            effect_size
        )));
    }

    let normal = standard_normal()?;
    let crit = z_alpha(alpha, alternative)?;
    let shift = effect_size / (1.0 / nobs1 + 1.0 / (ratio * nobs1)).sqrt();

    let power = match alternative {
        Alternative::TwoSided => normal.sf(crit - shift) + normal.cdf(-crit - shift),
        Alternative::Larger => normal.sf(crit - shift),
        Alternative::Smaller => normal.cdf(-crit - shift),
    };
    Ok(power)
}

/// Achieved power for equal group sizes of `sample_size` visitors.
pub fn post_hoc_power(
    effect_size: f64,
    sample_size: f64,
    alpha: f64,
    alternative: Alternative,
) -> Result<f64> {
    normal_power(effect_size, sample_size, 1.0, alpha, alternative)
}

/// Achieved power of an observed conversion-rate comparison.
///
/// The effect size is Cohen's h of the two observed rates; group sizes are
/// taken from the samples. Advisory only: low power is a warning, never a
/// failure.
pub fn observed_power(
    control: &ProportionSample,
    variant: &ProportionSample,
    alpha: f64,
    alternative: Alternative,
) -> Result<f64> {
    let h = cohens_h(control.rate(), variant.rate());
    let ratio = variant.visitors() as f64 / control.visitors() as f64;
    normal_power(h, control.visitors() as f64, ratio, alpha, alternative)
}

/// Standardized effect size needed to reach `power` with `sample_size`
/// visitors per group.
///
/// Positive for [`Alternative::TwoSided`] and [`Alternative::Larger`],
/// negative for [`Alternative::Smaller`].
pub fn solve_effect_size(
    sample_size: f64,
    alpha: f64,
    power: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_open_unit("alpha", alpha)?;
    check_open_unit("power", power)?;
    check_sample_size(sample_size)?;

    // Smaller mirrors Larger
    let solve_for = match alternative {
        Alternative::Smaller => Alternative::Larger,
        other => other,
    };
    let objective = |d: f64| -> Result<f64> {
        Ok(post_hoc_power(d, sample_size, alpha, solve_for)? - power)
    };

    let mut lo = 0.0;
    if objective(lo)? >= 0.0 {
        return Err(PivotError::InvalidArgument(format!(
            "power ({}) must exceed the power at zero effect (alpha = {})",
            power, alpha
        )));
    }

    let mut hi = 1.0;
    let mut expand = 0usize;
    while objective(hi)? < 0.0 {
        if expand >= MAX_BRACKET_EXPANSIONS {
            return Err(PivotError::Numerical(
                "Failed to bracket effect size after expansions".to_string(),
            ));
        }
        lo = hi;
        hi *= 2.0;
        expand += 1;
    }

    let mut iterations = 0usize;
    while iterations < MAX_BISECTION_ITER && hi - lo > EFFECT_TOLERANCE * hi.max(1.0) {
        let mid = 0.5 * (lo + hi);
        if objective(mid)? < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }

    let effect = 0.5 * (lo + hi);
    tracing::debug!(effect, iterations, expand, "solved effect size");

    Ok(match alternative {
        Alternative::Smaller => -effect,
        _ => effect,
    })
}

/// Minimum detectable absolute change in conversion rate via the solver.
///
/// Translates the standardized effect size back to a rate difference by
/// multiplying with the Bernoulli standard deviation `sqrt(p (1 - p))`.
pub fn mde_proportion_solved(
    alpha: f64,
    power: f64,
    baseline_rate: f64,
    sample_size: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_open_unit("baseline_rate", baseline_rate)?;
    let effect = solve_effect_size(sample_size, alpha, power, alternative)?;
    Ok(effect.abs() * (baseline_rate * (1.0 - baseline_rate)).sqrt())
}
