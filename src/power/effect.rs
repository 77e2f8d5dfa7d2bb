//! Standardized effect sizes.

use crate::error::{check_open_unit, Result};

/// Cohen's h: arcsine-transformed difference between two proportions,
/// `2 asin(sqrt(p2)) - 2 asin(sqrt(p1))`.
///
/// Positive when `p2 > p1`. Inputs are clamped to [0, 1].
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    let phi = |p: f64| 2.0 * p.clamp(0.0, 1.0).sqrt().asin();
    phi(p2) - phi(p1)
}

/// Standardized effect of an absolute rate change `mde` at `baseline_rate`:
/// `mde / sqrt(p (1 - p))`.
///
/// Inverse of the translation used by the solver-based MDE, so an MDE fed
/// back through [`post_hoc_power`](super::solver::post_hoc_power) recovers
/// the planned power.
pub fn standardized_effect(mde: f64, baseline_rate: f64) -> Result<f64> {
    check_open_unit("baseline_rate", baseline_rate)?;
    Ok(mde / (baseline_rate * (1.0 - baseline_rate)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cohens_h_known_value() {
        // 2 asin(sqrt(0.5)) = pi / 2; 2 asin(sqrt(0.25)) = pi / 3
        let h = cohens_h(0.25, 0.5);
        assert_relative_eq!(h, std::f64::consts::PI / 2.0 - std::f64::consts::PI / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cohens_h_antisymmetric() {
        assert_relative_eq!(cohens_h(0.1, 0.15), -cohens_h(0.15, 0.1), epsilon = 1e-12);
        assert_eq!(cohens_h(0.3, 0.3), 0.0);
    }

    #[test]
    fn test_standardized_effect() {
        assert_relative_eq!(standardized_effect(0.03, 0.5).unwrap(), 0.06, epsilon = 1e-12);
        assert!(standardized_effect(0.03, 0.0).is_err());
    }
}
