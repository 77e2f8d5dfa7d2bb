//! Pivot Point: statistics for online A/B testing
//!
//! This library provides stateless calculators for planning and analysing
//! online experiments.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (samples, contingency tables, results)
//! - **power**: Minimum detectable effect, runtime projection, achieved power
//! - **test**: Hypothesis tests (SRM, traffic interaction, z-test, t-test)
//! - **correct**: Multiple testing correction (Bonferroni)
//! - **advisory**: Decision thresholds and warnings
//! - **config**: YAML analysis configuration
//!
//! # Example
//!
//! ```no_run
//! use pivot_point::prelude::*;
//!
//! // Plan: how small an effect can 6 weeks of traffic detect?
//! let params = PowerParameters::default();
//! let projection = project_runtime(20_000, 600, 2, &params, 6).unwrap();
//! println!("{}", projection);
//!
//! // Check the split before looking at the outcome
//! let srm = srm_test(&[10_020, 9_980], None).unwrap();
//! assert!(Thresholds::default().check_srm(&srm).is_none());
//!
//! // Analyse
//! let control = ProportionSample::new(10_020, 301).unwrap();
//! let variant = ProportionSample::new(9_980, 352).unwrap();
//! let result = proportions_test(&control, &variant, Alternative::TwoSided).unwrap();
//! println!("{}", result);
//! ```

pub mod advisory;
pub mod config;
pub mod correct;
pub mod data;
mod distributions;
pub mod error;
pub mod power;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::advisory::{
        check_saturation, Advisory, Thresholds, INTERACTION_THRESHOLD, MAX_PROJECTED_MDE,
        MAX_RECOMMENDED_ALPHA, MIN_RECOMMENDED_POWER, SRM_THRESHOLD,
    };
    pub use crate::config::AnalysisConfig;
    pub use crate::correct::{correct_bonferroni, corrected_alpha, BonferroniCorrected};
    pub use crate::data::{
        read_revenue, read_revenue_file, Alternative, Comparison, ContingencyTable,
        ContinuousSample, MultiVariantResult, PowerParameters, ProportionSample, TestKind,
        TestResult,
    };
    pub use crate::error::{PivotError, Result};
    pub use crate::power::{
        cohens_h, mde_continuous, mde_proportion, mde_proportion_solved, mde_proportion_with,
        observed_power, post_hoc_power, project_runtime, solve_effect_size, standardized_effect,
        ProjectionRow, ProjectionTable, DEFAULT_WEEKS,
    };
    pub use crate::test::{
        diff_confidence_interval, interaction_test, interaction_test_with, means_test,
        means_test_with, multi_variant_test, multi_variant_test_with, proportions_test,
        srm_test, ConfidenceInterval, ExperimentSample, VarianceModel, YatesCorrection,
    };
}
