//! Power analysis: minimum detectable effect and achieved power.

pub mod effect;
pub mod mde;
pub mod projection;
pub mod solver;

pub use effect::{cohens_h, standardized_effect};
pub use mde::{mde_continuous, mde_proportion, mde_proportion_with, z_alpha, z_power};
pub use projection::{
    project_runtime, ContinuousProjectionRow, ProjectionRow, ProjectionTable, DEFAULT_WEEKS,
};
pub use solver::{
    mde_proportion_solved, normal_power, observed_power, post_hoc_power, solve_effect_size,
};
