//! Multiple testing correction.

pub mod bonferroni;

pub use bonferroni::{correct_bonferroni, corrected_alpha, BonferroniCorrected};
