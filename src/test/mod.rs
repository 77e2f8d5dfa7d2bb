//! Statistical hypothesis tests for experiment analysis.

pub mod srm;

pub use interaction::{interaction_test, interaction_test_with, YatesCorrection};
pub use means::{means_test, means_test_with, VarianceModel};
pub use multi::{
    multi_variant_test, multi_variant_test_with, variant_label, ExperimentSample,
};
pub use proportions::{diff_confidence_interval, proportions_test, ConfidenceInterval};
pub use srm::{srm_test, FREQUENCY_SUM_TOLERANCE};
