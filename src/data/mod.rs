//! Data structures for experiment analysis.

mod params;
mod result;
pub mod revenue;
mod sample;
mod table;

pub use params::{Alternative, PowerParameters};
pub use result::{Comparison, MultiVariantResult, TestKind, TestResult};
pub use revenue::{read_revenue, read_revenue_file};
pub use sample::{ContinuousSample, ProportionSample};
pub(crate) use sample::mean_variance;
pub use table::ContingencyTable;
