//! Per-group experiment observations.

use crate::error::{PivotError, Result};
use serde::{Deserialize, Serialize};

/// Visitors and conversions of one experiment group (binomial metric).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProportionFields")]
pub struct ProportionSample {
    visitors: u64,
    conversions: u64,
}

impl ProportionSample {
    /// Create a sample, rejecting empty groups and more conversions than visitors.
    pub fn new(visitors: u64, conversions: u64) -> Result<Self> {
        if visitors == 0 {
            return Err(PivotError::DegenerateInput(
                "A group needs at least one visitor".to_string(),
            ));
        }
        if conversions > visitors {
            return Err(PivotError::DegenerateInput(format!(
                "You can't have more conversions ({}) than visitors ({})",
                conversions, visitors
            )));
        }
        Ok(Self {
            visitors,
            conversions,
        })
    }

    pub fn visitors(&self) -> u64 {
        self.visitors
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Conversion rate as a fraction (0.0-1.0).
    pub fn rate(&self) -> f64 {
        self.conversions as f64 / self.visitors as f64
    }

    /// Check if every visitor converted.
    pub fn is_saturated(&self) -> bool {
        self.conversions == self.visitors
    }
}

#[derive(Deserialize)]
struct ProportionFields {
    visitors: u64,
    conversions: u64,
}

impl TryFrom<ProportionFields> for ProportionSample {
    type Error = PivotError;

    fn try_from(fields: ProportionFields) -> Result<Self> {
        Self::new(fields.visitors, fields.conversions)
    }
}

/// Revenue observations of one experiment group (continuous metric).
///
/// Only converting visitors produce an order value. Everyone else is a
/// zero-revenue visit, which is why tests run on [`padded_values`]
/// rather than on the raw orders.
///
/// [`padded_values`]: ContinuousSample::padded_values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContinuousFields")]
pub struct ContinuousSample {
    visitor_count: u64,
    order_values: Vec<f64>,
}

impl ContinuousSample {
    /// Create a sample from the total visitor count and the positive order values.
    pub fn new(visitor_count: u64, order_values: Vec<f64>) -> Result<Self> {
        if visitor_count == 0 {
            return Err(PivotError::DegenerateInput(
                "A group needs at least one visitor".to_string(),
            ));
        }
        if order_values.len() as u64 > visitor_count {
            return Err(PivotError::DegenerateInput(format!(
                "You can't have more orders ({}) than visitors ({})",
                order_values.len(),
                visitor_count
            )));
        }
        if let Some((idx, value)) = order_values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v <= 0.0)
        {
            return Err(PivotError::DegenerateInput(format!(
                "Order {} has revenue {}; order values must be positive",
                idx + 1,
                value
            )));
        }
        Ok(Self {
            visitor_count,
            order_values,
        })
    }

    pub fn visitor_count(&self) -> u64 {
        self.visitor_count
    }

    pub fn order_values(&self) -> &[f64] {
        &self.order_values
    }

    /// Number of orders (converting visitors).
    pub fn n_orders(&self) -> usize {
        self.order_values.len()
    }

    /// Number of visitors without an order.
    pub fn n_non_converting(&self) -> u64 {
        self.visitor_count - self.order_values.len() as u64
    }

    pub fn total_revenue(&self) -> f64 {
        self.order_values.iter().sum()
    }

    /// Mean revenue per visitor, counting non-converting visits as zero.
    pub fn revenue_per_visitor(&self) -> f64 {
        self.total_revenue() / self.visitor_count as f64
    }

    /// Orders per visitor.
    pub fn conversion_rate(&self) -> f64 {
        self.order_values.len() as f64 / self.visitor_count as f64
    }

    /// Revenue-per-visitor series: the order values followed by one zero
    /// for every non-converting visitor. Length equals `visitor_count`.
    pub fn padded_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.visitor_count as usize);
        values.extend_from_slice(&self.order_values);
        values.resize(self.visitor_count as usize, 0.0);
        values
    }
}

#[derive(Deserialize)]
struct ContinuousFields {
    visitor_count: u64,
    order_values: Vec<f64>,
}

impl TryFrom<ContinuousFields> for ContinuousSample {
    type Error = PivotError;

    fn try_from(fields: ContinuousFields) -> Result<Self> {
        Self::new(fields.visitor_count, fields.order_values)
    }
}

/// Mean and unbiased (n - 1) variance of a series.
pub(crate) fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, f64::NAN);
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, ss / (n - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportion_sample_rate() {
        let s = ProportionSample::new(1000, 100).unwrap();
        assert_relative_eq!(s.rate(), 0.1, epsilon = 1e-12);
        assert!(!s.is_saturated());
    }

    #[test]
    fn test_more_conversions_than_visitors() {
        let err = ProportionSample::new(10, 11).unwrap_err();
        assert!(matches!(err, PivotError::DegenerateInput(_)));
    }

    #[test]
    fn test_zero_visitors_rejected() {
        assert!(ProportionSample::new(0, 0).is_err());
        assert!(ContinuousSample::new(0, vec![]).is_err());
    }

    #[test]
    fn test_non_positive_revenue_rejected() {
        assert!(ContinuousSample::new(10, vec![5.0, 0.0]).is_err());
        assert!(ContinuousSample::new(10, vec![5.0, -2.0]).is_err());
        assert!(ContinuousSample::new(10, vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_more_orders_than_visitors() {
        assert!(ContinuousSample::new(1, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_padding_length_and_zeros() {
        let orders: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
        let sample = ContinuousSample::new(100, orders.clone()).unwrap();

        let padded = sample.padded_values();
        assert_eq!(padded.len(), 100);
        assert_eq!(padded.iter().filter(|&&v| v == 0.0).count(), 60);
        assert_eq!(sample.n_non_converting(), 60);

        let (raw_mean, raw_var) = mean_variance(&orders);
        let (pad_mean, pad_var) = mean_variance(&padded);
        assert!((raw_mean - pad_mean).abs() > 1e-6);
        assert!((raw_var.sqrt() - pad_var.sqrt()).abs() > 1e-6);
        assert_relative_eq!(pad_mean, sample.revenue_per_visitor(), epsilon = 1e-12);
    }

    #[test]
    fn test_padding_no_non_converting() {
        let sample = ContinuousSample::new(3, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sample.padded_values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_deserialize_validates() {
        let s: ProportionSample =
            serde_json::from_str(r#"{"visitors":1000,"conversions":100}"#).unwrap();
        assert_eq!(s, ProportionSample::new(1000, 100).unwrap());

        assert!(serde_json::from_str::<ProportionSample>(r#"{"visitors":10,"conversions":25}"#).is_err());
        assert!(serde_json::from_str::<ProportionSample>(r#"{"visitors":0,"conversions":0}"#).is_err());
        assert!(serde_json::from_str::<ContinuousSample>(
            r#"{"visitor_count":10,"order_values":[5.0,-1.0]}"#
        )
        .is_err());
        assert!(serde_json::from_str::<ContinuousSample>(
            r#"{"visitor_count":1,"order_values":[5.0,6.0]}"#
        )
        .is_err());
    }

    #[test]
    fn test_continuous_serde_round_trip() {
        let sample = ContinuousSample::new(5, vec![12.5, 30.0]).unwrap();
        let json = serde_json::to_string(&sample).unwrap();
        let back: ContinuousSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_mean_variance() {
        let (mean, var) = mean_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(mean, 5.0, epsilon = 1e-12);
        assert_relative_eq!(var, 32.0 / 7.0, epsilon = 1e-12);
    }
}
