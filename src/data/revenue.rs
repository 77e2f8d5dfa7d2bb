//! Order revenue files.
//!
//! A revenue file holds one order value per line in its first column, with
//! an optional header row. Every value must parse as a number and be
//! strictly positive; zero-revenue "orders" are rejected, since
//! non-converting visitors are accounted for by zero padding instead.

use crate::error::{PivotError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read order values from a CSV file.
pub fn read_revenue_file<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    read_revenue(file)
}

/// Read order values from any CSV source.
pub fn read_revenue<R: Read>(source: R) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut values = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;
        let field = match record.get(0) {
            Some(f) if !f.is_empty() => f,
            _ => continue,
        };

        match field.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => values.push(value),
            Ok(value) => {
                return Err(PivotError::DegenerateInput(format!(
                    "Row {}: order revenue must be greater than 0, got {}",
                    row, value
                )))
            }
            // A non-numeric first row is a header
            Err(_) if row == 1 => continue,
            Err(_) => {
                return Err(PivotError::DegenerateInput(format!(
                    "Row {}: '{}' is not a numeric revenue value",
                    row, field
                )))
            }
        }
    }

    if values.is_empty() {
        return Err(PivotError::DegenerateInput(
            "Revenue file contains no orders".to_string(),
        ));
    }

    Ok(values)
}
