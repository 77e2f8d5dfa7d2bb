//! Contingency table of visitor counts.

use crate::error::{PivotError, Result};
use serde::{Deserialize, Serialize};

/// R x C matrix of non-negative counts (R, C >= 2).
///
/// For the interaction detector, rows are the groups of one experiment and
/// columns the groups of another; each cell counts visitors exposed to both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRows")]
pub struct ContingencyTable {
    rows: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Create a table from rows, rejecting ragged or undersized input.
    pub fn new(rows: Vec<Vec<u64>>) -> Result<Self> {
        if rows.len() < 2 {
            return Err(PivotError::InvalidArgument(format!(
                "Contingency table needs at least 2 rows, got {}",
                rows.len()
            )));
        }
        let n_cols = rows[0].len();
        if n_cols < 2 {
            return Err(PivotError::InvalidArgument(format!(
                "Contingency table needs at least 2 columns, got {}",
                n_cols
            )));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(PivotError::InvalidArgument(format!(
                "Row {} has {} columns, expected {}",
                i + 1,
                rows[i].len(),
                n_cols
            )));
        }
        Ok(Self { rows })
    }

    /// 2x2 table from the four cells in row-major order.
    pub fn two_by_two(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self {
            rows: vec![vec![a, b], vec![c, d]],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.rows[0].len()
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.rows[row][col]
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().flatten().sum()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.n_cols())
            .map(|j| self.rows.iter().map(|r| r[j]).sum())
            .collect()
    }

    /// Degrees of freedom of the independence test: (R - 1)(C - 1).
    pub fn degrees_of_freedom(&self) -> usize {
        (self.n_rows() - 1) * (self.n_cols() - 1)
    }

    /// Expected cell counts under independence, from the marginals.
    pub fn expected(&self) -> Vec<Vec<f64>> {
        let total = self.total() as f64;
        let row_totals = self.row_totals();
        let col_totals = self.col_totals();
        row_totals
            .iter()
            .map(|&r| {
                col_totals
                    .iter()
                    .map(|&c| r as f64 * c as f64 / total)
                    .collect()
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct TableRows {
    rows: Vec<Vec<u64>>,
}

impl TryFrom<TableRows> for ContingencyTable {
    type Error = PivotError;

    fn try_from(table: TableRows) -> Result<Self> {
        Self::new(table.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_marginals() {
        let t = ContingencyTable::new(vec![vec![10, 20, 30], vec![40, 50, 60]]).unwrap();
        assert_eq!(t.total(), 210);
        assert_eq!(t.row_totals(), vec![60, 150]);
        assert_eq!(t.col_totals(), vec![50, 70, 90]);
        assert_eq!(t.degrees_of_freedom(), 2);
    }

    #[test]
    fn test_expected() {
        let t = ContingencyTable::two_by_two(10, 30, 20, 40);
        let e = t.expected();
        assert_relative_eq!(e[0][0], 40.0 * 30.0 / 100.0, epsilon = 1e-12);
        assert_relative_eq!(e[1][1], 60.0 * 70.0 / 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ragged_rejected() {
        let err = ContingencyTable::new(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, PivotError::InvalidArgument(_)));
    }

    #[test]
    fn test_deserialize_validates() {
        let t: ContingencyTable = serde_json::from_str(r#"{"rows":[[5,6],[7,8]]}"#).unwrap();
        assert_eq!(t, ContingencyTable::two_by_two(5, 6, 7, 8));

        assert!(serde_json::from_str::<ContingencyTable>(r#"{"rows":[[5,6],[7]]}"#).is_err());
        assert!(serde_json::from_str::<ContingencyTable>(r#"{"rows":[]}"#).is_err());
        assert!(serde_json::from_str::<ContingencyTable>(r#"{"rows":[[5],[7]]}"#).is_err());
    }

    #[test]
    fn test_too_small_rejected() {
        assert!(ContingencyTable::new(vec![vec![1, 2]]).is_err());
        assert!(ContingencyTable::new(vec![vec![1], vec![2]]).is_err());
    }
}
