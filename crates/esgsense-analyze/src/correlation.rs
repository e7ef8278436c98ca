//! Pearson correlation matrix over the numeric record columns.

use esgsense_core::CleanedRecord;
use ndarray::{Array1, Array2, Axis};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Square matrix of Pearson coefficients. Undefined entries (a constant
/// column, fewer than two rows) are stored as NaN and surfaced as `None`.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    coefficients: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        let value = self.coefficients[[i, j]];
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Rows of the matrix in column order.
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        self.coefficients
            .outer_iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect()
            })
            .collect()
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CorrelationMatrix", 2)?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("values", &self.rows())?;
        s.end()
    }
}

/// Pearson matrix over named columns of equal length. `None` (skipped) when
/// fewer than two columns or no rows are available.
pub fn correlation(columns: &[(&str, Vec<f64>)]) -> Option<CorrelationMatrix> {
    if columns.len() < 2 {
        return None;
    }
    let n = columns[0].1.len();
    if n == 0 || columns.iter().any(|(_, values)| values.len() != n) {
        return None;
    }

    let k = columns.len();
    let data = Array2::from_shape_fn((n, k), |(i, j)| columns[j].1[i]);
    let means: Array1<f64> = data.mean_axis(Axis(0))?;
    let centered = &data - &means;
    let cov = centered.t().dot(&centered);

    let coefficients = Array2::from_shape_fn((k, k), |(i, j)| {
        let denom = (cov[[i, i]] * cov[[j, j]]).sqrt();
        if denom == 0.0 || !denom.is_finite() {
            f64::NAN
        } else if i == j {
            1.0
        } else {
            (cov[[i, j]] / denom).clamp(-1.0, 1.0)
        }
    });

    Some(CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
        coefficients,
    })
}

/// Correlation across `sentiment_score`, `year`, `month` and `sentiment_abs`.
pub fn sentiment_correlation(records: &[CleanedRecord]) -> Option<CorrelationMatrix> {
    let columns = [
        (
            "sentiment_score",
            records.iter().map(|r| r.sentiment_score).collect::<Vec<_>>(),
        ),
        ("year", records.iter().map(|r| r.year as f64).collect()),
        ("month", records.iter().map(|r| r.month as f64).collect()),
        (
            "sentiment_abs",
            records.iter().map(|r| r.sentiment_score.abs()).collect(),
        ),
    ];
    correlation(&columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_correlation() {
        let m = correlation(&[
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![2.0, 4.0, 6.0, 8.0]),
            ("c", vec![4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m.get("a", "a"), Some(1.0));
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let m = correlation(&[("a", vec![1.0, 2.0, 3.0]), ("year", vec![2025.0; 3])]).unwrap();
        assert_eq!(m.get("a", "year"), None);
        assert_eq!(m.get("year", "year"), None);
        assert_eq!(m.get("a", "a"), Some(1.0));
        assert_eq!(m.rows()[0], vec![Some(1.0), None]);
    }

    #[test]
    fn test_skipped_when_too_few_columns_or_rows() {
        assert!(correlation(&[("a", vec![1.0, 2.0])]).is_none());
        assert!(correlation(&[("a", vec![]), ("b", vec![])]).is_none());
        assert!(sentiment_correlation(&[]).is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let m = correlation(&[("a", vec![1.0, 2.0]), ("b", vec![2.0, 1.0])]).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["columns"][1], "b");
        assert_eq!(json["values"][0][1], -1.0);
    }
}
