//! Inter-somatic distances paired with a connectivity matrix.

use serde::Serialize;

use crate::{Error, Result};

/// Tolerance for the magnitude symmetry check, in the file's units (µm).
const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Signed distances between recorded cells. The sign may encode the
/// direction of measurement; `|d(i, j)| == |d(j, i)|` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(Error::InvalidMatrix("distance matrix is empty".into()));
        }
        let mut values = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidMatrix(format!(
                    "distance row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            if let Some(j) = row.iter().position(|d| !d.is_finite()) {
                return Err(Error::InvalidMatrix(format!("distance ({i}, {j}) is not finite")));
            }
            values.extend(row);
        }

        for i in 0..size {
            for j in (i + 1)..size {
                let (a, b) = (values[i * size + j], values[j * size + i]);
                if (a.abs() - b.abs()).abs() > SYMMETRY_TOLERANCE {
                    return Err(Error::InvalidMatrix(format!(
                        "distances ({i}, {j}) = {a} and ({j}, {i}) = {b} differ in magnitude"
                    )));
                }
            }
        }

        Ok(Self { size, values })
    }

    pub fn node_count(&self) -> usize {
        self.size
    }

    /// Signed distance as recorded.
    pub fn signed(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Unsigned inter-somatic distance.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.signed(i, j).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_allowed_magnitude_symmetric() {
        let d = DistanceMatrix::from_rows(vec![vec![0.0, 35.5], vec![-35.5, 0.0]]).unwrap();
        assert_eq!(d.signed(1, 0), -35.5);
        assert_eq!(d.distance(1, 0), 35.5);
    }

    #[test]
    fn test_rejects_asymmetric_magnitude() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 10.0], vec![12.0, 0.0]]);
        assert!(matches!(err, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn test_rejects_nan() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![0.0, 0.0]]).is_err());
    }
}
