//! Connection probability as a function of inter-somatic distance.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::loader::Recording;
use crate::model::{ConnectivityMatrix, DistanceMatrix, EdgeType, Pathway};
use crate::{Error, Result};

/// One distance bin `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceBin {
    pub lower: f64,
    pub upper: f64,
    pub found: u64,
    pub tested: u64,
}

impl DistanceBin {
    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    pub fn probability(&self) -> Option<f64> {
        (self.tested > 0).then(|| self.found as f64 / self.tested as f64)
    }
}

/// Least-squares line through binned probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceProfile {
    pub edge_type: EdgeType,
    pub pathway: Pathway,
    pub bin_width: f64,
    /// Non-empty bins in distance order. Empty bins are not stored.
    pub bins: Vec<DistanceBin>,
}

impl DistanceProfile {
    /// Bin `(distance, connected)` observations. Distances are taken as
    /// absolute values.
    pub fn build<I>(pairs: I, edge_type: EdgeType, pathway: Pathway, bin_width: f64) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, bool)>,
    {
        if !(bin_width.is_finite() && bin_width > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "bin width {bin_width} must be positive"
            )));
        }

        let mut by_index: BTreeMap<u64, DistanceBin> = BTreeMap::new();
        for (distance, connected) in pairs {
            let idx = (distance.abs() / bin_width).floor() as u64;
            let bin = by_index.entry(idx).or_insert_with(|| {
                let lower = idx as f64 * bin_width;
                DistanceBin { lower, upper: lower + bin_width, found: 0, tested: 0 }
            });
            bin.tested += 1;
            bin.found += u64::from(connected);
        }
        let bins = by_index.into_values().collect();

        Ok(Self { edge_type, pathway, bin_width, bins })
    }

    /// Profile over every recording that carries distances.
    pub fn from_recordings(
        recordings: &[Recording],
        edge_type: EdgeType,
        pathway: Pathway,
        bin_width: f64,
    ) -> Result<Self> {
        let mut pairs = Vec::new();
        for rec in recordings {
            if let Some(distances) = &rec.distances {
                collect_pairs(&rec.matrix, distances, edge_type, pathway, &mut pairs);
            }
        }
        Self::build(pairs, edge_type, pathway, bin_width)
    }

    pub fn tested(&self) -> u64 {
        self.bins.iter().map(|b| b.tested).sum()
    }

    /// Fit `probability = slope * center + intercept` over non-empty bins.
    pub fn fit_linear(&self) -> Result<LinearFit> {
        let points: Vec<(f64, f64)> = self
            .bins
            .iter()
            .filter_map(|b| b.probability().map(|p| (b.center(), p)))
            .collect();

        let insufficient = || Error::InsufficientData {
            subject: format!("{} distance profile in {}", self.edge_type, self.pathway),
        };
        if points.len() < 2 {
            return Err(insufficient());
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
        if sxx == 0.0 {
            return Err(insufficient());
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let ss_tot: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
        let ss_res: f64 = points
            .iter()
            .map(|p| (p.1 - (slope * p.0 + intercept)).powi(2))
            .sum();
        let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        Ok(LinearFit { slope, intercept, r_squared })
    }
}

fn collect_pairs(
    matrix: &ConnectivityMatrix,
    distances: &DistanceMatrix,
    edge_type: EdgeType,
    pathway: Pathway,
    out: &mut Vec<(f64, bool)>,
) {
    let n = matrix.node_count();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            match edge_type {
                EdgeType::Chemical if matrix.pathway(i, j) == pathway => {
                    out.push((distances.distance(i, j), matrix.has_chemical(i, j)));
                }
                EdgeType::Electrical
                    if i < j && matrix.pathway(i, j).undirected() == pathway.undirected() =>
                {
                    out.push((distances.distance(i, j), matrix.has_electrical(i, j)));
                }
                _ => {}
            }
        }
    }
}
