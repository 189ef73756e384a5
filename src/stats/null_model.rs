//! Independent-edge null model.
//!
//! Every potential synapse is an independent Bernoulli trial whose success
//! probability depends only on its channel and pathway. Probabilities are
//! pooled as total edges over total testable pairs, so every matrix
//! contributes counts rather than a pre-normalized rate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ConnectivityMatrix, EdgeType, Pathway, PopulationSizes};
use crate::motif::{Motif, MotifCount, MotifCounter};
use crate::{Error, Result};

/// Realized and testable edges of one channel in one pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeEstimate {
    pub found: u64,
    pub tested: u64,
}

impl EdgeEstimate {
    pub fn probability(&self) -> Option<f64> {
        (self.tested > 0).then(|| self.found as f64 / self.tested as f64)
    }
}

impl std::ops::AddAssign for EdgeEstimate {
    fn add_assign(&mut self, rhs: Self) {
        self.found += rhs.found;
        self.tested += rhs.tested;
    }
}

/// Per-channel, per-pathway connection probabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NullModel {
    estimates: BTreeMap<EdgeType, BTreeMap<Pathway, EdgeEstimate>>,
}

impl NullModel {
    /// Estimate from a collection of matrices recorded under one condition.
    pub fn estimate(matrices: &[ConnectivityMatrix]) -> Self {
        Self::from_counts(&MotifCounter::pairs().count_all(matrices))
    }

    /// Estimate from aggregated pair tallies.
    pub fn from_counts(counts: &MotifCount) -> Self {
        let mut model = Self::default();
        for pathway in Pathway::ALL {
            let chemical = counts.tally(Motif::Chemical, pathway);
            if chemical.tested > 0 {
                model.insert(EdgeType::Chemical, pathway, EdgeEstimate {
                    found: chemical.found,
                    tested: chemical.tested,
                });
            }
            let electrical = counts.tally(Motif::Electrical, pathway);
            if electrical.tested > 0 {
                model.insert(EdgeType::Electrical, pathway, EdgeEstimate {
                    found: electrical.found,
                    tested: electrical.tested,
                });
            }
        }
        model
    }

    /// Set an estimate directly, e.g. from literature values.
    pub fn insert(&mut self, edge_type: EdgeType, pathway: Pathway, estimate: EdgeEstimate) {
        let pathway = match edge_type {
            EdgeType::Chemical => pathway,
            EdgeType::Electrical => pathway.undirected(),
        };
        self.estimates.entry(edge_type).or_default().insert(pathway, estimate);
    }

    pub fn estimate_of(&self, edge_type: EdgeType, pathway: Pathway) -> Option<EdgeEstimate> {
        let pathway = match edge_type {
            EdgeType::Chemical => pathway,
            EdgeType::Electrical => pathway.undirected(),
        };
        self.estimates.get(&edge_type)?.get(&pathway).copied()
    }

    /// Every stored estimate, ordered by channel then pathway.
    pub fn estimates(&self) -> Vec<(EdgeType, Pathway, EdgeEstimate)> {
        self.estimates
            .iter()
            .flat_map(|(&edge_type, by_pathway)| {
                by_pathway.iter().map(move |(&pathway, &est)| (edge_type, pathway, est))
            })
            .collect()
    }

    /// Sum of one channel over every pathway.
    pub fn pooled(&self, edge_type: EdgeType) -> EdgeEstimate {
        let mut total = EdgeEstimate::default();
        if let Some(by_pathway) = self.estimates.get(&edge_type) {
            for est in by_pathway.values() {
                total += *est;
            }
        }
        total
    }

    /// Pooled probability of a channel across all pathways.
    pub fn probability(&self, edge_type: EdgeType) -> Result<f64> {
        self.pooled(edge_type).probability().ok_or_else(|| Error::InsufficientData {
            subject: format!("{edge_type} edges"),
        })
    }

    pub fn probability_in(&self, edge_type: EdgeType, pathway: Pathway) -> Result<f64> {
        self.estimate_of(edge_type, pathway)
            .and_then(|est| est.probability())
            .ok_or_else(|| Error::InsufficientData {
                subject: format!("{edge_type} edges in {pathway}"),
            })
    }

    /// Probability that one opportunity realizes the motif when edges are
    /// independent.
    pub fn motif_probability(&self, motif: Motif, pathway: Pathway) -> Result<f64> {
        let pc = || self.probability_in(EdgeType::Chemical, pathway);
        let pr = || self.probability_in(EdgeType::Chemical, pathway.reversed());
        let pe = || self.probability_in(EdgeType::Electrical, pathway);

        let p = match motif {
            Motif::Chemical => pc()?,
            Motif::Electrical => pe()?,
            Motif::Reciprocal => pc()? * pr()?,
            Motif::ChemicalElectrical => pc()? * pe()?,
            Motif::ReciprocalElectrical => pc()? * pr()? * pe()?,
            Motif::Convergent | Motif::Divergent => pc()?.powi(2),
            Motif::Chain => {
                let p = pc()?;
                p * p * (1.0 - p)
            }
            Motif::CoupledConvergent => pc()?.powi(2) * pe()?,
            Motif::ElectricalChain => {
                let p = pe()?;
                p * p * (1.0 - p)
            }
            Motif::ElectricalTriangle => pe()?.powi(3),
            Motif::MixedChain => pc()? * pe()?,
            Motif::TripleConvergent => pc()?.powi(3),
        };
        Ok(p)
    }

    pub fn opportunities(&self, motif: Motif, pathway: Pathway, sizes: PopulationSizes) -> u64 {
        motif.opportunities(pathway, sizes)
    }

    /// Expected count in one recording with the given population sizes.
    pub fn expected_motif_count(
        &self,
        motif: Motif,
        pathway: Pathway,
        sizes: PopulationSizes,
    ) -> Result<f64> {
        Ok(self.opportunities(motif, pathway, sizes) as f64 * self.motif_probability(motif, pathway)?)
    }

    /// Expected count over an arbitrary number of opportunities.
    pub fn expected(&self, motif: Motif, pathway: Pathway, trials: u64) -> Result<f64> {
        Ok(trials as f64 * self.motif_probability(motif, pathway)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const II: Pathway = Pathway::InterneuronInterneuron;

    fn triplet(rows: Vec<Vec<i64>>) -> ConnectivityMatrix {
        ConnectivityMatrix::with_interneurons(rows, 3).unwrap()
    }

    fn ten_triplets() -> Vec<ConnectivityMatrix> {
        let one_edge = || triplet(vec![vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let empty = || triplet(vec![vec![0; 3]; 3]);
        (0..10).map(|i| if i < 6 { one_edge() } else { empty() }).collect()
    }

    #[test]
    fn test_pooled_chemical_probability() {
        let model = NullModel::estimate(&ten_triplets());
        assert_eq!(model.pooled(EdgeType::Chemical), EdgeEstimate { found: 6, tested: 60 });
        assert!((model.probability(EdgeType::Chemical).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_thirty_directed_pairs_with_six_edges() {
        // five 3-cell recordings offer 5 x 6 = 30 directed pairs
        let two_edges = || triplet(vec![vec![0, 1, 0], vec![0, 0, 1], vec![0, 0, 0]]);
        let empty = || triplet(vec![vec![0; 3]; 3]);
        let matrices = vec![two_edges(), two_edges(), two_edges(), empty(), empty()];

        let model = NullModel::estimate(&matrices);
        assert_eq!(model.pooled(EdgeType::Chemical), EdgeEstimate { found: 6, tested: 30 });
        assert!((model.probability(EdgeType::Chemical).unwrap() - 0.2).abs() < 1e-12);

        let expected = model
            .expected_motif_count(Motif::Convergent, II, PopulationSizes::new(3, 0))
            .unwrap();
        assert!((expected - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_expected_convergent_count() {
        let mut model = NullModel::default();
        model.insert(EdgeType::Chemical, II, EdgeEstimate { found: 6, tested: 30 });
        let expected = model
            .expected_motif_count(Motif::Convergent, II, PopulationSizes::new(3, 0))
            .unwrap();
        assert!((expected - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_chain_excludes_shortcut_probability() {
        let mut model = NullModel::default();
        model.insert(EdgeType::Chemical, II, EdgeEstimate { found: 1, tested: 5 });
        let p = model.motif_probability(Motif::Chain, II).unwrap();
        assert!((p - 0.2 * 0.2 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_triple_convergent_probability() {
        let mut model = NullModel::default();
        model.insert(EdgeType::Chemical, Pathway::GranuleInterneuron, EdgeEstimate { found: 1, tested: 4 });
        let p = model.motif_probability(Motif::TripleConvergent, Pathway::GranuleInterneuron).unwrap();
        assert!((p - 0.25f64.powi(3)).abs() < 1e-12);
        // one interneuron, five granule cells: C(5, 3) opportunities
        let expected = model
            .expected_motif_count(Motif::TripleConvergent, Pathway::GranuleInterneuron, PopulationSizes::new(1, 5))
            .unwrap();
        assert!((expected - 10.0 * 0.25f64.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn test_expected_count_with_huge_populations() {
        let mut model = NullModel::default();
        model.insert(EdgeType::Chemical, II, EdgeEstimate { found: 1, tested: 10 });
        let sizes = PopulationSizes::new(u64::MAX, 0);
        let expected = model.expected_motif_count(Motif::Chain, II, sizes).unwrap();
        assert!(expected.is_finite() && expected > 0.0);
    }

    #[test]
    fn test_electrical_single_and_double_marks_pool_identically() {
        let single = triplet(vec![vec![0, 2, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let double = triplet(vec![vec![0, 2, 0], vec![2, 0, 0], vec![0, 0, 0]]);
        let a = NullModel::estimate(&[single]);
        let b = NullModel::estimate(&[double]);
        assert_eq!(a.estimate_of(EdgeType::Electrical, II), Some(EdgeEstimate { found: 1, tested: 3 }));
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_pathway_is_insufficient() {
        let model = NullModel::estimate(&ten_triplets());
        let err = model.probability_in(EdgeType::Chemical, Pathway::GranuleGranule);
        assert!(matches!(err, Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_cross_pathway_reciprocal_uses_both_directions() {
        let mut model = NullModel::default();
        model.insert(EdgeType::Chemical, Pathway::InterneuronGranule, EdgeEstimate { found: 1, tested: 2 });
        model.insert(EdgeType::Chemical, Pathway::GranuleInterneuron, EdgeEstimate { found: 1, tested: 4 });
        let p = model.motif_probability(Motif::Reciprocal, Pathway::InterneuronGranule).unwrap();
        assert!((p - 0.125).abs() < 1e-12);
    }
}
