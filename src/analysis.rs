//! End-to-end analysis: count, estimate, test.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AnalysisConfig, NullTest};
use crate::loader::{DatasetSummary, Recording};
use crate::model::{ConnectivityMatrix, Pathway};
use crate::motif::{Motif, MotifCount, MotifCounter};
use crate::report::{census_rows, CensusRow};
use crate::stats::{
    simulate, simulate_recordings, BinomialTest, DistanceProfile, HypothesisTester, NullModel,
    SimulatedDistribution, TestResult,
};
use crate::{Error, Result};

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: DatasetSummary,
    #[serde(skip)]
    pub counts: MotifCount,
    /// Pair census in the configured census mode.
    pub census: Vec<CensusRow>,
    pub null_model: NullModel,
    pub results: Vec<TestResult>,
    pub simulation: Option<SimulatedDistribution>,
    /// Distance profiles, only when recordings carried `.dist` files.
    pub profiles: Vec<DistanceProfile>,
}

impl AnalysisReport {
    pub fn result(&self, motif: Motif, pathway: Pathway) -> Option<&TestResult> {
        self.results.iter().find(|r| r.motif == motif && r.pathway == pathway)
    }

    /// Results that reject the null hypothesis.
    pub fn significant(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.is_significant() == Some(true))
    }
}

/// An analysis run over matrices recorded under one condition.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Count every motif order over the matrices.
    pub fn count(&self, matrices: &[ConnectivityMatrix]) -> MotifCount {
        MotifCounter::all().count_all(matrices)
    }

    pub fn run(&self, matrices: &[ConnectivityMatrix]) -> Result<AnalysisReport> {
        self.run_with(matrices, None)
    }

    /// Run on loaded recordings, adding distance profiles where available.
    /// Monte Carlo runs draw recordings with distances from the configured
    /// distance model, if any.
    pub fn run_recordings(&self, recordings: &[Recording]) -> Result<AnalysisReport> {
        let matrices: Vec<ConnectivityMatrix> = recordings.iter().map(|r| r.matrix.clone()).collect();
        let mut report = self.run_with(&matrices, Some(recordings))?;

        if recordings.iter().any(|r| r.distances.is_some()) {
            for (edge_type, pathway, _) in report.null_model.estimates() {
                let profile = DistanceProfile::from_recordings(
                    recordings,
                    edge_type,
                    pathway,
                    self.config.distance_bin_width,
                )?;
                if profile.tested() > 0 {
                    debug!(%edge_type, %pathway, bins = profile.bins.len(), "distance profile");
                    report.profiles.push(profile);
                }
            }
        }
        Ok(report)
    }

    fn run_with(
        &self,
        matrices: &[ConnectivityMatrix],
        recordings: Option<&[Recording]>,
    ) -> Result<AnalysisReport> {
        self.config.validate()?;
        let tester = self.config.tester()?;
        if matrices.is_empty() {
            return Err(Error::InsufficientData { subject: "analysis".into() });
        }

        // Phase 1: Count
        let counts = self.count(matrices);

        // Phase 2: Estimate
        let null_model = NullModel::from_counts(&counts);

        // Phase 3: Simulate (Monte Carlo only)
        let simulation = match (self.config.method, recordings) {
            (NullTest::MonteCarlo, Some(recordings)) => {
                Some(simulate_recordings(recordings, &null_model, &self.config.simulation)?)
            }
            (NullTest::MonteCarlo, None) => {
                Some(simulate(matrices, &null_model, &self.config.simulation)?)
            }
            (NullTest::Binomial, _) => None,
        };

        // Phase 4: Test
        let mut results = Vec::new();
        for &motif in &self.config.motifs {
            for pathway in counts.pathways() {
                if !motif.applies_to(pathway) {
                    continue;
                }
                let tally = counts.tally(motif, pathway);
                let expected = (tally.tested > 0)
                    .then(|| null_model.expected(motif, pathway, tally.tested).ok())
                    .flatten();
                let attempt = test_motif(&tester, &counts, &null_model, simulation.as_ref(), motif, pathway);
                results.push(TestResult::from_attempt(
                    motif,
                    pathway,
                    tally.found,
                    tally.tested,
                    expected,
                    attempt,
                )?);
            }
        }

        let summary = DatasetSummary::from_matrices(matrices);
        info!(
            matrices = counts.matrices(),
            interneurons = summary.interneurons,
            granule_cells = summary.granule_cells,
            tests = results.len(),
            significant = results.iter().filter(|r| r.is_significant() == Some(true)).count(),
            "analysis finished"
        );

        Ok(AnalysisReport {
            summary,
            census: census_rows(&counts, self.config.census_mode),
            counts,
            null_model,
            results,
            simulation,
            profiles: Vec::new(),
        })
    }
}

/// Test one (motif, pathway) against the null model, or against simulated
/// samples when a simulation is given.
pub fn test_motif(
    tester: &HypothesisTester,
    counts: &MotifCount,
    null: &NullModel,
    simulation: Option<&SimulatedDistribution>,
    motif: Motif,
    pathway: Pathway,
) -> Result<BinomialTest> {
    let tally = counts.tally(motif, pathway);
    if tally.tested == 0 {
        return Err(Error::InsufficientData {
            subject: format!("{motif} in {pathway}"),
        });
    }
    let probability = null.motif_probability(motif, pathway)?;

    match simulation.and_then(|sim| sim.samples(motif, pathway)) {
        Some(samples) => tester.test_simulated(tally.found, tally.tested, probability, samples),
        None => tester.test(tally.found, tally.tested, probability),
    }
}
