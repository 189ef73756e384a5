//! Analysis configuration.
//!
//! Everything an analysis run needs beyond the matrices themselves. All
//! fields have defaults, so a JSON document only names what it changes:
//!
//! ```json
//! { "alpha": 0.01, "method": "monte_carlo", "simulation": { "iterations": 500, "seed": 3 } }
//! ```
//!
//! A distance-dependent null model is configured under the simulation:
//!
//! ```json
//! { "simulation": { "distance_model": {
//!     "chemical":   { "amplitude": 0.6, "midpoint": 80.0, "rate": 20.0 },
//!     "electrical": { "amplitude": 0.9, "midpoint": 60.0, "rate": 15.0 } } } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::motif::{CensusMode, Motif};
use crate::stats::{DistanceModel, HypothesisTester};
use crate::{Error, Result};

/// Which null distribution p-values are computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullTest {
    /// Exact binomial, normal approximation above the exact limit.
    #[default]
    Binomial,
    /// Upper tail of simulated null datasets.
    MonteCarlo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub iterations: usize,
    /// Fixed seed for reproducible runs; fresh entropy when absent.
    pub seed: Option<u64>,
    /// Draw edges by inter-somatic distance for recordings with `.dist`
    /// files. Uniform pooled probabilities otherwise.
    pub distance_model: Option<DistanceModel>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { iterations: 1000, seed: None, distance_model: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level.
    pub alpha: f64,
    /// Largest trial count still tested exactly.
    pub exact_limit: u64,
    pub census_mode: CensusMode,
    pub method: NullTest,
    pub simulation: SimulationConfig,
    /// Motifs to report, in report order.
    pub motifs: Vec<Motif>,
    /// Bin width for distance profiles, in the unit of the `.dist` files.
    pub distance_bin_width: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: HypothesisTester::DEFAULT_ALPHA,
            exact_limit: HypothesisTester::DEFAULT_EXACT_LIMIT,
            census_mode: CensusMode::default(),
            method: NullTest::default(),
            simulation: SimulationConfig::default(),
            motifs: Motif::ALL.to_vec(),
            distance_bin_width: 50.0,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::Config(format!("alpha {} must lie in (0, 1)", self.alpha)));
        }
        if self.exact_limit == 0 {
            return Err(Error::Config("exact_limit must be at least 1".into()));
        }
        if self.method == NullTest::MonteCarlo && self.simulation.iterations == 0 {
            return Err(Error::Config(
                "monte carlo testing needs at least one simulation iteration".into(),
            ));
        }
        if let Some(model) = &self.simulation.distance_model {
            model.validate()?;
        }
        if !(self.distance_bin_width.is_finite() && self.distance_bin_width > 0.0) {
            return Err(Error::Config(format!(
                "distance_bin_width {} must be positive",
                self.distance_bin_width
            )));
        }
        if self.motifs.is_empty() {
            return Err(Error::Config("no motifs selected".into()));
        }
        Ok(())
    }

    pub fn tester(&self) -> Result<HypothesisTester> {
        HypothesisTester::new(self.alpha, self.exact_limit)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_exact_limit(mut self, limit: u64) -> Self {
        self.exact_limit = limit;
        self
    }

    pub fn with_census_mode(mut self, mode: CensusMode) -> Self {
        self.census_mode = mode;
        self
    }

    pub fn with_motifs(mut self, motifs: impl IntoIterator<Item = Motif>) -> Self {
        self.motifs = motifs.into_iter().collect();
        self
    }

    /// Switch to Monte Carlo testing.
    pub fn with_simulation(mut self, iterations: usize, seed: Option<u64>) -> Self {
        self.method = NullTest::MonteCarlo;
        self.simulation.iterations = iterations;
        self.simulation.seed = seed;
        self
    }

    /// Simulate recordings with distances from a distance-dependent model.
    pub fn with_distance_model(mut self, model: DistanceModel) -> Self {
        self.simulation.distance_model = Some(model);
        self
    }
}
