//! Monte Carlo sampling from the null model.
//!
//! Each iteration redraws every recording with the same size and cell
//! labels, placing each potential synapse independently with the
//! probability the null model assigns to its channel and pathway. The
//! resulting motif counts form the simulated null distribution.
//!
//! Recordings that carry inter-somatic distances can instead draw edges
//! from a [`DistanceModel`]: a sigmoid of distance per channel, applied to
//! the pathways the model names.

use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::NullModel;
use crate::config::SimulationConfig;
use crate::loader::Recording;
use crate::model::{ConnectivityMatrix, DistanceMatrix, EdgeType, Pathway};
use crate::motif::{Motif, MotifCounter};
use crate::{Error, Result};

// ============================================================================
// Distance-dependent edge probabilities
// ============================================================================

/// `amplitude / (1 + exp((d - midpoint) / rate))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmoidParams {
    /// Connection probability approached at short distances, in `[0, 1]`.
    pub amplitude: f64,
    /// Distance at which the probability falls to half the amplitude.
    pub midpoint: f64,
    pub rate: f64,
}

impl SigmoidParams {
    pub fn probability(&self, distance: f64) -> f64 {
        let p = self.amplitude / (1.0 + ((distance - self.midpoint) / self.rate).exp());
        p.clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(Error::Config(format!(
                "sigmoid amplitude {} must lie in [0, 1]",
                self.amplitude
            )));
        }
        if !self.midpoint.is_finite() {
            return Err(Error::Config("sigmoid midpoint must be finite".into()));
        }
        if !(self.rate.is_finite() && self.rate != 0.0) {
            return Err(Error::Config(format!("sigmoid rate {} must be non-zero", self.rate)));
        }
        Ok(())
    }
}

fn interneuron_pathways() -> Vec<Pathway> {
    vec![Pathway::InterneuronInterneuron]
}

/// Per-channel sigmoids of distance. Pathways not listed keep the pooled
/// null-model probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceModel {
    pub chemical: SigmoidParams,
    pub electrical: SigmoidParams,
    #[serde(default = "interneuron_pathways")]
    pub pathways: Vec<Pathway>,
}

impl DistanceModel {
    pub fn new(chemical: SigmoidParams, electrical: SigmoidParams) -> Self {
        Self { chemical, electrical, pathways: interneuron_pathways() }
    }

    pub fn validate(&self) -> Result<()> {
        self.chemical.validate()?;
        self.electrical.validate()
    }

    /// Sigmoid for a channel in a pathway, `None` when the pathway is not
    /// modelled by distance.
    pub fn params(&self, edge_type: EdgeType, pathway: Pathway) -> Option<&SigmoidParams> {
        match edge_type {
            EdgeType::Chemical => self.pathways.contains(&pathway).then_some(&self.chemical),
            EdgeType::Electrical => self
                .pathways
                .iter()
                .any(|p| p.undirected() == pathway.undirected())
                .then_some(&self.electrical),
        }
    }
}

// ============================================================================
// Random matrices
// ============================================================================

fn edge_probability(null: &NullModel, edge_type: EdgeType, pathway: Pathway) -> f64 {
    // pathways never observed cannot carry edges in the null either
    null.probability_in(edge_type, pathway).unwrap_or(0.0)
}

/// Draw a matrix shaped like `template`, asking `probability` for every
/// chemical `(i, j)` and every electrical `(i, j)` with `i < j`.
fn draw<R, F>(template: &ConnectivityMatrix, rng: &mut R, mut probability: F) -> Result<ConnectivityMatrix>
where
    R: Rng + ?Sized,
    F: FnMut(EdgeType, usize, usize) -> f64,
{
    let n = template.node_count();
    let mut rows = vec![vec![0i64; n]; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if rng.r#gen::<f64>() < probability(EdgeType::Chemical, i, j) {
                rows[i][j] |= 1;
            }
            if i < j && rng.r#gen::<f64>() < probability(EdgeType::Electrical, i, j) {
                rows[i][j] |= 2;
            }
        }
    }

    ConnectivityMatrix::from_rows(rows, template.labels().to_vec())
}

/// Draw one matrix shaped like `template`. Gap junctions are written as a
/// single mark in the upper triangle.
pub fn random_matrix<R: Rng + ?Sized>(
    template: &ConnectivityMatrix,
    null: &NullModel,
    rng: &mut R,
) -> Result<ConnectivityMatrix> {
    draw(template, rng, |edge_type, i, j| {
        edge_probability(null, edge_type, template.pathway(i, j))
    })
}

/// Like [`random_matrix`], but pairs in the pathways of `model` connect
/// with the sigmoid probability of their distance.
pub fn random_matrix_with_distances<R: Rng + ?Sized>(
    template: &ConnectivityMatrix,
    distances: &DistanceMatrix,
    null: &NullModel,
    model: &DistanceModel,
    rng: &mut R,
) -> Result<ConnectivityMatrix> {
    if distances.node_count() != template.node_count() {
        return Err(Error::InvalidMatrix(format!(
            "distance matrix has {} cells, connectivity matrix has {}",
            distances.node_count(),
            template.node_count()
        )));
    }
    draw(template, rng, |edge_type, i, j| {
        let pathway = template.pathway(i, j);
        match model.params(edge_type, pathway) {
            Some(sigmoid) => sigmoid.probability(distances.distance(i, j)),
            None => edge_probability(null, edge_type, pathway),
        }
    })
}

// ============================================================================
// Simulated distribution
// ============================================================================

/// Simulated found counts of one (motif, pathway).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub motif: Motif,
    pub pathway: Pathway,
    pub samples: Vec<u64>,
}

/// Serialized form of a [`SimulatedDistribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRows {
    pub iterations: usize,
    pub samples: Vec<SampleRow>,
}

/// Found counts per (motif, pathway), one sample per iteration.
/// Serializes as rows sorted by motif, then pathway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "DistributionRows", from = "DistributionRows")]
pub struct SimulatedDistribution {
    pub iterations: usize,
    samples: HashMap<(Motif, Pathway), Vec<u64>>,
}

impl SimulatedDistribution {
    pub fn samples(&self, motif: Motif, pathway: Pathway) -> Option<&[u64]> {
        self.samples.get(&(motif, pathway)).map(Vec::as_slice)
    }

    pub fn mean(&self, motif: Motif, pathway: Pathway) -> Option<f64> {
        let samples = self.samples(motif, pathway)?;
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<u64>() as f64 / samples.len() as f64)
    }

    /// Population standard deviation of the simulated counts.
    pub fn std(&self, motif: Motif, pathway: Pathway) -> Option<f64> {
        let mean = self.mean(motif, pathway)?;
        let samples = self.samples(motif, pathway)?;
        let var = samples
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;
        Some(var.sqrt())
    }

    pub fn keys(&self) -> Vec<(Motif, Pathway)> {
        let mut keys: Vec<_> = self.samples.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn rows(&self) -> Vec<SampleRow> {
        self.keys()
            .into_iter()
            .map(|(motif, pathway)| SampleRow {
                motif,
                pathway,
                samples: self.samples.get(&(motif, pathway)).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

impl From<SimulatedDistribution> for DistributionRows {
    fn from(dist: SimulatedDistribution) -> Self {
        Self { iterations: dist.iterations, samples: dist.rows() }
    }
}

impl From<DistributionRows> for SimulatedDistribution {
    fn from(rows: DistributionRows) -> Self {
        let samples = rows
            .samples
            .into_iter()
            .map(|row| ((row.motif, row.pathway), row.samples))
            .collect();
        Self { iterations: rows.iterations, samples }
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Simulate `config.iterations` null datasets shaped like `templates`.
pub fn simulate(
    templates: &[ConnectivityMatrix],
    null: &NullModel,
    config: &SimulationConfig,
) -> Result<SimulatedDistribution> {
    let shapes: Vec<(&ConnectivityMatrix, Option<&DistanceMatrix>)> =
        templates.iter().map(|m| (m, None)).collect();
    run(&shapes, null, config)
}

/// Simulate datasets shaped like `recordings`. When the configuration
/// carries a distance model, recordings with distances draw from it.
pub fn simulate_recordings(
    recordings: &[Recording],
    null: &NullModel,
    config: &SimulationConfig,
) -> Result<SimulatedDistribution> {
    let shapes: Vec<(&ConnectivityMatrix, Option<&DistanceMatrix>)> = recordings
        .iter()
        .map(|r| (&r.matrix, r.distances.as_ref()))
        .collect();
    run(&shapes, null, config)
}

fn run(
    shapes: &[(&ConnectivityMatrix, Option<&DistanceMatrix>)],
    null: &NullModel,
    config: &SimulationConfig,
) -> Result<SimulatedDistribution> {
    if config.iterations == 0 {
        return Err(Error::InvalidArgument("simulation needs at least one iteration".into()));
    }
    if shapes.is_empty() {
        return Err(Error::InsufficientData {
            subject: "null-model simulation".into(),
        });
    }
    if let Some(model) = &config.distance_model {
        model.validate()?;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        iterations = config.iterations,
        recordings = shapes.len(),
        with_distances = shapes.iter().filter(|(_, d)| d.is_some()).count(),
        distance_model = config.distance_model.is_some(),
        seed = ?config.seed,
        "simulating null model"
    );

    let counter = MotifCounter::all();
    let mut dist = SimulatedDistribution {
        iterations: config.iterations,
        samples: HashMap::new(),
    };

    for iteration in 0..config.iterations {
        let mut drawn = Vec::with_capacity(shapes.len());
        for &(template, distances) in shapes {
            let matrix = match (&config.distance_model, distances) {
                (Some(model), Some(distances)) => {
                    random_matrix_with_distances(template, distances, null, model, &mut rng)?
                }
                _ => random_matrix(template, null, &mut rng)?,
            };
            drawn.push(matrix);
        }
        let count = counter.count_all(&drawn);
        for (motif, pathway, tally) in count.iter() {
            dist.samples.entry((motif, pathway)).or_default().push(tally.found);
        }
        if (iteration + 1) % 100 == 0 {
            debug!(done = iteration + 1, "simulation progress");
        }
    }

    Ok(dist)
}
