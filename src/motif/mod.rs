//! # Connectivity Motifs
//!
//! Named structural patterns over pairs and triplets of recorded cells,
//! the tallies they produce, and the counter that enumerates them.
//!
//! A tally keeps two numbers per (motif, pathway): how often the pattern was
//! `found` and how often it was `tested` (the opportunities for it to
//! occur). Their ratio is the observed motif rate; `tested` is also the
//! number of Bernoulli trials the null model reasons about.

pub mod pattern;
pub mod census;
pub mod counter;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{Pathway, PopulationSizes};
use crate::{Error, Result};

pub use census::{CensusMode, PairCensus};
pub use counter::{MotifCounter, Subsets};
pub use pattern::PairClass;

// ============================================================================
// Motif order
// ============================================================================

/// Number of cells a motif spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifOrder {
    Pair,
    Triplet,
    /// Three cells onto a fourth.
    Quadruplet,
}

impl MotifOrder {
    pub fn size(self) -> usize {
        match self {
            MotifOrder::Pair => 2,
            MotifOrder::Triplet => 3,
            MotifOrder::Quadruplet => 4,
        }
    }
}

impl TryFrom<usize> for MotifOrder {
    type Error = Error;

    fn try_from(k: usize) -> Result<Self> {
        match k {
            2 => Ok(MotifOrder::Pair),
            3 => Ok(MotifOrder::Triplet),
            4 => Ok(MotifOrder::Quadruplet),
            other => Err(Error::InvalidArgument(format!(
                "motif order {other} is not supported; use 2, 3 or 4"
            ))),
        }
    }
}

// ============================================================================
// Motif
// ============================================================================

/// Motif tags. See `pattern` for the predicate behind each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motif {
    Chemical,
    Electrical,
    Reciprocal,
    ChemicalElectrical,
    ReciprocalElectrical,
    Convergent,
    Divergent,
    Chain,
    CoupledConvergent,
    ElectricalChain,
    ElectricalTriangle,
    MixedChain,
    /// Three same-type cells converging on one target.
    TripleConvergent,
}

impl Motif {
    pub const ALL: [Motif; 13] = [
        Motif::Chemical,
        Motif::Electrical,
        Motif::Reciprocal,
        Motif::ChemicalElectrical,
        Motif::ReciprocalElectrical,
        Motif::Convergent,
        Motif::Divergent,
        Motif::Chain,
        Motif::CoupledConvergent,
        Motif::ElectricalChain,
        Motif::ElectricalTriangle,
        Motif::MixedChain,
        Motif::TripleConvergent,
    ];

    pub fn order(self) -> MotifOrder {
        match self {
            Motif::Chemical
            | Motif::Electrical
            | Motif::Reciprocal
            | Motif::ChemicalElectrical
            | Motif::ReciprocalElectrical => MotifOrder::Pair,
            Motif::TripleConvergent => MotifOrder::Quadruplet,
            _ => MotifOrder::Triplet,
        }
    }

    /// Short tag used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Motif::Chemical => "chem",
            Motif::Electrical => "elec",
            Motif::Reciprocal => "c2",
            Motif::ChemicalElectrical => "c1e",
            Motif::ReciprocalElectrical => "c2e",
            Motif::Convergent => "con",
            Motif::Divergent => "div",
            Motif::Chain => "lin",
            Motif::CoupledConvergent => "con_e",
            Motif::ElectricalChain => "elec_lin",
            Motif::ElectricalTriangle => "elec_tri",
            Motif::MixedChain => "chem_elec_lin",
            Motif::TripleConvergent => "con3",
        }
    }

    /// Most opportunities one node subset can offer within a single pathway.
    pub fn per_subset(self) -> u64 {
        match self {
            Motif::Chemical | Motif::ChemicalElectrical => 2,
            Motif::Electrical | Motif::Reciprocal | Motif::ReciprocalElectrical => 1,
            Motif::Convergent
            | Motif::Divergent
            | Motif::CoupledConvergent
            | Motif::ElectricalChain => 3,
            Motif::Chain | Motif::MixedChain => 6,
            Motif::ElectricalTriangle => 1,
            Motif::TripleConvergent => 4,
        }
    }

    /// Whether the motif is tallied under an undirected pathway key.
    pub fn is_undirected(self) -> bool {
        matches!(
            self,
            Motif::Electrical | Motif::Reciprocal | Motif::ReciprocalElectrical
        )
    }

    /// Number of opportunities for this motif in one recording with the
    /// given population sizes. Agrees with what `MotifCounter` tests.
    /// Saturates at `u64::MAX`.
    pub fn opportunities(self, pathway: Pathway, sizes: PopulationSizes) -> u64 {
        let pre = sizes.of(pathway.pre());
        let post = sizes.of(pathway.post());

        if pathway.is_recurrent() {
            let n = pre;
            return match self {
                Motif::Chemical | Motif::ChemicalElectrical => n.saturating_mul(n.saturating_sub(1)),
                Motif::Electrical | Motif::Reciprocal | Motif::ReciprocalElectrical => choose(n, 2),
                Motif::Convergent
                | Motif::Divergent
                | Motif::CoupledConvergent
                | Motif::ElectricalChain => choose(n, 3).saturating_mul(3),
                Motif::Chain | Motif::MixedChain => choose(n, 3).saturating_mul(6),
                Motif::ElectricalTriangle => choose(n, 3),
                Motif::TripleConvergent => choose(n, 4).saturating_mul(4),
            };
        }

        match self {
            Motif::Chemical | Motif::ChemicalElectrical => pre.saturating_mul(post),
            m if m.is_undirected() => {
                if pathway.undirected() == pathway { pre.saturating_mul(post) } else { 0 }
            }
            Motif::Convergent => post.saturating_mul(choose(pre, 2)),
            Motif::Divergent => pre.saturating_mul(choose(post, 2)),
            Motif::TripleConvergent => post.saturating_mul(choose(pre, 3)),
            _ => 0,
        }
    }

    /// Whether the motif is ever tallied under `pathway`.
    pub fn applies_to(self, pathway: Pathway) -> bool {
        self.opportunities(pathway, PopulationSizes::new(4, 4)) > 0
    }
}

impl std::fmt::Display for Motif {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binomial coefficient, saturating at `u64::MAX`.
pub fn choose(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is divisible by i + 1: it is (i + 1) * C(n, i + 1)
        acc = match acc.checked_mul(u128::from(n - i)) {
            Some(product) => product / u128::from(i + 1),
            None => return u64::MAX,
        };
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

// ============================================================================
// Tally
// ============================================================================

/// Found / tested counts for one (motif, pathway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub found: u64,
    pub tested: u64,
    /// Node subsets that contributed at least one opportunity.
    pub subsets: u64,
}

impl Tally {
    pub fn new(found: u64, tested: u64, subsets: u64) -> Self {
        Self { found, tested, subsets }
    }

    /// Observed rate, `None` when nothing was tested.
    pub fn rate(&self) -> Option<f64> {
        (self.tested > 0).then(|| self.found as f64 / self.tested as f64)
    }
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.found += rhs.found;
        self.tested += rhs.tested;
        self.subsets += rhs.subsets;
    }
}

// ============================================================================
// MotifCount (the accumulator)
// ============================================================================

/// Aggregated motif tallies and pair census for one or more matrices.
///
/// Summing counts is commutative and associative; build a fresh value per
/// analysis run and fold matrices into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotifCount {
    tallies: HashMap<(Motif, Pathway), Tally>,
    census: HashMap<Pathway, PairCensus>,
    matrices: usize,
}

impl MotifCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one subset's contribution to a tally.
    pub fn observe(&mut self, motif: Motif, pathway: Pathway, found: u64, tested: u64) {
        *self.tallies.entry((motif, pathway)).or_default() += Tally::new(found, tested, 1);
    }

    pub fn record_pair(&mut self, pathway: Pathway, class: PairClass) {
        self.census.entry(pathway).or_default().record(class);
    }

    pub(crate) fn mark_matrix(&mut self) {
        self.matrices += 1;
    }

    /// Number of matrices folded into this count.
    pub fn matrices(&self) -> usize {
        self.matrices
    }

    pub fn get(&self, motif: Motif, pathway: Pathway) -> Option<&Tally> {
        self.tallies.get(&(motif, pathway))
    }

    /// Tally for a key, zero when never observed.
    pub fn tally(&self, motif: Motif, pathway: Pathway) -> Tally {
        self.get(motif, pathway).copied().unwrap_or_default()
    }

    pub fn found(&self, motif: Motif, pathway: Pathway) -> u64 {
        self.tally(motif, pathway).found
    }

    pub fn tested(&self, motif: Motif, pathway: Pathway) -> u64 {
        self.tally(motif, pathway).tested
    }

    /// Sum of one motif over every pathway.
    pub fn total(&self, motif: Motif) -> Tally {
        let mut sum = Tally::default();
        for ((m, _), tally) in &self.tallies {
            if *m == motif {
                sum += *tally;
            }
        }
        sum
    }

    pub fn census(&self, pathway: Pathway) -> PairCensus {
        self.census.get(&pathway).copied().unwrap_or_default()
    }

    /// Census summed over every pathway.
    pub fn census_total(&self) -> PairCensus {
        let mut sum = PairCensus::default();
        for census in self.census.values() {
            sum += *census;
        }
        sum
    }

    /// All tallies sorted by motif, then pathway.
    pub fn iter(&self) -> Vec<(Motif, Pathway, Tally)> {
        let mut out: Vec<_> = self
            .tallies
            .iter()
            .map(|(&(motif, pathway), &tally)| (motif, pathway, tally))
            .collect();
        out.sort_by_key(|&(motif, pathway, _)| (motif, pathway));
        out
    }

    /// Pathways that offered at least one pair.
    pub fn pathways(&self) -> Vec<Pathway> {
        let mut out: Vec<_> = self
            .tallies
            .iter()
            .filter(|(_, t)| t.tested > 0)
            .map(|(&(_, p), _)| p)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty() && self.census.is_empty()
    }

    pub fn merge(&mut self, other: &MotifCount) {
        for (key, tally) in &other.tallies {
            *self.tallies.entry(*key).or_default() += *tally;
        }
        for (pathway, census) in &other.census {
            *self.census.entry(*pathway).or_default() += *census;
        }
        self.matrices += other.matrices;
    }
}

impl std::ops::AddAssign<&MotifCount> for MotifCount {
    fn add_assign(&mut self, rhs: &MotifCount) {
        self.merge(rhs);
    }
}

impl std::ops::AddAssign for MotifCount {
    fn add_assign(&mut self, rhs: MotifCount) {
        self.merge(&rhs);
    }
}

impl std::ops::Add for MotifCount {
    type Output = MotifCount;

    fn add(mut self, rhs: MotifCount) -> MotifCount {
        self.merge(&rhs);
        self
    }
}

impl std::iter::Sum for MotifCount {
    fn sum<I: Iterator<Item = MotifCount>>(iter: I) -> Self {
        iter.fold(MotifCount::new(), |acc, count| acc + count)
    }
}
