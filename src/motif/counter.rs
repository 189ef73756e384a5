//! Motif enumeration over every k-subset of recorded cells.

use smallvec::{smallvec, SmallVec};

use super::{pattern, Motif, MotifCount, MotifOrder};
use crate::model::{ConnectivityMatrix, Pathway};

/// Node indices of one subset. Motif orders never exceed four.
pub type Subset = SmallVec<[usize; 4]>;

/// Lexicographic iterator over the k-subsets of `0..n`.
#[derive(Debug, Clone)]
pub struct Subsets {
    n: usize,
    current: Option<Subset>,
}

impl Subsets {
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Subsets {
    type Item = Subset;

    fn next(&mut self) -> Option<Subset> {
        let out = self.current.take()?;
        let k = out.len();
        let mut next = out.clone();
        // rightmost index that can still move
        let mut i = k;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in (i + 1)..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                return Some(out);
            }
        }
        Some(out)
    }
}

/// Per-subset scratch tally, committed to the accumulator once the subset
/// has been fully evaluated.
#[derive(Default)]
struct SubsetTally {
    entries: SmallVec<[(Motif, Pathway, u64, u64); 16]>,
}

impl SubsetTally {
    fn bump(&mut self, motif: Motif, pathway: Pathway, hit: bool) {
        let hit = u64::from(hit);
        match self.entries.iter_mut().find(|(m, p, _, _)| *m == motif && *p == pathway) {
            Some(entry) => {
                entry.2 += hit;
                entry.3 += 1;
            }
            None => self.entries.push((motif, pathway, hit, 1)),
        }
    }

    fn commit(self, acc: &mut MotifCount) {
        for (motif, pathway, found, tested) in self.entries {
            acc.observe(motif, pathway, found, tested);
        }
    }
}

/// Counts motifs of the configured orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifCounter {
    orders: SmallVec<[MotifOrder; 3]>,
}

impl MotifCounter {
    pub fn new(orders: &[MotifOrder]) -> Self {
        let mut orders: SmallVec<[MotifOrder; 3]> = orders.iter().copied().collect();
        orders.sort();
        orders.dedup();
        Self { orders }
    }

    pub fn pairs() -> Self {
        Self { orders: smallvec![MotifOrder::Pair] }
    }

    pub fn triplets() -> Self {
        Self { orders: smallvec![MotifOrder::Triplet] }
    }

    pub fn quadruplets() -> Self {
        Self { orders: smallvec![MotifOrder::Quadruplet] }
    }

    pub fn all() -> Self {
        Self { orders: smallvec![MotifOrder::Pair, MotifOrder::Triplet, MotifOrder::Quadruplet] }
    }

    pub fn orders(&self) -> &[MotifOrder] {
        &self.orders
    }

    /// Count one matrix into a fresh accumulator. Orders larger than the
    /// matrix contribute nothing.
    pub fn count(&self, matrix: &ConnectivityMatrix) -> MotifCount {
        let mut acc = MotifCount::new();
        self.count_into(matrix, &mut acc);
        acc
    }

    pub fn count_into(&self, matrix: &ConnectivityMatrix, acc: &mut MotifCount) {
        for &order in &self.orders {
            for subset in Subsets::new(matrix.node_count(), order.size()) {
                let mut local = SubsetTally::default();
                match order {
                    MotifOrder::Pair => {
                        let (a, b) = (subset[0], subset[1]);
                        pair_motifs(matrix, a, b, &mut local);
                        let (first, second) = pattern::orient(matrix, a, b);
                        acc.record_pair(
                            matrix.pathway(first, second),
                            pattern::classify_pair(matrix, a, b),
                        );
                    }
                    MotifOrder::Triplet => {
                        triplet_motifs(matrix, [subset[0], subset[1], subset[2]], &mut local);
                    }
                    MotifOrder::Quadruplet => {
                        quadruplet_motifs(
                            matrix,
                            [subset[0], subset[1], subset[2], subset[3]],
                            &mut local,
                        );
                    }
                }
                local.commit(acc);
            }
        }
        acc.mark_matrix();
    }

    /// Fold many matrices into one fresh accumulator.
    pub fn count_all<'a, I>(&self, matrices: I) -> MotifCount
    where
        I: IntoIterator<Item = &'a ConnectivityMatrix>,
    {
        let mut acc = MotifCount::new();
        for matrix in matrices {
            self.count_into(matrix, &mut acc);
        }
        acc
    }
}

impl Default for MotifCounter {
    fn default() -> Self {
        Self::all()
    }
}

fn pair_motifs(m: &ConnectivityMatrix, a: usize, b: usize, local: &mut SubsetTally) {
    let (ab, ba) = (m.pathway(a, b), m.pathway(b, a));
    let undirected = ab.undirected();
    let coupled = pattern::electrical(m, a, b);
    let reciprocal = pattern::reciprocal(m, a, b);

    local.bump(Motif::Chemical, ab, pattern::chemical(m, a, b));
    local.bump(Motif::Chemical, ba, pattern::chemical(m, b, a));
    local.bump(Motif::Electrical, undirected, coupled);
    local.bump(Motif::Reciprocal, undirected, reciprocal);
    local.bump(Motif::ChemicalElectrical, ab, pattern::chemical_electrical(m, a, b));
    local.bump(Motif::ChemicalElectrical, ba, pattern::chemical_electrical(m, b, a));
    local.bump(Motif::ReciprocalElectrical, undirected, reciprocal && coupled);
}

fn triplet_motifs(m: &ConnectivityMatrix, nodes: [usize; 3], local: &mut SubsetTally) {
    let [a, b, c] = nodes;
    let homogeneous = m.label_of(a) == m.label_of(b) && m.label_of(b) == m.label_of(c);

    // pivot cell with its two leaves
    for (pivot, x, y) in [(a, b, c), (b, a, c), (c, a, b)] {
        if m.label_of(x) != m.label_of(y) {
            continue;
        }
        let inward = m.pathway(x, pivot);
        let outward = m.pathway(pivot, x);
        local.bump(Motif::Convergent, inward, pattern::convergent(m, x, y, pivot));
        local.bump(Motif::Divergent, outward, pattern::divergent(m, pivot, x, y));

        if homogeneous {
            local.bump(Motif::CoupledConvergent, inward, pattern::coupled_convergent(m, x, y, pivot));
            local.bump(Motif::ElectricalChain, inward, pattern::electrical_chain(m, x, pivot, y));
        }
    }

    if !homogeneous {
        return;
    }

    let recurrent = Pathway::recurrent(m.label_of(a));
    for (x, y, z) in [(a, b, c), (a, c, b), (b, a, c), (b, c, a), (c, a, b), (c, b, a)] {
        local.bump(Motif::Chain, recurrent, pattern::chain(m, x, y, z));
        local.bump(Motif::MixedChain, recurrent, pattern::mixed_chain(m, x, y, z));
    }
    local.bump(Motif::ElectricalTriangle, recurrent, pattern::electrical_triangle(m, a, b, c));
}

fn quadruplet_motifs(m: &ConnectivityMatrix, nodes: [usize; 4], local: &mut SubsetTally) {
    let [a, b, c, d] = nodes;
    // target cell with its three sources
    for (target, x, y, z) in [(a, b, c, d), (b, a, c, d), (c, a, b, d), (d, a, b, c)] {
        if m.label_of(x) != m.label_of(y) || m.label_of(y) != m.label_of(z) {
            continue;
        }
        local.bump(
            Motif::TripleConvergent,
            m.pathway(x, target),
            pattern::triple_convergent(m, x, y, z, target),
        );
    }
}
