//! Motif predicates over node subsets.
//!
//! Each function answers one yes/no question about the cells it is given.
//! Patterns are not exclusive: a subset may satisfy several at once and the
//! counter evaluates all of them.

use crate::model::{CellType, ConnectivityMatrix};

pub fn chemical(m: &ConnectivityMatrix, pre: usize, post: usize) -> bool {
    m.has_chemical(pre, post)
}

pub fn electrical(m: &ConnectivityMatrix, a: usize, b: usize) -> bool {
    m.has_electrical(a, b)
}

/// `a → b` and `b → a`.
pub fn reciprocal(m: &ConnectivityMatrix, a: usize, b: usize) -> bool {
    m.has_chemical(a, b) && m.has_chemical(b, a)
}

/// `pre → post` together with a gap junction between them.
pub fn chemical_electrical(m: &ConnectivityMatrix, pre: usize, post: usize) -> bool {
    m.has_chemical(pre, post) && m.has_electrical(pre, post)
}

pub fn reciprocal_electrical(m: &ConnectivityMatrix, a: usize, b: usize) -> bool {
    reciprocal(m, a, b) && m.has_electrical(a, b)
}

/// `a → target` and `b → target`.
pub fn convergent(m: &ConnectivityMatrix, a: usize, b: usize, target: usize) -> bool {
    m.has_chemical(a, target) && m.has_chemical(b, target)
}

/// `source → a` and `source → b`.
pub fn divergent(m: &ConnectivityMatrix, source: usize, a: usize, b: usize) -> bool {
    m.has_chemical(source, a) && m.has_chemical(source, b)
}

/// `a → b → c` without the shortcut `a → c`.
pub fn chain(m: &ConnectivityMatrix, a: usize, b: usize, c: usize) -> bool {
    m.has_chemical(a, b) && m.has_chemical(b, c) && !m.has_chemical(a, c)
}

/// Convergence onto `target` by two electrically coupled cells.
pub fn coupled_convergent(m: &ConnectivityMatrix, a: usize, b: usize, target: usize) -> bool {
    convergent(m, a, b, target) && m.has_electrical(a, b)
}

/// `a – hub – c` gap junctions without `a – c`.
pub fn electrical_chain(m: &ConnectivityMatrix, a: usize, hub: usize, c: usize) -> bool {
    m.has_electrical(a, hub) && m.has_electrical(hub, c) && !m.has_electrical(a, c)
}

pub fn electrical_triangle(m: &ConnectivityMatrix, a: usize, b: usize, c: usize) -> bool {
    m.has_electrical(a, b) && m.has_electrical(b, c) && m.has_electrical(a, c)
}

/// `a → target`, `b → target` and `c → target`.
pub fn triple_convergent(m: &ConnectivityMatrix, a: usize, b: usize, c: usize, target: usize) -> bool {
    convergent(m, a, b, target) && m.has_chemical(c, target)
}

/// `a → b` chemical followed by a `b – c` gap junction.
pub fn mixed_chain(m: &ConnectivityMatrix, a: usize, b: usize, c: usize) -> bool {
    m.has_chemical(a, b) && m.has_electrical(b, c)
}

// ============================================================================
// Exclusive pair classification
// ============================================================================

/// The single class an unordered pair falls into. Unlike motifs these are
/// mutually exclusive and cover every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairClass {
    Unconnected,
    /// Chemical from the first cell to the second only.
    Forward,
    /// Chemical from the second cell to the first only.
    Backward,
    /// Chemical both ways, no gap junction.
    Reciprocal,
    /// Gap junction, no chemical synapse.
    Electrical,
    /// Gap junction plus at least one chemical synapse.
    Both,
}

/// Orient a pair: the interneuron comes first in mixed pairs, otherwise the
/// lower index does.
pub fn orient(m: &ConnectivityMatrix, a: usize, b: usize) -> (usize, usize) {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    match (m.label_of(low), m.label_of(high)) {
        (CellType::GranuleCell, CellType::Interneuron) => (high, low),
        _ => (low, high),
    }
}

pub fn classify_pair(m: &ConnectivityMatrix, a: usize, b: usize) -> PairClass {
    let (first, second) = orient(m, a, b);
    let forward = m.has_chemical(first, second);
    let backward = m.has_chemical(second, first);
    match (m.has_electrical(first, second), forward, backward) {
        (true, false, false) => PairClass::Electrical,
        (true, _, _) => PairClass::Both,
        (false, true, true) => PairClass::Reciprocal,
        (false, true, false) => PairClass::Forward,
        (false, false, true) => PairClass::Backward,
        (false, false, false) => PairClass::Unconnected,
    }
}
