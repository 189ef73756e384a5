//! Validated connectivity matrix.
//!
//! Entry `(i, j)` describes the connection from cell `i` (presynaptic row)
//! onto cell `j` (postsynaptic column). Chemical synapses are directional.
//! Electrical synapses are not: recordings mark a gap junction either once
//! (on one of the two positions) or twice (on both), and every query here
//! answers the same way for both encodings.

use serde::Serialize;

use super::{CellType, Pathway, Synapse};
use crate::{Error, Result};

/// How gap junctions were marked in the source matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricalEncoding {
    /// No electrical synapse present; the convention cannot be observed.
    None,
    /// Every gap junction is marked on exactly one of its two positions.
    SingleMark,
    /// Every gap junction is marked on both positions.
    DoubleMark,
    /// Both conventions occur in the same matrix. Flagged at load time.
    Mixed,
}

impl ElectricalEncoding {
    fn observe(self, double: bool) -> Self {
        let seen = if double { Self::DoubleMark } else { Self::SingleMark };
        match self {
            Self::None => seen,
            current if current == seen => current,
            _ => Self::Mixed,
        }
    }

    pub fn is_ambiguous(self) -> bool {
        self == Self::Mixed
    }
}

/// Square synapse matrix with one cell type label per row.
///
/// Immutable after construction; every constructor validates that the matrix
/// is non-empty, square, free of self-synapses and made of codes 0..=3.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityMatrix {
    size: usize,
    labels: Vec<CellType>,
    /// Row-major codes as recorded.
    codes: Vec<Synapse>,
    /// Row-major, symmetric gap junction flags.
    electrical: Vec<bool>,
    encoding: ElectricalEncoding,
}

impl ConnectivityMatrix {
    /// Build a matrix from raw rows and one label per cell.
    pub fn from_rows(rows: Vec<Vec<i64>>, labels: Vec<CellType>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(Error::InvalidMatrix("matrix is empty".into()));
        }
        if labels.len() != size {
            return Err(Error::InvalidMatrix(format!(
                "{} labels given for a {size}x{size} matrix",
                labels.len()
            )));
        }

        let mut codes = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidMatrix(format!(
                    "row {i} has {} entries but the matrix has {size} rows; matrix must be square",
                    row.len()
                )));
            }
            for (j, &raw) in row.iter().enumerate() {
                let code = Synapse::try_from(raw).map_err(|_| {
                    Error::InvalidMatrix(format!(
                        "entry ({i}, {j}) is {raw}; expected one of 0, 1, 2, 3"
                    ))
                })?;
                if i == j && code != Synapse::None {
                    return Err(Error::InvalidMatrix(format!(
                        "diagonal entry ({i}, {i}) is {raw}; self-synapses are not allowed"
                    )));
                }
                codes.push(code);
            }
        }

        let mut electrical = vec![false; size * size];
        let mut encoding = ElectricalEncoding::None;
        for i in 0..size {
            for j in (i + 1)..size {
                let forward = codes[i * size + j].is_electrical();
                let backward = codes[j * size + i].is_electrical();
                if forward || backward {
                    electrical[i * size + j] = true;
                    electrical[j * size + i] = true;
                    encoding = encoding.observe(forward && backward);
                }
            }
        }

        Ok(Self { size, labels, codes, electrical, encoding })
    }

    /// Rows follow the `.syn` convention: the first `n_interneurons` cells
    /// are interneurons, the rest granule cells.
    pub fn with_interneurons(rows: Vec<Vec<i64>>, n_interneurons: usize) -> Result<Self> {
        if n_interneurons > rows.len() {
            return Err(Error::InvalidMatrix(format!(
                "{n_interneurons} interneurons declared for a matrix with {} rows",
                rows.len()
            )));
        }
        let labels = (0..rows.len())
            .map(|i| if i < n_interneurons { CellType::Interneuron } else { CellType::GranuleCell })
            .collect();
        Self::from_rows(rows, labels)
    }

    /// All cells share one type.
    pub fn homogeneous(rows: Vec<Vec<i64>>, cell: CellType) -> Result<Self> {
        let labels = vec![cell; rows.len()];
        Self::from_rows(rows, labels)
    }

    pub fn node_count(&self) -> usize {
        self.size
    }

    /// Panics if `i` is out of range.
    pub fn label_of(&self, i: usize) -> CellType {
        self.labels[i]
    }

    pub fn labels(&self) -> &[CellType] {
        &self.labels
    }

    pub fn count_of(&self, cell: CellType) -> usize {
        self.labels.iter().filter(|&&l| l == cell).count()
    }

    pub fn interneuron_count(&self) -> usize {
        self.count_of(CellType::Interneuron)
    }

    pub fn granule_count(&self) -> usize {
        self.count_of(CellType::GranuleCell)
    }

    /// Pathway of the directed position `(i, j)`.
    pub fn pathway(&self, i: usize, j: usize) -> Pathway {
        Pathway::between(self.labels[i], self.labels[j])
    }

    /// Code exactly as stored in the source matrix.
    pub fn raw_code(&self, i: usize, j: usize) -> Synapse {
        self.codes[i * self.size + j]
    }

    /// Chemical synapse from `i` onto `j`. Never true on the diagonal.
    pub fn has_chemical(&self, i: usize, j: usize) -> bool {
        i != j && self.raw_code(i, j).is_chemical()
    }

    /// Gap junction between `i` and `j`, whichever position carries the mark.
    pub fn has_electrical(&self, i: usize, j: usize) -> bool {
        i != j && self.electrical[i * self.size + j]
    }

    /// Canonical code of the directed position `(i, j)`: chemical `i → j`
    /// combined with the symmetric gap junction flag.
    pub fn edge_type(&self, i: usize, j: usize) -> Synapse {
        Synapse::from_parts(self.has_chemical(i, j), self.has_electrical(i, j))
    }

    pub fn electrical_encoding(&self) -> ElectricalEncoding {
        self.encoding
    }

    /// Directed chemical edges `(pre, post)` in row-major order.
    pub fn chemical_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size;
        (0..n * n)
            .map(move |k| (k / n, k % n))
            .filter(|&(i, j)| self.has_chemical(i, j))
    }

    /// Gap junctions as unordered pairs `(low, high)`.
    pub fn electrical_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size;
        (0..n)
            .flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.has_electrical(i, j))
    }

    pub fn chemical_count(&self) -> usize {
        self.chemical_edges().count()
    }

    /// Each gap junction counts once regardless of how it was marked.
    pub fn electrical_count(&self) -> usize {
        self.electrical_pairs().count()
    }

    /// Rows re-encoded with every gap junction marked once, on the upper
    /// triangle. Chemical direction is preserved.
    pub fn canonical_rows(&self) -> Vec<Vec<u8>> {
        (0..self.size)
            .map(|i| {
                (0..self.size)
                    .map(|j| {
                        let mark = i < j && self.has_electrical(i, j);
                        Synapse::from_parts(self.has_chemical(i, j), mark).code()
                    })
                    .collect()
            })
            .collect()
    }

    /// Relabel cells: new cell `k` is old cell `order[k]`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let mut seen = vec![false; self.size];
        if order.len() != self.size {
            return Err(Error::InvalidArgument(format!(
                "permutation has {} entries for {} cells",
                order.len(),
                self.size
            )));
        }
        for &k in order {
            if k >= self.size || std::mem::replace(&mut seen[k], true) {
                return Err(Error::InvalidArgument(format!("{order:?} is not a permutation")));
            }
        }

        let rows = order
            .iter()
            .map(|&i| order.iter().map(|&j| self.raw_code(i, j).code() as i64).collect())
            .collect();
        let labels = order.iter().map(|&i| self.labels[i]).collect();
        Self::from_rows(rows, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> ConnectivityMatrix {
        ConnectivityMatrix::with_interneurons(
            vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_chemical_edges_are_directional() {
        let m = example();
        let edges: Vec<_> = m.chemical_edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 0)]);
        assert!(!m.has_chemical(2, 0));
    }

    #[test]
    fn test_electrical_counted_once_per_pair() {
        let m = example();
        let pairs: Vec<_> = m.electrical_pairs().collect();
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
        assert_eq!(m.electrical_count(), 2);
        assert!(m.has_electrical(2, 0));
        assert_eq!(m.electrical_encoding(), ElectricalEncoding::Mixed);
    }

    #[test]
    fn test_edge_type_combines_channels() {
        let m = example();
        assert_eq!(m.edge_type(0, 2), Synapse::Both);
        assert_eq!(m.edge_type(2, 0), Synapse::Electrical);
        assert_eq!(m.edge_type(0, 0), Synapse::None);
    }

    #[test]
    fn test_rejects_non_square() {
        let err = ConnectivityMatrix::with_interneurons(vec![vec![0, 1], vec![0]], 2);
        assert!(matches!(err, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn test_rejects_self_synapse() {
        let err = ConnectivityMatrix::with_interneurons(vec![vec![1, 0], vec![0, 0]], 2);
        assert!(matches!(err, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn test_rejects_unknown_code() {
        let err = ConnectivityMatrix::with_interneurons(vec![vec![0, 4], vec![0, 0]], 2);
        assert!(matches!(err, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn test_rejects_too_many_interneurons() {
        assert!(ConnectivityMatrix::with_interneurons(vec![vec![0]], 2).is_err());
    }

    #[test]
    fn test_canonical_rows_single_mark() {
        let m = example();
        assert_eq!(m.canonical_rows(), vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 0, 0]]);

        let rows = m
            .canonical_rows()
            .into_iter()
            .map(|r| r.into_iter().map(i64::from).collect())
            .collect();
        let again = ConnectivityMatrix::with_interneurons(rows, 3).unwrap();
        assert_eq!(again.electrical_encoding(), ElectricalEncoding::SingleMark);
        assert_eq!(again.chemical_edges().collect::<Vec<_>>(), m.chemical_edges().collect::<Vec<_>>());
        assert_eq!(again.electrical_pairs().collect::<Vec<_>>(), m.electrical_pairs().collect::<Vec<_>>());
    }

    #[test]
    fn test_double_mark_detected() {
        let m = ConnectivityMatrix::with_interneurons(vec![vec![0, 2], vec![2, 0]], 2).unwrap();
        assert_eq!(m.electrical_encoding(), ElectricalEncoding::DoubleMark);
        assert_eq!(m.electrical_count(), 1);
    }

    #[test]
    fn test_labels_follow_interneuron_prefix() {
        let m = ConnectivityMatrix::with_interneurons(vec![vec![0; 3]; 3], 1).unwrap();
        assert_eq!(m.label_of(0), CellType::Interneuron);
        assert_eq!(m.label_of(2), CellType::GranuleCell);
        assert_eq!(m.granule_count(), 2);
        assert_eq!(m.pathway(0, 1), Pathway::InterneuronGranule);
    }

    #[test]
    fn test_permuted_moves_edges() {
        let m = example();
        let p = m.permuted(&[2, 0, 1]).unwrap();
        // old 0 -> new 1, old 1 -> new 2, old 2 -> new 0
        assert!(p.has_chemical(1, 2));
        assert!(p.has_chemical(1, 0));
        assert!(p.has_electrical(0, 2));
        assert!(m.permuted(&[0, 0, 1]).is_err());
    }
}
