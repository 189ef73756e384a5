//! Property tests over randomly generated connectivity matrices.

use inet::motif::choose;
use inet::{CensusMode, ConnectivityMatrix, EdgeType, MotifCounter, NullModel, Pathway};
use proptest::prelude::*;

/// A valid matrix of 2..=6 cells with a random interneuron count.
fn matrix() -> impl Strategy<Value = ConnectivityMatrix> {
    (2usize..=6)
        .prop_flat_map(|n| (Just(n), 0..=n, prop::collection::vec(0i64..=3, n * n)))
        .prop_map(|(n, interneurons, codes)| {
            let rows = (0..n)
                .map(|i| (0..n).map(|j| if i == j { 0 } else { codes[i * n + j] }).collect())
                .collect();
            ConnectivityMatrix::with_interneurons(rows, interneurons).unwrap()
        })
}

fn matrix_and_permutation() -> impl Strategy<Value = (ConnectivityMatrix, Vec<usize>)> {
    matrix().prop_flat_map(|m| {
        let order: Vec<usize> = (0..m.node_count()).collect();
        (Just(m), Just(order).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn test_census_covers_every_pair(m in matrix()) {
        let count = MotifCounter::pairs().count(&m);
        let total: u64 = Pathway::ALL.iter().map(|&p| count.census(p).total()).sum();
        prop_assert_eq!(total, choose(m.node_count() as u64, 2));
    }

    #[test]
    fn test_electrical_flags_are_symmetric(m in matrix()) {
        for i in 0..m.node_count() {
            prop_assert!(!m.has_chemical(i, i) && !m.has_electrical(i, i));
            for j in 0..m.node_count() {
                prop_assert_eq!(m.has_electrical(i, j), m.has_electrical(j, i));
            }
        }
    }

    #[test]
    fn test_counts_survive_relabeling((m, order) in matrix_and_permutation()) {
        let p = m.permuted(&order).unwrap();
        let counter = MotifCounter::all();
        let (a, b) = (counter.count(&m), counter.count(&p));

        prop_assert_eq!(a.iter(), b.iter());
        for pathway in Pathway::ALL {
            prop_assert_eq!(
                a.census(pathway).entries(CensusMode::Pooled),
                b.census(pathway).entries(CensusMode::Pooled)
            );
        }
    }

    #[test]
    fn test_pooled_probability_is_exact(m in matrix()) {
        let n = m.node_count() as u64;
        let null = NullModel::estimate(std::slice::from_ref(&m));
        let p = null.probability(EdgeType::Chemical).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert_eq!(p, m.chemical_count() as f64 / (n * (n - 1)) as f64);

        let pooled = null.pooled(EdgeType::Electrical);
        prop_assert_eq!(pooled.found, m.electrical_count() as u64);
        prop_assert_eq!(pooled.tested, choose(n, 2));
    }

    #[test]
    fn test_found_never_exceeds_tested(m in matrix()) {
        for (_, _, tally) in MotifCounter::all().count(&m).iter() {
            prop_assert!(tally.found <= tally.tested);
        }
    }
}
