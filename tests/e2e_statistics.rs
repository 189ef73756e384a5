//! End-to-end tests for the null model, hypothesis tests and the analysis
//! pipeline.

use inet::report;
use inet::stats::binomial;
use inet::{
    Analysis, AnalysisConfig, ConnectivityMatrix, EdgeEstimate, EdgeType, Error,
    HypothesisTester, Motif, NullModel, Outcome, Pathway, PopulationSizes, TestMethod,
    UndefinedReason,
};

const II: Pathway = Pathway::InterneuronInterneuron;

fn triplet(rows: Vec<Vec<i64>>) -> ConnectivityMatrix {
    ConnectivityMatrix::with_interneurons(rows, 3).unwrap()
}

// ============================================================================
// 1. Pooled probabilities
// ============================================================================

#[test]
fn test_pooled_probability_counts_every_pair() {
    // 6 edges over five 3-cell recordings, i.e. 30 directed pairs
    let two = || triplet(vec![vec![0, 1, 0], vec![0, 0, 1], vec![0, 0, 0]]);
    let none = || triplet(vec![vec![0; 3]; 3]);
    let matrices = vec![two(), none(), two(), none(), two()];

    let null = NullModel::estimate(&matrices);
    let p = null.probability(EdgeType::Chemical).unwrap();
    assert!((p - 0.2).abs() < 1e-12);

    let expected = null
        .expected_motif_count(Motif::Convergent, II, PopulationSizes::new(3, 0))
        .unwrap();
    assert!((expected - 0.12).abs() < 1e-12);
}

#[test]
fn test_probability_without_pairs_is_insufficient() {
    let single = ConnectivityMatrix::with_interneurons(vec![vec![0]], 1).unwrap();
    let null = NullModel::estimate(&[single]);
    assert!(matches!(null.probability(EdgeType::Chemical), Err(Error::InsufficientData { .. })));
}

#[test]
fn test_probability_rows_cover_each_channel() {
    let null = NullModel::estimate(&[triplet(vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]])]);
    let rows = report::probability_rows(&null);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].edge_type, "chemical");
    assert_eq!((rows[0].found, rows[0].tested), (3, 6));
    assert_eq!((rows[1].found, rows[1].tested), (2, 3));
    assert!(rows.iter().all(|r| r.ci_half_width.is_some()));
}

// ============================================================================
// 2. Hypothesis tests
// ============================================================================

#[test]
fn test_exact_test_is_symmetric_for_fair_coin() {
    let tester = HypothesisTester::default();
    let low = tester.test(2, 20, 0.5).unwrap();
    let high = tester.test(18, 20, 0.5).unwrap();
    assert!((low.p_value - high.p_value).abs() < 1e-12);
    assert!(low.reject);
}

#[test]
fn test_large_trials_switch_to_normal_approximation() {
    let tester = HypothesisTester::default();
    let test = tester.test(20_500, 200_000, 0.1).unwrap();
    assert_eq!(test.method, TestMethod::NormalApproximation);
    assert!(test.p_value > 0.0 && test.p_value <= 1.0);
    let exact = binomial::normal_two_sided(20_500, 200_000, 0.1);
    assert!((test.p_value - exact).abs() < 1e-12);
}

#[test]
fn test_extreme_counts_keep_positive_p_values() {
    let tester = HypothesisTester::default();
    let test = tester.test(900, 1000, 0.01).unwrap();
    assert!(test.p_value > 0.0);
    assert!(test.reject);
}

// ============================================================================
// 3. The analysis pipeline
// ============================================================================

#[test]
fn test_pipeline_reports_overrepresented_reciprocity() {
    // every connected pair is reciprocal: far above p_c^2
    let reciprocal = || {
        ConnectivityMatrix::with_interneurons(
            vec![vec![0, 1, 0, 0], vec![1, 0, 0, 0], vec![0, 0, 0, 1], vec![0, 0, 1, 0]],
            4,
        )
        .unwrap()
    };
    let matrices: Vec<_> = (0..8).map(|_| reciprocal()).collect();
    let report = Analysis::default().run(&matrices).unwrap();

    let c2 = report.result(Motif::Reciprocal, II).unwrap();
    assert_eq!((c2.observed, c2.trials), (16, 48));
    assert_eq!(c2.is_significant(), Some(true));
    assert!(report.significant().any(|r| r.motif == Motif::Reciprocal));
}

#[test]
fn test_pipeline_marks_undefined_rows() {
    let pairs: Vec<_> = (0..4)
        .map(|_| ConnectivityMatrix::with_interneurons(vec![vec![0, 1], vec![0, 0]], 2).unwrap())
        .collect();
    let report = Analysis::default().run(&pairs).unwrap();

    for motif in [Motif::Convergent, Motif::Divergent, Motif::Chain] {
        let row = report.result(motif, II).unwrap();
        assert_eq!(row.outcome, Outcome::Undefined { reason: UndefinedReason::InsufficientData });
    }
    let rows = report::rows(&report.results);
    assert!(rows.iter().any(|r| r.significance == "undefined"));
    assert!(rows.iter().any(|r| r.motif == "chem" && r.p_value.is_some()));
}

#[test]
fn test_monte_carlo_is_reproducible() {
    let m = triplet(vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]]);
    let config = AnalysisConfig::default().with_simulation(300, Some(42));
    let a = Analysis::new(config.clone()).run(&[m.clone(), m.clone()]).unwrap();
    let b = Analysis::new(config).run(&[m.clone(), m]).unwrap();
    assert_eq!(a.results, b.results);
}

#[test]
fn test_monte_carlo_report_serializes() {
    let m = triplet(vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]]);
    let config = AnalysisConfig::default().with_simulation(20, Some(1));
    let report = Analysis::new(config).run(&[m.clone(), m]).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    let rows = value["simulation"]["samples"].as_array().unwrap();
    assert!(rows.iter().all(|row| row["samples"].as_array().unwrap().len() == 20));
    assert!(value["census"].as_array().is_some_and(|census| !census.is_empty()));
}

#[test]
fn test_custom_null_model_feeds_expectations() {
    let mut null = NullModel::default();
    null.insert(EdgeType::Chemical, II, EdgeEstimate { found: 1, tested: 10 });
    null.insert(EdgeType::Electrical, II, EdgeEstimate { found: 1, tested: 5 });
    let p = null.motif_probability(Motif::CoupledConvergent, II).unwrap();
    assert!((p - 0.01 * 0.2).abs() < 1e-12);
    let p = null.motif_probability(Motif::ElectricalTriangle, II).unwrap();
    assert!((p - 0.008).abs() < 1e-12);
}

#[test]
fn test_json_report_round_trips_through_serde() {
    let m = triplet(vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]]);
    let report = Analysis::default().run(&[m]).unwrap();
    let json = report::to_json(&report.results).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), report.results.len());
}
