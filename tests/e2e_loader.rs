//! End-to-end tests for loading recording directories.
//!
//! Every test writes `.syn` / `.dist` files into a temporary directory and
//! loads it with `inet::load`.

use std::fs;
use std::path::Path;

use inet::stats::{DistanceModel, SigmoidParams};
use inet::{load, Analysis, AnalysisConfig, EdgeType, Error, Motif, Pathway};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn dataset() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "3_170302_01.syn", "0 1 3\n1 0 2\n0 2 0\n");
    write(dir.path(), "3_170302_01.dist", "0 40 90\n-40 0 55\n90 55 0\n");
    write(dir.path(), "1_170415_02.syn", "# one interneuron, two granule cells\n0,1,1\n0,0,0\n1,0,0\n");
    write(dir.path(), "notes.txt", "not a recording");
    dir
}

#[test]
fn test_loads_recordings_in_name_order() {
    let dir = dataset();
    let report = load(dir.path()).unwrap();

    let stems: Vec<_> = report.recordings.iter().map(|r| r.name.stem.as_str()).collect();
    assert_eq!(stems, vec!["1_170415_02", "3_170302_01"]);
    assert!(report.rejected.is_empty());
    assert_eq!(report.ambiguous.len(), 1);
    assert!(report.ambiguous[0].ends_with("3_170302_01.syn"));

    assert!(report.recordings[0].distances.is_none());
    assert!(report.recordings[1].distances.is_some());
}

#[test]
fn test_summary_counts_configurations() {
    let dir = dataset();
    let summary = load(dir.path()).unwrap().summary();
    assert_eq!(summary.recordings, 2);
    assert_eq!(summary.interneurons, 4);
    assert_eq!(summary.granule_cells, 2);
    assert_eq!(summary.configurations.get(&3), Some(&2));
    assert_eq!(summary.by_interneurons.get(&1), Some(&1));
}

#[test]
fn test_bad_files_are_skipped_and_reported() {
    let dir = dataset();
    write(dir.path(), "2_170501_03.syn", "0 1\n1 0 0\n");
    write(dir.path(), "2_170501_04.syn", "0 7\n0 0\n");
    write(dir.path(), "badname.syn", "0 1\n0 0\n");
    write(dir.path(), "2_170501_05.syn", "0 1\n1 zero\n");

    let report = load(dir.path()).unwrap();
    assert_eq!(report.recordings.len(), 2);
    assert_eq!(report.rejected.len(), 4);
    assert!(report.rejected.iter().any(|r| matches!(r.error, Error::InvalidFileName(_))));
    assert!(report.rejected.iter().any(|r| matches!(r.error, Error::Parse { line: 2, column: 3, .. })));
    assert!(report.rejected.iter().any(|r| matches!(r.error, Error::InvalidMatrix(_))));
}

#[test]
fn test_invalid_distances_keep_the_recording() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "2_170302_01.syn", "0 1\n0 0\n");
    write(dir.path(), "2_170302_01.dist", "0 10\n12 0\n");

    let report = load(dir.path()).unwrap();
    assert_eq!(report.recordings.len(), 1);
    assert!(report.recordings[0].distances.is_none());
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0].path.ends_with("2_170302_01.dist"));
}

#[test]
fn test_distance_size_must_match() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "2_170302_01.syn", "0 1\n0 0\n");
    write(dir.path(), "2_170302_01.dist", "0 1 2\n1 0 1\n2 1 0\n");

    let report = load(dir.path()).unwrap();
    assert!(report.recordings[0].distances.is_none());
    assert!(matches!(report.rejected[0].error, Error::InvalidMatrix(_)));
}

#[test]
fn test_missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(load(dir.path().join("absent")), Err(Error::Io(_))));
}

#[test]
fn test_recordings_feed_distance_profiles() {
    let dir = dataset();
    let report = load(dir.path()).unwrap();
    let analysis = Analysis::default().run_recordings(&report.recordings).unwrap();

    let chem = analysis
        .profiles
        .iter()
        .find(|p| p.edge_type == EdgeType::Chemical && p.pathway == Pathway::InterneuronInterneuron)
        .unwrap();
    // six directed pairs from the one recording with distances
    assert_eq!(chem.tested(), 6);
    assert_eq!(chem.bins[0].found, 2);
    assert_eq!(chem.bins[0].tested, 2);
    assert_eq!(analysis.summary.recordings, 2);
}

#[test]
fn test_distance_model_drives_monte_carlo() {
    let dir = dataset();
    let report = load(dir.path()).unwrap();
    // chemical synapses certain below 60 um, absent beyond; no gap junctions
    let model = DistanceModel::new(
        SigmoidParams { amplitude: 1.0, midpoint: 60.0, rate: 1e-3 },
        SigmoidParams { amplitude: 0.0, midpoint: 60.0, rate: 1.0 },
    );
    let config = AnalysisConfig::default()
        .with_simulation(40, Some(9))
        .with_distance_model(model);
    let analysis = Analysis::new(config).run_recordings(&report.recordings).unwrap();

    let simulation = analysis.simulation.as_ref().unwrap();
    // pairs 0-1 (40 um) and 1-2 (55 um) connect both ways, 0-2 (90 um) never
    let chemical = simulation.samples(Motif::Chemical, Pathway::InterneuronInterneuron).unwrap();
    assert_eq!(chemical.len(), 40);
    assert!(chemical.iter().all(|&found| found == 4));
    let electrical = simulation.samples(Motif::Electrical, Pathway::InterneuronInterneuron).unwrap();
    assert!(electrical.iter().all(|&found| found == 0));
}
