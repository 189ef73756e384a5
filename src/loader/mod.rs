//! # Dataset loading
//!
//! A dataset is a directory of recordings. Each recording is a `.syn` file
//! named `N_YYMMDD_SET.syn`, where `N` is the number of interneurons
//! occupying the first rows, optionally accompanied by a `.dist` file with
//! the same stem.
//!
//! Loading never aborts on a bad file: it is skipped, logged and listed in
//! [`LoadReport::rejected`] so the caller decides what to do about it.

pub mod parse;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::{ConnectivityMatrix, DistanceMatrix};
use crate::{Error, Result};

pub use parse::{parse_dist, parse_syn};

// ============================================================================
// File names
// ============================================================================

/// Parsed `N_YYMMDD_SET` stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingName {
    pub interneurons: usize,
    /// `None` when the date field is not a valid `YYMMDD` date.
    pub date: Option<NaiveDate>,
    pub set: String,
    pub stem: String,
}

impl RecordingName {
    pub fn parse(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?;

        let parts: Vec<&str> = stem.split('_').collect();
        let [count, date, set] = parts.as_slice() else {
            return Err(Error::InvalidFileName(format!(
                "{stem}: expected N_YYMMDD_SET"
            )));
        };
        let interneurons = count.parse::<usize>().map_err(|_| {
            Error::InvalidFileName(format!("{stem}: {count:?} is not an interneuron count"))
        })?;
        if set.is_empty() {
            return Err(Error::InvalidFileName(format!("{stem}: empty set field")));
        }

        Ok(Self {
            interneurons,
            date: NaiveDate::parse_from_str(date, "%y%m%d").ok(),
            set: set.to_string(),
            stem: stem.to_string(),
        })
    }
}

// ============================================================================
// Recordings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub name: RecordingName,
    pub matrix: ConnectivityMatrix,
    pub distances: Option<DistanceMatrix>,
}

/// Read and validate a single `.syn` file.
pub fn read_syn(path: &Path) -> Result<(RecordingName, ConnectivityMatrix)> {
    let name = RecordingName::parse(path)?;
    let text = std::fs::read_to_string(path)?;
    let matrix = ConnectivityMatrix::with_interneurons(parse_syn(&text)?, name.interneurons)?;
    Ok((name, matrix))
}

/// Read a `.dist` file; `size` is the node count of its `.syn` companion.
pub fn read_dist(path: &Path, size: usize) -> Result<DistanceMatrix> {
    let text = std::fs::read_to_string(path)?;
    let distances = DistanceMatrix::from_rows(parse_dist(&text)?)?;
    if distances.node_count() != size {
        return Err(Error::InvalidMatrix(format!(
            "distance matrix has {} cells but the connectivity matrix has {size}",
            distances.node_count()
        )));
    }
    Ok(distances)
}

// ============================================================================
// Load report
// ============================================================================

/// A file that could not be used.
#[derive(Debug)]
pub struct Rejected {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub recordings: Vec<Recording>,
    pub rejected: Vec<Rejected>,
    /// Files whose gap junctions mix single and double marks.
    pub ambiguous: Vec<PathBuf>,
}

impl LoadReport {
    pub fn matrices(&self) -> Vec<ConnectivityMatrix> {
        self.recordings.iter().map(|r| r.matrix.clone()).collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_recordings(&self.recordings)
    }
}

/// Cell and configuration totals of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub recordings: usize,
    pub interneurons: usize,
    pub granule_cells: usize,
    /// Recordings per number of simultaneously recorded cells.
    pub configurations: BTreeMap<usize, usize>,
    /// Recordings per number of interneurons.
    pub by_interneurons: BTreeMap<usize, usize>,
}

impl DatasetSummary {
    pub fn from_recordings(recordings: &[Recording]) -> Self {
        let mut summary = Self::default();
        for rec in recordings {
            summary.add(&rec.matrix);
        }
        summary
    }

    pub fn from_matrices(matrices: &[ConnectivityMatrix]) -> Self {
        let mut summary = Self::default();
        for matrix in matrices {
            summary.add(matrix);
        }
        summary
    }

    fn add(&mut self, matrix: &ConnectivityMatrix) {
        self.recordings += 1;
        self.interneurons += matrix.interneuron_count();
        self.granule_cells += matrix.granule_count();
        *self.configurations.entry(matrix.node_count()).or_default() += 1;
        *self.by_interneurons.entry(matrix.interneuron_count()).or_default() += 1;
    }

    /// Conventional name of a recording configuration.
    pub fn configuration_name(size: usize) -> &'static str {
        match size {
            1 => "single",
            2 => "pairs",
            3 => "triplets",
            4 => "quadruplets",
            5 => "quintuplets",
            6 => "sextuplets",
            7 => "septuplets",
            8 => "octuplets",
            _ => "larger",
        }
    }
}

// ============================================================================
// Directory loading
// ============================================================================

/// Sorted `.syn` files among `entries`. Entries that cannot be read are
/// logged and rejected under the directory path.
fn syn_paths<I>(dir: &Path, entries: I, report: &mut LoadReport) -> Vec<PathBuf>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() && path.extension().is_some_and(|ext| ext == "syn") {
                    paths.push(path);
                }
            }
            Err(error) => {
                warn!(dir = %dir.display(), %error, "skipping unreadable directory entry");
                report.rejected.push(Rejected { path: dir.to_path_buf(), error: error.into() });
            }
        }
    }
    paths.sort();
    paths
}

/// Load every `.syn` recording in `dir`, in file name order.
pub fn load(dir: impl AsRef<Path>) -> Result<LoadReport> {
    let dir = dir.as_ref();
    let mut report = LoadReport::default();
    let entries = std::fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
    let paths = syn_paths(dir, entries, &mut report);

    for path in paths {
        let (name, matrix) = match read_syn(&path) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping recording");
                report.rejected.push(Rejected { path, error });
                continue;
            }
        };

        if matrix.electrical_encoding().is_ambiguous() {
            warn!(path = %path.display(), "gap junctions marked both once and twice");
            report.ambiguous.push(path.clone());
        }

        let dist_path = path.with_extension("dist");
        let distances = if dist_path.is_file() {
            match read_dist(&dist_path, matrix.node_count()) {
                Ok(d) => Some(d),
                Err(error) => {
                    warn!(path = %dist_path.display(), %error, "ignoring distances");
                    report.rejected.push(Rejected { path: dist_path, error });
                    None
                }
            }
        } else {
            None
        };

        debug!(
            stem = %name.stem,
            cells = matrix.node_count(),
            interneurons = name.interneurons,
            distances = distances.is_some(),
            "loaded recording"
        );
        report.recordings.push(Recording { name, matrix, distances });
    }

    info!(
        dir = %dir.display(),
        loaded = report.recordings.len(),
        rejected = report.rejected.len(),
        ambiguous = report.ambiguous.len(),
        "dataset loaded"
    );
    Ok(report)
}
