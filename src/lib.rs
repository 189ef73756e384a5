//! # inet-rs — Connectivity Motif Statistics
//!
//! Counts structural motifs in synaptic connectivity matrices recorded with
//! simultaneous multi-cell patch clamp, and tests their frequencies against
//! an independent-edge null model.
//!
//! ## Design Principles
//!
//! 1. **Validated DTOs**: `ConnectivityMatrix` cannot hold an invalid code
//! 2. **Predicates, not classes**: every motif is an independent test per node subset
//! 3. **Explicit accumulator**: `MotifCount` is summed, never shared
//! 4. **Undefined is not zero**: statistics that cannot be computed say so
//!
//! ## Quick Start
//!
//! ```rust
//! use inet::{Analysis, AnalysisConfig, ConnectivityMatrix};
//!
//! # fn example() -> inet::Result<()> {
//! let matrix = ConnectivityMatrix::with_interneurons(
//!     vec![vec![0, 1, 3], vec![1, 0, 2], vec![0, 2, 0]],
//!     3,
//! )?;
//!
//! let report = Analysis::new(AnalysisConfig::default()).run(&[matrix])?;
//! for row in inet::report::rows(&report.results) {
//!     println!("{} {} {:?}", row.motif, row.pathway, row.p_value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Synapse Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | no connection |
//! | 1 | chemical synapse (row → column) |
//! | 2 | electrical synapse (gap junction) |
//! | 3 | chemical and electrical |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod motif;
pub mod stats;
pub mod loader;
pub mod config;
pub mod analysis;
pub mod report;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    CellType, ConnectivityMatrix, DistanceMatrix, EdgeType,
    ElectricalEncoding, Pathway, PopulationSizes, Synapse,
};

// ============================================================================
// Re-exports: Motifs
// ============================================================================

pub use motif::{
    CensusMode, Motif, MotifCount, MotifCounter, MotifOrder,
    PairCensus, PairClass, Tally,
};

// ============================================================================
// Re-exports: Statistics
// ============================================================================

pub use stats::{
    BinomialTest, DistanceProfile, EdgeEstimate, HypothesisTester, NullModel,
    Outcome, TestMethod, TestResult, UndefinedReason,
};

// ============================================================================
// Re-exports: Loading, configuration, pipeline
// ============================================================================

pub use loader::{load, DatasetSummary, LoadReport, Recording};
pub use config::{AnalysisConfig, NullTest, SimulationConfig};
pub use analysis::{Analysis, AnalysisReport};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse { line: usize, column: usize, message: String },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Insufficient data for {subject}: no testable subsets")]
    InsufficientData { subject: String },

    #[error("Degenerate null model: probability {probability} leaves the test undefined")]
    NullModelDegenerate { probability: f64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
