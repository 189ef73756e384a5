//! Statistical inference over motif counts: the independent-edge null
//! model, binomial and simulated significance tests, and distance profiles.

pub mod binomial;
pub mod null_model;
pub mod hypothesis;
pub mod simulation;
pub mod distance;

pub use distance::{DistanceBin, DistanceProfile, LinearFit};
pub use hypothesis::{
    BinomialTest, HypothesisTester, Outcome, TestMethod, TestResult, UndefinedReason,
};
pub use null_model::{EdgeEstimate, NullModel};
pub use simulation::{
    random_matrix, random_matrix_with_distances, simulate, simulate_recordings, DistanceModel,
    SampleRow, SigmoidParams, SimulatedDistribution,
};
