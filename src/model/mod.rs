//! # Connectivity Model
//!
//! Validated DTOs for recorded connectivity. These types cross every
//! boundary: loader ↔ motif counter ↔ null model ↔ report.
//!
//! Design rule: this module is pure data: no I/O, no statistics.

pub mod synapse;
pub mod population;
pub mod matrix;
pub mod distance;

pub use synapse::{Synapse, EdgeType};
pub use population::{CellType, Pathway, PopulationSizes};
pub use matrix::{ConnectivityMatrix, ElectricalEncoding};
pub use distance::DistanceMatrix;
