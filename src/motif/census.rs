//! Exclusive census of pair classes.

use serde::{Deserialize, Serialize};

use super::pattern::PairClass;

/// Whether one-directional chemical pairs are reported per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensusMode {
    #[default]
    Separate,
    Pooled,
}

/// Number of unordered pairs in each `PairClass`. The total always equals
/// the number of pairs examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairCensus {
    pub unconnected: u64,
    pub forward: u64,
    pub backward: u64,
    pub reciprocal: u64,
    pub electrical: u64,
    pub both: u64,
}

impl PairCensus {
    pub fn record(&mut self, class: PairClass) {
        let slot = match class {
            PairClass::Unconnected => &mut self.unconnected,
            PairClass::Forward => &mut self.forward,
            PairClass::Backward => &mut self.backward,
            PairClass::Reciprocal => &mut self.reciprocal,
            PairClass::Electrical => &mut self.electrical,
            PairClass::Both => &mut self.both,
        };
        *slot += 1;
    }

    pub fn unidirectional(&self) -> u64 {
        self.forward + self.backward
    }

    pub fn total(&self) -> u64 {
        self.unconnected + self.unidirectional() + self.reciprocal + self.electrical + self.both
    }

    /// Labelled counts in report order.
    pub fn entries(&self, mode: CensusMode) -> Vec<(&'static str, u64)> {
        let mut out = vec![("unconnected", self.unconnected)];
        match mode {
            CensusMode::Separate => {
                out.push(("forward", self.forward));
                out.push(("backward", self.backward));
            }
            CensusMode::Pooled => out.push(("unidirectional", self.unidirectional())),
        }
        out.push(("reciprocal", self.reciprocal));
        out.push(("electrical", self.electrical));
        out.push(("both", self.both));
        out
    }
}

impl std::ops::AddAssign for PairCensus {
    fn add_assign(&mut self, rhs: Self) {
        self.unconnected += rhs.unconnected;
        self.forward += rhs.forward;
        self.backward += rhs.backward;
        self.reciprocal += rhs.reciprocal;
        self.electrical += rhs.electrical;
        self.both += rhs.both;
    }
}
