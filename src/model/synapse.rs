//! Synapse codes stored in `.syn` matrices.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Connection recorded from the row cell onto the column cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Synapse {
    None = 0,
    Chemical = 1,
    Electrical = 2,
    Both = 3,
}

impl Synapse {
    /// Build a code from its chemical and electrical components.
    pub fn from_parts(chemical: bool, electrical: bool) -> Self {
        match (chemical, electrical) {
            (false, false) => Synapse::None,
            (true, false) => Synapse::Chemical,
            (false, true) => Synapse::Electrical,
            (true, true) => Synapse::Both,
        }
    }

    pub fn is_chemical(self) -> bool {
        matches!(self, Synapse::Chemical | Synapse::Both)
    }

    pub fn is_electrical(self) -> bool {
        matches!(self, Synapse::Electrical | Synapse::Both)
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Synapse {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Synapse::None),
            1 => Ok(Synapse::Chemical),
            2 => Ok(Synapse::Electrical),
            3 => Ok(Synapse::Both),
            other => Err(Error::InvalidMatrix(format!(
                "synapse code {other} is outside {{0, 1, 2, 3}}"
            ))),
        }
    }
}

/// Synaptic channel used by the null model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Directional; tested over ordered pairs.
    Chemical,
    /// Gap junction; tested over unordered pairs.
    Electrical,
}

impl EdgeType {
    pub fn name(self) -> &'static str {
        match self {
            EdgeType::Chemical => "chemical",
            EdgeType::Electrical => "electrical",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip_through_parts() {
        for code in 0..=3 {
            let syn = Synapse::try_from(code).unwrap();
            assert_eq!(Synapse::from_parts(syn.is_chemical(), syn.is_electrical()), syn);
            assert_eq!(syn.code() as i64, code);
        }
    }

    #[test]
    fn test_rejects_out_of_range_codes() {
        assert!(Synapse::try_from(4).is_err());
        assert!(Synapse::try_from(-1).is_err());
    }
}
