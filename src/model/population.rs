//! Cell populations and the pathways between them.

use serde::{Deserialize, Serialize};

/// Recorded cell type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// PV-positive interneuron (inhibitory).
    Interneuron,
    /// Dentate gyrus granule cell (excitatory).
    GranuleCell,
}

impl CellType {
    /// Single-letter tag: `i` for inhibitory, `e` for excitatory.
    pub fn tag(self) -> char {
        match self {
            CellType::Interneuron => 'i',
            CellType::GranuleCell => 'e',
        }
    }
}

/// Presynaptic → postsynaptic population pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathway {
    InterneuronInterneuron,
    InterneuronGranule,
    GranuleInterneuron,
    GranuleGranule,
}

impl Pathway {
    pub const ALL: [Pathway; 4] = [
        Pathway::InterneuronInterneuron,
        Pathway::InterneuronGranule,
        Pathway::GranuleInterneuron,
        Pathway::GranuleGranule,
    ];

    pub fn between(pre: CellType, post: CellType) -> Self {
        match (pre, post) {
            (CellType::Interneuron, CellType::Interneuron) => Pathway::InterneuronInterneuron,
            (CellType::Interneuron, CellType::GranuleCell) => Pathway::InterneuronGranule,
            (CellType::GranuleCell, CellType::Interneuron) => Pathway::GranuleInterneuron,
            (CellType::GranuleCell, CellType::GranuleCell) => Pathway::GranuleGranule,
        }
    }

    /// Pathway for a population recurrently connected to itself.
    pub fn recurrent(cell: CellType) -> Self {
        Self::between(cell, cell)
    }

    pub fn pre(self) -> CellType {
        match self {
            Pathway::InterneuronInterneuron | Pathway::InterneuronGranule => CellType::Interneuron,
            Pathway::GranuleInterneuron | Pathway::GranuleGranule => CellType::GranuleCell,
        }
    }

    pub fn post(self) -> CellType {
        match self {
            Pathway::InterneuronInterneuron | Pathway::GranuleInterneuron => CellType::Interneuron,
            Pathway::InterneuronGranule | Pathway::GranuleGranule => CellType::GranuleCell,
        }
    }

    pub fn reversed(self) -> Self {
        Self::between(self.post(), self.pre())
    }

    pub fn is_recurrent(self) -> bool {
        self.pre() == self.post()
    }

    /// Key for undirected motifs. Mixed pairs are filed under
    /// `InterneuronGranule`.
    pub fn undirected(self) -> Self {
        match self {
            Pathway::GranuleInterneuron => Pathway::InterneuronGranule,
            other => other,
        }
    }

    /// Short name used in reports (`ii`, `ie`, `ei`, `ee`).
    pub fn short_name(self) -> &'static str {
        match self {
            Pathway::InterneuronInterneuron => "ii",
            Pathway::InterneuronGranule => "ie",
            Pathway::GranuleInterneuron => "ei",
            Pathway::GranuleGranule => "ee",
        }
    }
}

impl std::fmt::Display for Pathway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Number of recorded cells of each type, used to size the null model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopulationSizes {
    pub interneurons: u64,
    pub granule_cells: u64,
}

impl PopulationSizes {
    pub fn new(interneurons: u64, granule_cells: u64) -> Self {
        Self { interneurons, granule_cells }
    }

    pub fn of(&self, cell: CellType) -> u64 {
        match cell {
            CellType::Interneuron => self.interneurons,
            CellType::GranuleCell => self.granule_cells,
        }
    }

    pub fn total(&self) -> u64 {
        self.interneurons + self.granule_cells
    }
}
