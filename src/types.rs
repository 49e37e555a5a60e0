//src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Taxonomic ranks carried by an abundance table, Kingdom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Column header used for this rank in abundance tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Rank::Kingdom => "Kingdom",
            Rank::Phylum => "Phylum",
            Rank::Class => "Class",
            Rank::Order => "Order",
            Rank::Family => "Family",
            Rank::Genus => "Genus",
            Rank::Species => "Species",
        }
    }

    /// Marker some classifiers put in front of a label, e.g. `g__Bacteroides`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Rank::Kingdom => "k__",
            Rank::Phylum => "p__",
            Rank::Class => "c__",
            Rank::Order => "o__",
            Rank::Family => "f__",
            Rank::Genus => "g__",
            Rank::Species => "s__",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_column(name: &str) -> Option<Rank> {
        Rank::ALL.iter().copied().find(|r| r.column_name() == name)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .iter()
            .copied()
            .find(|r| r.column_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rank '{s}'"))
    }
}

/// One row of the abundance table: a lineage plus the read count of the sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonRecord {
    pub id: String,
    /// Raw labels indexed by `Rank::index()`; `None` when the cell is empty.
    pub lineage: [Option<String>; 7],
    pub count: u64,
}

impl TaxonRecord {
    pub fn new(id: impl Into<String>, count: u64) -> Self {
        Self {
            id: id.into(),
            lineage: Default::default(),
            count,
        }
    }

    /// Builder-style setter, mostly for assembling tables in code.
    pub fn with(mut self, rank: Rank, label: impl Into<String>) -> Self {
        self.lineage[rank.index()] = Some(label.into());
        self
    }

    pub fn label(&self, rank: Rank) -> Option<&str> {
        self.lineage[rank.index()].as_deref()
    }
}

/// In-memory abundance table for exactly one sample.
///
/// `ranks` lists the taxonomy columns that were present in the source; a rank
/// missing there is "absent" for every query, even if a record carries a label.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTable {
    pub sample_id: String,
    pub ranks: Vec<Rank>,
    pub records: Vec<TaxonRecord>,
}

impl AbundanceTable {
    pub fn new(sample_id: impl Into<String>, ranks: Vec<Rank>, records: Vec<TaxonRecord>) -> Self {
        Self {
            sample_id: sample_id.into(),
            ranks,
            records,
        }
    }

    pub fn has_rank(&self, rank: Rank) -> bool {
        self.ranks.contains(&rank)
    }

    /// Tables from `table::parse_abundance_table` are checked so this sum fits in a `u64`.
    pub fn total_reads(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Counts of all taxa with at least one read, in table order.
    pub fn nonzero_counts(&self) -> Vec<u64> {
        self.records
            .iter()
            .map(|r| r.count)
            .filter(|&c| c > 0)
            .collect()
    }
}
