// src/reference/ranges.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_range, ReferenceData};
use crate::error::Result;

/// Normal relative-abundance bounds (percent) per taxon, split by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRanges {
    pub beneficial: BTreeMap<String, [f64; 2]>,
    pub harmful: BTreeMap<String, [f64; 2]>,
    pub conditional: BTreeMap<String, [f64; 2]>,
}

impl ReferenceRanges {
    /// Literature-derived ranges used when no external table is supplied.
    pub fn builtin() -> Self {
        let table = |rows: &[(&str, f64, f64)]| -> BTreeMap<String, [f64; 2]> {
            rows.iter()
                .map(|&(name, min, max)| (name.to_string(), [min, max]))
                .collect()
        };

        Self {
            beneficial: table(&[
                ("Bifidobacterium", 0.183, 14.6),
                ("Lactobacillus", 0.008, 0.03),
                ("Faecalibacterium", 0.636, 10.97),
                ("Akkermansia", 0.01, 3.89),
                ("Prevotella", 0.014, 66.13),
                ("Roseburia", 0.1, 5.0),
                ("Coprococcus", 0.009, 0.57),
                ("Butyricimonas", 0.014, 0.86),
                ("Odoribacter", 0.013, 0.61),
                ("Alistipes", 0.01, 2.89),
            ]),
            harmful: table(&[
                ("Escherichia", 0.0, 0.5),
                ("Shigella", 0.0, 0.14),
                ("Salmonella", 0.0, 0.01),
                ("Clostridium_difficile", 0.0, 0.001),
                ("Staphylococcus", 0.0, 0.1),
                ("Klebsiella", 0.0, 0.11),
                ("Enterococcus", 0.0, 0.5),
                ("Fusobacterium", 0.0, 0.1),
                ("Campylobacter", 0.0, 0.01),
                ("Helicobacter", 0.0, 0.01),
            ]),
            conditional: table(&[
                ("Veillonella", 0.0, 0.22),
                ("Streptococcus", 0.0, 2.0),
                ("Bacteroides", 0.0, 30.0),
                ("Eggerthella", 0.0, 0.1),
                ("Peptostreptococcus", 0.0, 0.1),
                ("Haemophilus", 0.0, 0.5),
            ]),
        }
    }
}

impl Default for ReferenceRanges {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceData for ReferenceRanges {
    const KIND: &'static str = "reference ranges";

    fn validate(&self) -> Result<()> {
        self.beneficial
            .iter()
            .chain(&self.harmful)
            .chain(&self.conditional)
            .try_for_each(|(name, range)| check_range(name, *range))
    }
}
