// src/reference/diseases.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ReferenceData;
use crate::error::{ProfileError, Result};

fn default_weight() -> f64 {
    1.0
}

/// Taxa associated with one disease. List order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub beneficial: Vec<String>,
    pub harmful: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl DiseaseProfile {
    pub fn new(beneficial: &[&str], harmful: &[&str], weight: f64) -> Self {
        Self {
            beneficial: beneficial.iter().map(|s| s.to_string()).collect(),
            harmful: harmful.iter().map(|s| s.to_string()).collect(),
            weight,
        }
    }
}

/// Disease code -> associated taxa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseDatabase {
    pub diseases: BTreeMap<String, DiseaseProfile>,
}

impl DiseaseDatabase {
    pub fn builtin() -> Self {
        let entries = [
            (
                "IBD",
                DiseaseProfile::new(
                    &["Faecalibacterium", "Akkermansia", "Coprococcus", "Roseburia"],
                    &["Escherichia", "Streptococcus", "Eggerthella", "Klebsiella"],
                    1.5,
                ),
            ),
            (
                "IBS",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Lactobacillus", "Faecalibacterium"],
                    &["Veillonella", "Streptococcus", "Ruminococcus_gnavus"],
                    1.2,
                ),
            ),
            (
                "Diabetes",
                DiseaseProfile::new(
                    &["Prevotella", "Roseburia", "Akkermansia"],
                    &["Peptostreptococcus", "Clostridium", "Desulfovibrio"],
                    1.3,
                ),
            ),
            (
                "Obesity",
                DiseaseProfile::new(
                    &["Akkermansia", "Bacteroides", "Prevotella"],
                    &["Firmicutes", "Staphylococcus", "Enterobacteriaceae"],
                    1.2,
                ),
            ),
            (
                "CRC",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Lactobacillus", "Faecalibacterium"],
                    &["Fusobacterium", "Porphyromonas", "Bacteroides_fragilis", "Peptostreptococcus"],
                    1.8,
                ),
            ),
            (
                "Liver",
                DiseaseProfile::new(
                    &["Ruminococcus", "Akkermansia", "Faecalibacterium"],
                    &["Klebsiella", "Escherichia", "Veillonella"],
                    1.4,
                ),
            ),
            (
                "CVD",
                DiseaseProfile::new(
                    &["Prevotella", "Roseburia", "Faecalibacterium"],
                    &["Klebsiella", "Streptococcus", "Enterobacter"],
                    1.3,
                ),
            ),
            (
                "Hypertension",
                DiseaseProfile::new(
                    &["Butyricimonas", "Akkermansia", "Faecalibacterium"],
                    &["Desulfovibrio", "Klebsiella", "Streptococcus"],
                    1.1,
                ),
            ),
            (
                "Depression",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Lactobacillus", "Faecalibacterium"],
                    &["Eggerthella", "Veillonella", "Alistipes"],
                    1.2,
                ),
            ),
            (
                "Alzheimer",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Odoribacter", "Faecalibacterium"],
                    &["Escherichia", "Staphylococcus", "Bacteroides"],
                    1.5,
                ),
            ),
            (
                "Constipation",
                DiseaseProfile::new(
                    &["Lactobacillus", "Bifidobacterium", "Prevotella"],
                    &["Clostridium", "Veillonella", "Methanobrevibacter"],
                    1.0,
                ),
            ),
            (
                "Polyps",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Lactobacillus"],
                    &["Fusobacterium", "Peptostreptococcus", "Dorea"],
                    1.3,
                ),
            ),
            (
                "Gout",
                DiseaseProfile::new(
                    &["Faecalibacterium", "Bifidobacterium", "Roseburia"],
                    &["Bacteroides", "Prevotella", "Escherichia"],
                    1.1,
                ),
            ),
            (
                "Eczema",
                DiseaseProfile::new(
                    &["Bifidobacterium", "Lactobacillus", "Ruminococcus"],
                    &["Bacteroides", "Veillonella", "Escherichia"],
                    1.0,
                ),
            ),
        ];

        Self {
            diseases: entries
                .into_iter()
                .map(|(code, profile)| (code.to_string(), profile))
                .collect(),
        }
    }
}

impl Default for DiseaseDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceData for DiseaseDatabase {
    const KIND: &'static str = "disease associations";

    fn validate(&self) -> Result<()> {
        for (code, profile) in &self.diseases {
            if !profile.weight.is_finite() || profile.weight < 1.0 {
                return Err(ProfileError::InvalidReference(format!(
                    "{code}: disease weight {} must be >= 1.0",
                    profile.weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_database_has_fourteen_diseases() {
        let db = DiseaseDatabase::builtin();
        assert_eq!(db.diseases.len(), 14);
        assert!(db.validate().is_ok());
        assert_eq!(db.diseases["CRC"].weight, 1.8);
        assert_eq!(db.diseases["CRC"].harmful[0], "Fusobacterium");
    }

    #[test]
    fn weight_defaults_to_one() {
        let db: DiseaseDatabase =
            serde_json::from_str(r#"{"X": {"beneficial": [], "harmful": ["Escherichia"]}}"#).unwrap();
        assert_eq!(db.diseases["X"].weight, 1.0);
    }

    #[test]
    fn rejects_light_weights() {
        let mut db = DiseaseDatabase::builtin();
        db.diseases.get_mut("IBD").unwrap().weight = 0.5;
        assert!(matches!(db.validate(), Err(ProfileError::InvalidReference(_))));
    }
}
