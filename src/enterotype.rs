//src/enterotype.rs

use serde::{Deserialize, Serialize};

use crate::abundance::{rollup, round_dp, RankRollup};
use crate::types::{AbundanceTable, Rank};

const GENUS_PROFILE_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterotypeKind {
    BacteroidesDominant,
    PrevotellaDominant,
    RuminococcusDominant,
}

impl EnterotypeKind {
    pub fn label(&self) -> &'static str {
        match self {
            EnterotypeKind::BacteroidesDominant => "Bacteroides-dominant",
            EnterotypeKind::PrevotellaDominant => "Prevotella-dominant",
            EnterotypeKind::RuminococcusDominant => "Ruminococcus-dominant",
        }
    }

    pub fn dominant_genus(&self) -> &'static str {
        match self {
            EnterotypeKind::BacteroidesDominant => "Bacteroides",
            EnterotypeKind::PrevotellaDominant => "Prevotella",
            EnterotypeKind::RuminococcusDominant => "Ruminococcus",
        }
    }

    /// Dietary pattern typically associated with the community type.
    pub fn diet_association(&self) -> DietAssociation {
        match self {
            EnterotypeKind::BacteroidesDominant => DietAssociation::ProteinAndFat,
            EnterotypeKind::PrevotellaDominant => DietAssociation::FiberAndPlant,
            EnterotypeKind::RuminococcusDominant => DietAssociation::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietAssociation {
    ProteinAndFat,
    FiberAndPlant,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietTag {
    IncreaseFiber,
    ReduceAnimalFat,
    KeepHighFiber,
    ModerateQualityProtein,
    BalancedDiet,
    FoodVariety,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthImplication {
    /// Linked to higher obesity risk; calorie intake worth watching.
    ObesityRisk,
    BetterGlycemicControl,
    /// Intermediate type; read together with the other indicators.
    Intermediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Food {
    WholeGrains,
    Vegetables,
    Fruit,
    Legumes,
    BrownRice,
    Oats,
    LeafyGreens,
    Nuts,
    FermentedFoods,
    PrebioticFoods,
    Fish,
    RedMeat,
    ProcessedMeat,
    HighFatDairy,
    RefinedSugar,
    ProcessedFoods,
    UltraProcessedFoods,
    SugaryDrinks,
}

/// Diet guidance attached to a community type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterotypeFeatures {
    pub diet_recommendation: Vec<DietTag>,
    pub health_implication: HealthImplication,
    pub beneficial_foods: Vec<Food>,
    pub avoid_foods: Vec<Food>,
}

impl EnterotypeFeatures {
    pub fn for_kind(kind: EnterotypeKind) -> Self {
        use Food::*;
        match kind {
            EnterotypeKind::BacteroidesDominant => Self {
                diet_recommendation: vec![DietTag::IncreaseFiber, DietTag::ReduceAnimalFat],
                health_implication: HealthImplication::ObesityRisk,
                beneficial_foods: vec![WholeGrains, Vegetables, Fruit, Legumes],
                avoid_foods: vec![RedMeat, ProcessedMeat, HighFatDairy],
            },
            EnterotypeKind::PrevotellaDominant => Self {
                diet_recommendation: vec![DietTag::KeepHighFiber, DietTag::ModerateQualityProtein],
                health_implication: HealthImplication::BetterGlycemicControl,
                beneficial_foods: vec![BrownRice, Oats, LeafyGreens, Nuts],
                avoid_foods: vec![RefinedSugar, ProcessedFoods],
            },
            EnterotypeKind::RuminococcusDominant => Self {
                diet_recommendation: vec![DietTag::BalancedDiet, DietTag::FoodVariety],
                health_implication: HealthImplication::Intermediate,
                beneficial_foods: vec![FermentedFoods, PrebioticFoods, Fish],
                avoid_foods: vec![UltraProcessedFoods, SugaryDrinks],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// The three composite genus indicators, in percent of classified genus reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub bacteroides: f64,
    pub prevotella: f64,
    pub ruminococcus: f64,
}

impl Indicators {
    pub fn from_genera(genera: &RankRollup) -> Self {
        let total = genera.total();
        if total == 0 {
            return Indicators::default();
        }
        let pct = |reads: u64| reads as f64 / total as f64 * 100.0;
        Indicators {
            bacteroides: pct(genera.get("Bacteroides")),
            prevotella: pct(genus_family_reads(genera, "Prevotella")),
            ruminococcus: pct(genus_family_reads(genera, "Ruminococcus")),
        }
    }

    pub fn sum(&self) -> f64 {
        self.bacteroides + self.prevotella + self.ruminococcus
    }

    fn rounded(&self) -> Self {
        Indicators {
            bacteroides: round_dp(self.bacteroides, 2),
            prevotella: round_dp(self.prevotella, 2),
            ruminococcus: round_dp(self.ruminococcus, 2),
        }
    }
}

/// Reads for `base` plus its numbered sub-variants (`Prevotella_9`, `Ruminococcus_2`).
fn genus_family_reads(genera: &RankRollup, base: &str) -> u64 {
    genera
        .taxa
        .iter()
        .filter(|(name, _)| is_numbered_variant(name, base))
        .map(|(_, c)| c)
        .sum()
}

fn is_numbered_variant(name: &str, base: &str) -> bool {
    match name.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('_')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// Picks the dominant indicator and the confidence tier.
///
/// Ties go to the earlier indicator (Bacteroides, Prevotella, Ruminococcus).
pub fn classify_indicators(ind: &Indicators) -> (EnterotypeKind, Confidence) {
    let candidates = [
        (EnterotypeKind::BacteroidesDominant, ind.bacteroides),
        (EnterotypeKind::PrevotellaDominant, ind.prevotella),
        (EnterotypeKind::RuminococcusDominant, ind.ruminococcus),
    ];

    let (kind, max) = candidates
        .iter()
        .copied()
        .fold(candidates[0], |best, c| if c.1 > best.1 { c } else { best });

    let total = ind.sum();
    let confidence = if total <= 0.0 {
        Confidence::Low
    } else if max / total > 0.5 {
        Confidence::High
    } else if max / total > 0.33 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    (kind, confidence)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenusProfile {
    pub genera: Vec<String>,
    pub abundance: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterotypeReport {
    pub enterotype: EnterotypeKind,
    pub label: String,
    pub dominant_genus: String,
    pub diet_association: DietAssociation,
    pub key_genera_abundance: Indicators,
    pub confidence: Confidence,
    pub features: EnterotypeFeatures,
    pub genus_profile: GenusProfile,
}

/// Classifies the sample's community type from its genus-level roll-up.
///
/// `None` when the table has no Genus column or no classified genus at all.
pub fn classify(table: &AbundanceTable) -> Option<EnterotypeReport> {
    let Some(genera) = rollup(table, Rank::Genus) else {
        log::warn!("No Genus column in sample {}; enterotype skipped", table.sample_id);
        return None;
    };
    if genera.taxa.is_empty() {
        log::warn!("Sample {} has no classified genera; enterotype skipped", table.sample_id);
        return None;
    }

    let indicators = Indicators::from_genera(&genera);
    let (kind, confidence) = classify_indicators(&indicators);
    let (names, abundance) = genera
        .top(GENUS_PROFILE_TOP_N)
        .into_iter()
        .map(|(n, p)| (n, round_dp(p, 3)))
        .unzip();

    log::info!(
        "Enterotype for {}: {} ({:?} confidence)",
        table.sample_id,
        kind.label(),
        confidence
    );

    Some(EnterotypeReport {
        enterotype: kind,
        label: kind.label().to_string(),
        dominant_genus: kind.dominant_genus().to_string(),
        diet_association: kind.diet_association(),
        key_genera_abundance: indicators.rounded(),
        confidence,
        features: EnterotypeFeatures::for_kind(kind),
        genus_profile: GenusProfile {
            genera: names,
            abundance,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxonRecord;

    fn genus_table(rows: &[(&str, u64)]) -> AbundanceTable {
        AbundanceTable::new(
            "S1",
            vec![Rank::Genus],
            rows.iter()
                .enumerate()
                .map(|(i, (g, c))| TaxonRecord::new(i.to_string(), *c).with(Rank::Genus, *g))
                .collect(),
        )
    }

    #[test]
    fn bacteroides_dominant_with_high_confidence() {
        let ind = Indicators {
            bacteroides: 40.0,
            prevotella: 10.0,
            ruminococcus: 5.0,
        };
        assert_eq!(
            classify_indicators(&ind),
            (EnterotypeKind::BacteroidesDominant, Confidence::High)
        );
    }

    #[test]
    fn confidence_tiers() {
        let medium = Indicators {
            bacteroides: 10.0,
            prevotella: 12.0,
            ruminococcus: 8.0,
        };
        assert_eq!(
            classify_indicators(&medium),
            (EnterotypeKind::PrevotellaDominant, Confidence::Medium)
        );

        let zero = Indicators::default();
        assert_eq!(
            classify_indicators(&zero),
            (EnterotypeKind::BacteroidesDominant, Confidence::Low)
        );
    }

    #[test]
    fn ties_go_to_first_indicator() {
        let tie = Indicators {
            bacteroides: 5.0,
            prevotella: 20.0,
            ruminococcus: 20.0,
        };
        assert_eq!(classify_indicators(&tie).0, EnterotypeKind::PrevotellaDominant);
    }

    #[test]
    fn numbered_variants_are_summed() {
        assert!(is_numbered_variant("Prevotella", "Prevotella"));
        assert!(is_numbered_variant("Prevotella_9", "Prevotella"));
        assert!(is_numbered_variant("Ruminococcus_12", "Ruminococcus"));
        assert!(!is_numbered_variant("Ruminococcus_gnavus", "Ruminococcus"));
        assert!(!is_numbered_variant("Prevotellaceae", "Prevotella"));
        assert!(!is_numbered_variant("Prevotella_", "Prevotella"));
    }

    #[test]
    fn classify_from_table() {
        let table = genus_table(&[
            ("g__Prevotella_9", 30),
            ("g__Prevotella", 20),
            ("g__Bacteroides", 25),
            ("g__Ruminococcus_gnavus", 15),
            ("g__Ruminococcus_2", 10),
            ("Unclassified", 400),
        ]);
        let report = classify(&table).unwrap();
        assert_eq!(report.enterotype, EnterotypeKind::PrevotellaDominant);
        assert_eq!(report.dominant_genus, "Prevotella");
        // Ruminococcus_gnavus is not a numbered variant: 50 / 85 of the indicator sum
        assert_eq!(report.confidence, Confidence::High);
        assert_eq!(report.key_genera_abundance.prevotella, 50.0);
        assert_eq!(report.key_genera_abundance.ruminococcus, 10.0);
        assert_eq!(report.genus_profile.genera[0], "Prevotella_9");
    }

    #[test]
    fn features_follow_the_community_type() {
        let table = genus_table(&[("g__Bacteroides", 60), ("g__Prevotella", 10), ("g__Blautia", 30)]);
        let report = classify(&table).unwrap();
        assert_eq!(report.features, EnterotypeFeatures::for_kind(EnterotypeKind::BacteroidesDominant));
        assert_eq!(report.features.health_implication, HealthImplication::ObesityRisk);
        assert!(report.features.avoid_foods.contains(&Food::RedMeat));

        let ruminococcus = EnterotypeFeatures::for_kind(EnterotypeKind::RuminococcusDominant);
        assert_eq!(ruminococcus.beneficial_foods, vec![Food::FermentedFoods, Food::PrebioticFoods, Food::Fish]);

        let json = serde_json::to_string(&report.features).unwrap();
        assert!(json.contains(r#""avoid_foods":["red_meat","processed_meat","high_fat_dairy"]"#));
    }

    #[test]
    fn classify_skips_tables_without_genera() {
        let no_column = AbundanceTable::new("S1", vec![Rank::Phylum], vec![TaxonRecord::new("a", 5)]);
        assert!(classify(&no_column).is_none());
        assert!(classify(&genus_table(&[("Unclassified", 10)])).is_none());
    }
}
