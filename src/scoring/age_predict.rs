// src/scoring/age_predict.rs

use serde::{Deserialize, Serialize};

use crate::abundance::{round_dp, AbundanceIndex};
use crate::reference::{AgeMarkers, AgingMarker, YouthMarker};

pub const MIN_BIOLOGICAL_AGE: f64 = 20.0;
pub const MAX_BIOLOGICAL_AGE: f64 = 90.0;
/// An aging marker contributes at most twice its weight.
pub const AGING_SCORE_CAP: f64 = 2.0;
/// Years of difference still counted as "same age".
pub const SAME_AGE_BAND: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    Optimal,
    Low,
    High,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerBasis {
    Youth { optimal_range: [f64; 2] },
    Aging { threshold: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetail {
    pub taxon: String,
    pub abundance: f64,
    pub basis: MarkerBasis,
    pub status: MarkerStatus,
    /// Signed years added to the baseline.
    pub contribution: f64,
}

/// Markers reported as the main drivers of the estimate.
pub const TOP_MARKER_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgePrediction {
    pub biological_age: f64,
    pub baseline_age: f64,
    pub age_adjustment: f64,
    pub youth_score: f64,
    pub aging_score: f64,
    pub markers: Vec<MarkerDetail>,
    /// Taxa with the largest absolute contribution, largest first.
    pub top_markers: Vec<String>,
}

/// Markers sorted by descending |contribution|; ties keep input order.
pub fn rank_markers(markers: &[MarkerDetail], n: usize) -> Vec<&MarkerDetail> {
    let mut sorted: Vec<&MarkerDetail> = markers.iter().collect();
    sorted.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLevel {
    Slow,
    Normal,
    Faster,
    Fast,
}

impl RateLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate < 0.5 {
            RateLevel::Slow
        } else if rate < 1.0 {
            RateLevel::Normal
        } else if rate < 2.0 {
            RateLevel::Faster
        } else {
            RateLevel::Fast
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRate {
    pub rate_score: f64,
    pub rate_level: RateLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeComparison {
    Younger,
    Same,
    Older,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Young,
    MiddleAged,
    Mature,
    Senior,
}

impl LifeStage {
    pub fn from_age(age: f64) -> Self {
        if age < 35.0 {
            LifeStage::Young
        } else if age < 50.0 {
            LifeStage::MiddleAged
        } else if age < 65.0 {
            LifeStage::Mature
        } else {
            LifeStage::Senior
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeStatus {
    Comparison {
        chronological_age: f64,
        biological_age: f64,
        age_difference: f64,
        status: AgeComparison,
    },
    LifeStage {
        biological_age: f64,
        stage: LifeStage,
    },
}

impl AgeStatus {
    pub fn new(biological_age: f64, chronological_age: Option<f64>) -> Self {
        match chronological_age {
            Some(chronological_age) => {
                let diff = biological_age - chronological_age;
                let status = if diff < -SAME_AGE_BAND {
                    AgeComparison::Younger
                } else if diff > SAME_AGE_BAND {
                    AgeComparison::Older
                } else {
                    AgeComparison::Same
                };
                AgeStatus::Comparison {
                    chronological_age,
                    biological_age,
                    age_difference: round_dp(diff, 1),
                    status,
                }
            }
            None => AgeStatus::LifeStage {
                biological_age,
                stage: LifeStage::from_age(biological_age),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTag {
    FermentedDairy,
    FermentedVegetables,
    WholeGrainsAndLegumes,
    DietaryFiber,
    ReduceFatAndSugar,
    Polyphenols,
    MediterraneanDiet,
    RegularExercise,
    AdequateSleep,
    StressManagement,
    SocialActivity,
    BifidobacteriaProbiotic,
    LactobacillusProbiotic,
    Prebiotics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejuvenationAdvice {
    pub dietary: Vec<AdviceTag>,
    pub lifestyle: Vec<AdviceTag>,
    pub supplements: Vec<AdviceTag>,
}

/// Advice attached to a depleted youth marker: (taxon, dietary, supplement).
const LOW_YOUTH_ADVICE: [(&str, AdviceTag, Option<AdviceTag>); 4] = [
    ("Bifidobacterium", AdviceTag::FermentedDairy, Some(AdviceTag::BifidobacteriaProbiotic)),
    ("Lactobacillus", AdviceTag::FermentedVegetables, Some(AdviceTag::LactobacillusProbiotic)),
    ("Prevotella", AdviceTag::WholeGrainsAndLegumes, None),
    ("Faecalibacterium", AdviceTag::DietaryFiber, Some(AdviceTag::Prebiotics)),
];

impl RejuvenationAdvice {
    pub fn from_markers(markers: &[MarkerDetail]) -> Self {
        let mut advice = RejuvenationAdvice::default();

        let is_low_youth = |name: &str| {
            markers.iter().any(|m| {
                m.taxon == name
                    && m.status == MarkerStatus::Low
                    && matches!(m.basis, MarkerBasis::Youth { .. })
            })
        };
        for (taxon, dietary, supplement) in LOW_YOUTH_ADVICE {
            if is_low_youth(taxon) {
                advice.dietary.push(dietary);
                advice.supplements.extend(supplement);
            }
        }

        let aging_elevated = markers
            .iter()
            .any(|m| m.status == MarkerStatus::High && matches!(m.basis, MarkerBasis::Aging { .. }));
        if aging_elevated {
            advice.dietary.push(AdviceTag::ReduceFatAndSugar);
            advice.dietary.push(AdviceTag::Polyphenols);
            advice.lifestyle.push(AdviceTag::RegularExercise);
            advice.lifestyle.push(AdviceTag::AdequateSleep);
        }

        advice.lifestyle.push(AdviceTag::StressManagement);
        advice.lifestyle.push(AdviceTag::SocialActivity);
        advice.dietary.push(AdviceTag::MediterraneanDiet);
        advice
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeReport {
    pub age_prediction: AgePrediction,
    pub age_status: AgeStatus,
    pub aging_rate: AgingRate,
    pub rejuvenation_advice: RejuvenationAdvice,
}

/// 1.0 inside the optimal range, proportional below it, decaying linearly above it.
pub fn youth_marker_score(abundance: f64, [min, max]: [f64; 2]) -> (MarkerStatus, f64) {
    if abundance < min {
        let score = if min > 0.0 { abundance / min } else { 0.0 };
        (MarkerStatus::Low, score)
    } else if abundance > max {
        let score = if max > 0.0 {
            (1.0 - (abundance - max) / max).max(0.0)
        } else {
            0.0
        };
        (MarkerStatus::High, score)
    } else {
        (MarkerStatus::Optimal, 1.0)
    }
}

/// Fold-over-threshold, capped at [`AGING_SCORE_CAP`]; 0 at or below the threshold.
pub fn aging_marker_score(abundance: f64, threshold: f64) -> (MarkerStatus, f64) {
    if abundance > threshold {
        let score = if threshold > 0.0 {
            (abundance / threshold).min(AGING_SCORE_CAP)
        } else {
            AGING_SCORE_CAP
        };
        (MarkerStatus::High, score)
    } else {
        (MarkerStatus::Normal, 0.0)
    }
}

pub struct AgePredictor<'a> {
    markers: &'a AgeMarkers,
}

impl<'a> AgePredictor<'a> {
    pub fn new(markers: &'a AgeMarkers) -> Self {
        Self { markers }
    }

    pub fn predict(&self, index: &AbundanceIndex, chronological_age: Option<f64>) -> AgeReport {
        let mut adjustment = 0.0;
        let mut youth_score = 0.0;
        let mut aging_score = 0.0;
        let mut details = Vec::new();

        for (taxon, &YouthMarker { weight, optimal_range }) in &self.markers.youth_associated {
            let abundance = index.abundance_of(taxon);
            let (status, score) = youth_marker_score(abundance, optimal_range);
            youth_score += score * weight.abs();
            adjustment += score * weight;
            details.push(MarkerDetail {
                taxon: taxon.clone(),
                abundance: round_dp(abundance, 3),
                basis: MarkerBasis::Youth { optimal_range },
                status,
                contribution: round_dp(score * weight, 2),
            });
        }

        for (taxon, &AgingMarker { weight, threshold }) in &self.markers.aging_associated {
            let abundance = index.abundance_of(taxon);
            let (status, score) = aging_marker_score(abundance, threshold);
            aging_score += score * weight;
            adjustment += score * weight;
            details.push(MarkerDetail {
                taxon: taxon.clone(),
                abundance: round_dp(abundance, 3),
                basis: MarkerBasis::Aging { threshold },
                status,
                contribution: round_dp(score * weight, 2),
            });
        }

        let biological_age = (self.markers.baseline_age + adjustment)
            .clamp(MIN_BIOLOGICAL_AGE, MAX_BIOLOGICAL_AGE);
        let reported_age = round_dp(biological_age, 1);
        let rate = aging_score / (youth_score + 1.0);

        log::info!(
            "Biological age {reported_age:.1} (baseline {}, adjustment {adjustment:+.2})",
            self.markers.baseline_age
        );

        let rejuvenation_advice = RejuvenationAdvice::from_markers(&details);
        let top_markers = rank_markers(&details, TOP_MARKER_COUNT)
            .into_iter()
            .map(|m| m.taxon.clone())
            .collect();
        AgeReport {
            age_prediction: AgePrediction {
                biological_age: reported_age,
                baseline_age: self.markers.baseline_age,
                age_adjustment: round_dp(adjustment, 1),
                youth_score: round_dp(youth_score, 2),
                aging_score: round_dp(aging_score, 2),
                markers: details,
                top_markers,
            },
            age_status: AgeStatus::new(reported_age, chronological_age),
            aging_rate: AgingRate {
                rate_score: round_dp(rate, 2),
                rate_level: RateLevel::from_rate(rate),
            },
            rejuvenation_advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbundanceTable, Rank, TaxonRecord};
    use std::collections::BTreeMap;

    fn genus_index(rows: &[(&str, u64)]) -> AbundanceIndex {
        let table = AbundanceTable::new(
            "S1",
            vec![Rank::Genus],
            rows.iter()
                .enumerate()
                .map(|(i, (g, c))| TaxonRecord::new(i.to_string(), *c).with(Rank::Genus, *g))
                .collect(),
        );
        AbundanceIndex::new(&table)
    }

    fn youth_only(name: &str, weight: f64, range: [f64; 2]) -> AgeMarkers {
        AgeMarkers {
            youth_associated: [(name.to_string(), YouthMarker { weight, optimal_range: range })]
                .into_iter()
                .collect(),
            aging_associated: BTreeMap::new(),
            baseline_age: 40.0,
        }
    }

    #[test]
    fn youth_marker_scoring() {
        assert_eq!(youth_marker_score(10.0, [5.0, 15.0]), (MarkerStatus::Optimal, 1.0));
        assert_eq!(youth_marker_score(2.5, [5.0, 15.0]), (MarkerStatus::Low, 0.5));
        assert_eq!(youth_marker_score(22.5, [5.0, 15.0]), (MarkerStatus::High, 0.5));
        assert_eq!(youth_marker_score(40.0, [5.0, 15.0]), (MarkerStatus::High, 0.0));
        assert_eq!(youth_marker_score(1.0, [0.0, 0.0]), (MarkerStatus::High, 0.0));
    }

    #[test]
    fn aging_marker_scoring() {
        assert_eq!(aging_marker_score(1.0, 1.0), (MarkerStatus::Normal, 0.0));
        assert_eq!(aging_marker_score(1.5, 1.0), (MarkerStatus::High, 1.5));
        assert_eq!(aging_marker_score(9.0, 1.0), (MarkerStatus::High, 2.0));
        assert_eq!(aging_marker_score(0.2, 0.0), (MarkerStatus::High, 2.0));
    }

    #[test]
    fn optimal_youth_marker_lowers_age() {
        let markers = youth_only("Bifidobacterium", -2.5, [5.0, 15.0]);
        let index = genus_index(&[("g__Bifidobacterium", 10), ("g__Blautia", 90)]);
        let report = AgePredictor::new(&markers).predict(&index, None);

        assert_eq!(report.age_prediction.age_adjustment, -2.5);
        assert_eq!(report.age_prediction.biological_age, 37.5);
        assert_eq!(report.age_prediction.youth_score, 2.5);
        assert_eq!(report.aging_rate.rate_level, RateLevel::Slow);
        assert_eq!(
            report.age_status,
            AgeStatus::LifeStage {
                biological_age: 37.5,
                stage: LifeStage::MiddleAged
            }
        );
    }

    #[test]
    fn biological_age_is_clamped() {
        let markers = youth_only("Bifidobacterium", -50.0, [5.0, 15.0]);
        let index = genus_index(&[("g__Bifidobacterium", 10), ("g__Blautia", 90)]);
        let report = AgePredictor::new(&markers).predict(&index, None);
        assert_eq!(report.age_prediction.biological_age, MIN_BIOLOGICAL_AGE);

        let markers = youth_only("Bifidobacterium", 60.0, [5.0, 15.0]);
        let report = AgePredictor::new(&markers).predict(&index, None);
        assert_eq!(report.age_prediction.biological_age, MAX_BIOLOGICAL_AGE);
    }

    #[test]
    fn chronological_age_only_changes_status() {
        let markers = AgeMarkers::builtin();
        let index = genus_index(&[("g__Escherichia", 30), ("g__Klebsiella", 20), ("g__Blautia", 50)]);
        let predictor = AgePredictor::new(&markers);

        let without = predictor.predict(&index, None);
        let with = predictor.predict(&index, Some(30.0));
        assert_eq!(without.age_prediction, with.age_prediction);
        match with.age_status {
            AgeStatus::Comparison { status, age_difference, .. } => {
                assert_eq!(status, AgeComparison::Older);
                assert!(age_difference > 5.0);
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn aging_markers_drive_rate_and_advice() {
        let markers = AgeMarkers::builtin();
        let index = genus_index(&[("g__Escherichia", 30), ("g__Klebsiella", 20), ("g__Blautia", 50)]);
        let report = AgePredictor::new(&markers).predict(&index, None);

        // Escherichia and Klebsiella both hit the 2x cap: 2·2.0 + 2·1.4
        assert_eq!(report.age_prediction.aging_score, 6.8);
        // every youth marker is absent
        assert_eq!(report.age_prediction.youth_score, 0.0);
        assert_eq!(report.aging_rate.rate_level, RateLevel::Fast);
        assert_eq!(report.age_prediction.biological_age, 46.8);

        let advice = &report.rejuvenation_advice;
        assert_eq!(
            advice.dietary,
            vec![
                AdviceTag::FermentedDairy,
                AdviceTag::FermentedVegetables,
                AdviceTag::WholeGrainsAndLegumes,
                AdviceTag::DietaryFiber,
                AdviceTag::ReduceFatAndSugar,
                AdviceTag::Polyphenols,
                AdviceTag::MediterraneanDiet,
            ]
        );
        assert_eq!(advice.supplements.len(), 3);
        assert!(advice.lifestyle.contains(&AdviceTag::RegularExercise));

        let top = &report.age_prediction.top_markers;
        assert_eq!(top.len(), TOP_MARKER_COUNT);
        assert_eq!(top[0], "Escherichia");
        assert_eq!(top[1], "Klebsiella");

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""top_markers":["Escherichia","Klebsiella","#));
    }

    #[test]
    fn same_age_band_is_inclusive() {
        assert!(matches!(
            AgeStatus::new(45.0, Some(40.0)),
            AgeStatus::Comparison { status: AgeComparison::Same, .. }
        ));
        assert!(matches!(
            AgeStatus::new(34.9, Some(40.0)),
            AgeStatus::Comparison { status: AgeComparison::Younger, .. }
        ));
    }
}
