// src/scoring/bacteria_health.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::abundance::{round_dp, AbundanceIndex};
use crate::reference::ReferenceRanges;

/// Points for a beneficial taxon inside its range; also the per-taxon maximum.
pub const BENEFICIAL_FULL_SCORE: f64 = 10.0;
/// Beneficial taxa above range are a mild concern, not a failure.
pub const BENEFICIAL_ABOVE_SCORE: f64 = 8.0;
pub const MAX_HARMFUL_PENALTY: f64 = 20.0;
/// Conditional warnings beyond this count flag the sample for attention.
pub const ATTENTION_WARNING_LIMIT: usize = 3;

const BENEFICIAL_WEIGHT: f64 = 0.4;
const HARMFUL_WEIGHT: f64 = 0.4;
const CONDITIONAL_WEIGHT: f64 = 0.2;
const CONDITIONAL_PENALTY_PER_WARNING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmfulStatus {
    Normal,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalStatus {
    Normal,
    NeedsAttention,
}

/// Score out of 10 for a beneficial taxon against `[min, max]`.
pub fn score_beneficial(abundance: f64, [min, max]: [f64; 2]) -> (RangeStatus, f64) {
    if abundance < min {
        let score = if min > 0.0 {
            5.0 * (abundance / min)
        } else {
            0.0
        };
        (RangeStatus::Low, score)
    } else if abundance > max {
        (RangeStatus::High, BENEFICIAL_ABOVE_SCORE)
    } else {
        (RangeStatus::Normal, BENEFICIAL_FULL_SCORE)
    }
}

/// Penalty grows by 10 points per 100% overshoot of `max`, capped at 20.
pub fn harmful_penalty(abundance: f64, max: f64) -> (HarmfulStatus, f64) {
    if abundance <= max {
        return (HarmfulStatus::Normal, 0.0);
    }
    let penalty = if max > 0.0 {
        ((abundance - max) / max * 10.0).min(MAX_HARMFUL_PENALTY)
    } else {
        MAX_HARMFUL_PENALTY
    };
    (HarmfulStatus::Exceeded, penalty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Evaluation {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Evaluation::Excellent
        } else if score >= 60.0 {
            Evaluation::Good
        } else if score >= 40.0 {
            Evaluation::Fair
        } else {
            Evaluation::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmRisk {
    Low,
    MediumLow,
    MediumHigh,
    High,
}

impl HarmRisk {
    pub fn from_harm_score(score: f64) -> Self {
        if score >= 80.0 {
            HarmRisk::Low
        } else if score >= 60.0 {
            HarmRisk::MediumLow
        } else if score >= 40.0 {
            HarmRisk::MediumHigh
        } else {
            HarmRisk::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl HealthGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthGrade::APlus
        } else if score >= 80.0 {
            HealthGrade::A
        } else if score >= 70.0 {
            HealthGrade::B
        } else if score >= 60.0 {
            HealthGrade::C
        } else {
            HealthGrade::D
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Beneficial score below 60.
    ProbioticSupplement,
    /// Harm score below 70.
    SuppressHarmful,
    /// At least one conditional taxon above its threshold.
    ImmuneSupport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficialTaxon {
    pub abundance: f64,
    pub normal_range: [f64; 2],
    pub status: RangeStatus,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficialSummary {
    pub bacteria: BTreeMap<String, BeneficialTaxon>,
    pub overall_score: f64,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmfulTaxon {
    pub abundance: f64,
    pub threshold: f64,
    pub status: HarmfulStatus,
    pub penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmfulSummary {
    pub bacteria: BTreeMap<String, HarmfulTaxon>,
    pub harm_score: f64,
    pub risk_level: HarmRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalTaxon {
    pub abundance: f64,
    pub threshold: f64,
    pub status: ConditionalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalSummary {
    pub bacteria: BTreeMap<String, ConditionalTaxon>,
    pub warning_count: usize,
    pub attention_needed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthComponents {
    pub beneficial_contribution: f64,
    pub harmful_contribution: f64,
    pub conditional_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallHealth {
    pub score: f64,
    pub grade: HealthGrade,
    pub components: HealthComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacteriaEvaluation {
    pub beneficial_bacteria: BeneficialSummary,
    pub harmful_bacteria: HarmfulSummary,
    pub conditional_bacteria: ConditionalSummary,
    pub overall_health: OverallHealth,
    pub recommendations: Vec<Recommendation>,
}

/// Scores a sample's taxa against beneficial/harmful/conditional reference ranges.
pub struct BacteriaHealthScorer<'a> {
    ranges: &'a ReferenceRanges,
}

impl<'a> BacteriaHealthScorer<'a> {
    pub fn new(ranges: &'a ReferenceRanges) -> Self {
        Self { ranges }
    }

    pub fn evaluate(&self, index: &AbundanceIndex) -> BacteriaEvaluation {
        let (beneficial_bacteria, beneficial_raw) = self.beneficial(index);
        let (harmful_bacteria, harm_raw) = self.harmful(index);
        let conditional_bacteria = self.conditional(index);

        let conditional_raw = (100.0
            - CONDITIONAL_PENALTY_PER_WARNING * conditional_bacteria.warning_count as f64)
            .max(0.0);
        let components = HealthComponents {
            beneficial_contribution: beneficial_raw * BENEFICIAL_WEIGHT,
            harmful_contribution: harm_raw * HARMFUL_WEIGHT,
            conditional_contribution: conditional_raw * CONDITIONAL_WEIGHT,
        };
        let score = components.beneficial_contribution
            + components.harmful_contribution
            + components.conditional_contribution;

        let mut recommendations = Vec::new();
        if beneficial_raw < 60.0 {
            recommendations.push(Recommendation::ProbioticSupplement);
        }
        if harm_raw < 70.0 {
            recommendations.push(Recommendation::SuppressHarmful);
        }
        if conditional_bacteria.warning_count > 0 {
            recommendations.push(Recommendation::ImmuneSupport);
        }

        log::info!(
            "Bacteria health: beneficial={beneficial_raw:.1}, harm={harm_raw:.1}, warnings={}, overall={score:.1}",
            conditional_bacteria.warning_count
        );

        BacteriaEvaluation {
            beneficial_bacteria,
            harmful_bacteria,
            conditional_bacteria,
            overall_health: OverallHealth {
                score: round_dp(score, 1),
                grade: HealthGrade::from_score(score),
                components: HealthComponents {
                    beneficial_contribution: round_dp(components.beneficial_contribution, 1),
                    harmful_contribution: round_dp(components.harmful_contribution, 1),
                    conditional_contribution: round_dp(components.conditional_contribution, 1),
                },
            },
            recommendations,
        }
    }

    /// Returns the summary plus the unrounded aggregate score.
    fn beneficial(&self, index: &AbundanceIndex) -> (BeneficialSummary, f64) {
        let mut bacteria = BTreeMap::new();
        let mut total = 0.0;
        for (name, &range) in &self.ranges.beneficial {
            let abundance = index.abundance_of(name);
            let (status, score) = score_beneficial(abundance, range);
            total += score;
            bacteria.insert(
                name.clone(),
                BeneficialTaxon {
                    abundance: round_dp(abundance, 4),
                    normal_range: range,
                    status,
                    score: round_dp(score, 2),
                },
            );
        }

        let max_total = BENEFICIAL_FULL_SCORE * bacteria.len() as f64;
        let overall = if max_total > 0.0 {
            total / max_total * 100.0
        } else {
            0.0
        };
        let summary = BeneficialSummary {
            bacteria,
            overall_score: round_dp(overall, 1),
            evaluation: Evaluation::from_score(overall),
        };
        (summary, overall)
    }

    fn harmful(&self, index: &AbundanceIndex) -> (HarmfulSummary, f64) {
        let mut bacteria = BTreeMap::new();
        let mut total_penalty = 0.0;
        for (name, &[_, max]) in &self.ranges.harmful {
            let abundance = index.abundance_of(name);
            let (status, penalty) = harmful_penalty(abundance, max);
            total_penalty += penalty;
            bacteria.insert(
                name.clone(),
                HarmfulTaxon {
                    abundance: round_dp(abundance, 4),
                    threshold: max,
                    status,
                    penalty: round_dp(penalty, 2),
                },
            );
        }

        let harm_score = (100.0 - total_penalty).max(0.0);
        let summary = HarmfulSummary {
            bacteria,
            harm_score: round_dp(harm_score, 1),
            risk_level: HarmRisk::from_harm_score(harm_score),
        };
        (summary, harm_score)
    }

    fn conditional(&self, index: &AbundanceIndex) -> ConditionalSummary {
        let mut bacteria = BTreeMap::new();
        let mut warning_count = 0;
        for (name, &[_, max]) in &self.ranges.conditional {
            let abundance = index.abundance_of(name);
            let status = if abundance <= max {
                ConditionalStatus::Normal
            } else {
                warning_count += 1;
                ConditionalStatus::NeedsAttention
            };
            bacteria.insert(
                name.clone(),
                ConditionalTaxon {
                    abundance: round_dp(abundance, 4),
                    threshold: max,
                    status,
                },
            );
        }

        ConditionalSummary {
            bacteria,
            warning_count,
            attention_needed: warning_count > ATTENTION_WARNING_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbundanceTable, Rank, TaxonRecord};

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

    fn ranges(beneficial: &[(&str, [f64; 2])], harmful: &[(&str, [f64; 2])], conditional: &[(&str, [f64; 2])]) -> ReferenceRanges {
        let map = |rows: &[(&str, [f64; 2])]| rows.iter().map(|(n, r)| (n.to_string(), *r)).collect();
        ReferenceRanges {
            beneficial: map(beneficial),
            harmful: map(harmful),
            conditional: map(conditional),
        }
    }

    #[test]
    fn beneficial_at_min_scores_full() {
        assert_eq!(score_beneficial(0.5, [0.5, 2.0]), (RangeStatus::Normal, 10.0));
        assert_eq!(score_beneficial(0.25, [0.5, 2.0]), (RangeStatus::Low, 2.5));
        assert_eq!(score_beneficial(3.0, [0.5, 2.0]), (RangeStatus::High, 8.0));
        assert_eq!(score_beneficial(0.0, [0.0, 2.0]), (RangeStatus::Normal, 10.0));
    }

    #[test]
    fn harmful_penalty_caps() {
        assert_eq!(harmful_penalty(0.5, 0.5), (HarmfulStatus::Normal, 0.0));
        // 50% overshoot -> 5 points
        let (status, penalty) = harmful_penalty(0.75, 0.5);
        assert_eq!(status, HarmfulStatus::Exceeded);
        assert!((penalty - 5.0).abs() < 1e-12);
        assert_eq!(harmful_penalty(10.0, 0.5).1, 20.0);
        assert_eq!(harmful_penalty(0.01, 0.0), (HarmfulStatus::Exceeded, 20.0));
    }

    #[test]
    fn grades_follow_bands() {
        assert_eq!(HealthGrade::from_score(90.0), HealthGrade::APlus);
        assert_eq!(HealthGrade::from_score(89.99), HealthGrade::A);
        assert_eq!(HealthGrade::from_score(70.0), HealthGrade::B);
        assert_eq!(HealthGrade::from_score(60.0), HealthGrade::C);
        assert_eq!(HealthGrade::from_score(59.9), HealthGrade::D);
    }

    #[test]
    fn grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&HealthGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&HealthGrade::C).unwrap(), "\"C\"");
    }

    #[test]
    fn healthy_sample_scores_a_plus() {
        // 10% Bifidobacterium, 90% other; no harmful or conditional taxa
        let index = genus_index(&[("g__Bifidobacterium", 10), ("g__Blautia", 90)]);
        let refs = ranges(&[("Bifidobacterium", [1.0, 20.0])], &[("Escherichia", [0.0, 0.5])], &[("Veillonella", [0.0, 0.22])]);
        let eval = BacteriaHealthScorer::new(&refs).evaluate(&index);

        assert_eq!(eval.beneficial_bacteria.overall_score, 100.0);
        assert_eq!(eval.harmful_bacteria.harm_score, 100.0);
        assert_eq!(eval.conditional_bacteria.warning_count, 0);
        assert_eq!(eval.overall_health.score, 100.0);
        assert_eq!(eval.overall_health.grade, HealthGrade::APlus);
        assert!(eval.recommendations.is_empty());
    }

    #[test]
    fn dysbiotic_sample_gets_recommendations() {
        let index = genus_index(&[
            ("g__Escherichia", 30),
            ("g__Veillonella", 10),
            ("g__Streptococcus", 10),
            ("g__Blautia", 50),
        ]);
        let refs = ranges(
            &[("Bifidobacterium", [1.0, 20.0]), ("Akkermansia", [0.01, 3.89])],
            &[("Escherichia", [0.0, 0.5])],
            &[("Veillonella", [0.0, 0.22]), ("Streptococcus", [0.0, 2.0])],
        );
        let eval = BacteriaHealthScorer::new(&refs).evaluate(&index);

        assert_eq!(eval.beneficial_bacteria.overall_score, 0.0);
        assert_eq!(eval.beneficial_bacteria.evaluation, Evaluation::Poor);
        assert_eq!(eval.harmful_bacteria.harm_score, 80.0);
        assert_eq!(eval.harmful_bacteria.risk_level, HarmRisk::Low);
        assert_eq!(eval.conditional_bacteria.warning_count, 2);
        assert!(!eval.conditional_bacteria.attention_needed);
        // 0.4·0 + 0.4·80 + 0.2·(100 - 10)
        assert_eq!(eval.overall_health.score, 50.0);
        assert_eq!(eval.overall_health.grade, HealthGrade::D);
        assert_eq!(
            eval.recommendations,
            vec![Recommendation::ProbioticSupplement, Recommendation::ImmuneSupport]
        );
    }

    #[test]
    fn attention_needs_more_than_three_warnings() {
        let index = genus_index(&[("g__A", 1), ("g__B", 1), ("g__C", 1), ("g__D", 1)]);
        let refs = ranges(&[], &[], &[("A", [0.0, 1.0]), ("B", [0.0, 1.0]), ("C", [0.0, 1.0]), ("D", [0.0, 1.0])]);
        let eval = BacteriaHealthScorer::new(&refs).evaluate(&index);
        assert_eq!(eval.conditional_bacteria.warning_count, 4);
        assert!(eval.conditional_bacteria.attention_needed);
        // no beneficial taxa configured -> 0
        assert_eq!(eval.beneficial_bacteria.overall_score, 0.0);
    }
}
