// src/scoring/disease_risk.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::abundance::{round_dp, AbundanceIndex};
use crate::reference::{DiseaseDatabase, DiseaseProfile};

/// Per-taxon cap on both beneficial and harmful contributions.
const TAXON_SCORE_CAP: f64 = 10.0;
const HARMFUL_MULTIPLIER: f64 = 2.0;
const ELEVATED_HARMFUL_PCT: f64 = 1.0;
const DEPLETED_BENEFICIAL_PCT: f64 = 0.1;
const FINDINGS_PER_LIST: usize = 3;
const MAX_FINDINGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 60.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Traffic-light colour used by report templates.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Subhealthy,
    NeedsAttention,
    NeedsIntervention,
}

impl HealthStatus {
    pub fn from_average_risk(avg: f64) -> Self {
        if avg < 30.0 {
            HealthStatus::Healthy
        } else if avg < 50.0 {
            HealthStatus::Subhealthy
        } else if avg < 70.0 {
            HealthStatus::NeedsAttention
        } else {
            HealthStatus::NeedsIntervention
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingDirection {
    Elevated,
    Depleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFinding {
    pub taxon: String,
    pub abundance: f64,
    pub direction: FindingDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRisk {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// `risk_level.color()`, kept on the record for report templates.
    pub color: String,
    pub beneficial_score: f64,
    pub harmful_score: f64,
    pub key_findings: Vec<KeyFinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRisk {
    pub average_risk_score: f64,
    pub high_risk_diseases: usize,
    pub health_status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRiskReport {
    pub disease_risks: BTreeMap<String, DiseaseRisk>,
    pub overall_risk: OverallRisk,
    /// Diseases at medium or high risk, in database order.
    pub prevention_targets: Vec<String>,
    /// Advice for every prevention target.
    pub prevention_advice: BTreeMap<String, PreventionAdvice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreventionTag {
    HighFiberDiet,
    AvoidSpicyFood,
    LowSugarLowFatDiet,
    WholeGrains,
    MoreVegetablesAndFruit,
    LessRedAndProcessedMeat,
    MediterraneanDiet,
    Omega3RichFoods,
    LowSaltLowFatDiet,
    BalancedDiet,
    RegularRoutine,
    ModerateExercise,
    RegularExercise,
    StressManagement,
    WeightControl,
    RegularScreening,
    AvoidSmokingLimitAlcohol,
    AdequateSleep,
    SocialActivity,
    BloodPressureAndLipidControl,
    Probiotics,
    Prebiotics,
    Omega3,
    DietaryFiber,
    VitaminD,
    VitaminB,
    CoenzymeQ10,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventionAdvice {
    pub diet: Vec<PreventionTag>,
    pub lifestyle: Vec<PreventionTag>,
    pub supplements: Vec<PreventionTag>,
}

impl PreventionAdvice {
    /// Disease-specific advice, or general gut-health advice for codes without any.
    pub fn for_disease(code: &str) -> Self {
        use PreventionTag::*;
        let (diet, lifestyle, supplements): (&[PreventionTag], &[PreventionTag], &[PreventionTag]) =
            match code {
                "IBD" => (
                    &[HighFiberDiet, AvoidSpicyFood],
                    &[RegularRoutine, ModerateExercise, StressManagement],
                    &[Probiotics, Prebiotics, Omega3],
                ),
                "Diabetes" => (
                    &[LowSugarLowFatDiet, WholeGrains],
                    &[RegularExercise, WeightControl],
                    &[DietaryFiber, Probiotics],
                ),
                "CRC" => (
                    &[MoreVegetablesAndFruit, LessRedAndProcessedMeat],
                    &[RegularScreening, AvoidSmokingLimitAlcohol],
                    &[DietaryFiber, Probiotics, VitaminD],
                ),
                "Depression" => (
                    &[MediterraneanDiet, Omega3RichFoods],
                    &[RegularExercise, AdequateSleep, SocialActivity],
                    &[Probiotics, VitaminB, Omega3],
                ),
                "CVD" => (
                    &[LowSaltLowFatDiet, MoreVegetablesAndFruit, WholeGrains],
                    &[RegularExercise, BloodPressureAndLipidControl],
                    &[DietaryFiber, Omega3, CoenzymeQ10],
                ),
                _ => (
                    &[BalancedDiet, HighFiberDiet],
                    &[RegularRoutine, ModerateExercise],
                    &[Probiotics, Prebiotics],
                ),
            };
        Self {
            diet: diet.to_vec(),
            lifestyle: lifestyle.to_vec(),
            supplements: supplements.to_vec(),
        }
    }
}

/// `clamp(50 + 2·(harmful - beneficial), 0, 100) · weight`, capped at 100.
pub fn risk_score(beneficial_score: f64, harmful_score: f64, weight: f64) -> f64 {
    let raw_risk = harmful_score - beneficial_score;
    let normalized = (50.0 + raw_risk * 2.0).clamp(0.0, 100.0);
    (normalized * weight).min(100.0)
}

pub struct DiseaseRiskAssessor<'a> {
    database: &'a DiseaseDatabase,
}

impl<'a> DiseaseRiskAssessor<'a> {
    pub fn new(database: &'a DiseaseDatabase) -> Self {
        Self { database }
    }

    pub fn assess(&self, index: &AbundanceIndex) -> DiseaseRiskReport {
        let mut disease_risks = BTreeMap::new();
        let mut raw_scores = Vec::with_capacity(self.database.diseases.len());

        for (code, profile) in &self.database.diseases {
            let (risk, raw) = assess_disease(index, profile);
            log::debug!(
                "{code}: beneficial={:.2} harmful={:.2} risk={raw:.1}",
                risk.beneficial_score,
                risk.harmful_score
            );
            raw_scores.push(raw);
            disease_risks.insert(code.clone(), risk);
        }

        let average = if raw_scores.is_empty() {
            0.0
        } else {
            raw_scores.iter().sum::<f64>() / raw_scores.len() as f64
        };
        let high_risk_diseases = disease_risks
            .values()
            .filter(|r| r.risk_level == RiskLevel::High)
            .count();
        let prevention_targets: Vec<String> = disease_risks
            .iter()
            .filter(|(_, r)| r.risk_level != RiskLevel::Low)
            .map(|(code, _)| code.clone())
            .collect();
        let prevention_advice = prevention_targets
            .iter()
            .map(|code| (code.clone(), PreventionAdvice::for_disease(code)))
            .collect();

        log::info!(
            "Disease risk: average={average:.1}, high-risk diseases={high_risk_diseases}"
        );

        DiseaseRiskReport {
            disease_risks,
            overall_risk: OverallRisk {
                average_risk_score: round_dp(average, 1),
                high_risk_diseases,
                health_status: HealthStatus::from_average_risk(average),
            },
            prevention_targets,
            prevention_advice,
        }
    }
}

fn assess_disease(index: &AbundanceIndex, profile: &DiseaseProfile) -> (DiseaseRisk, f64) {
    let beneficial_score: f64 = profile
        .beneficial
        .iter()
        .map(|taxon| index.abundance_of(taxon).min(TAXON_SCORE_CAP))
        .sum();
    let harmful_score: f64 = profile
        .harmful
        .iter()
        .map(|taxon| (index.abundance_of(taxon) * HARMFUL_MULTIPLIER).min(TAXON_SCORE_CAP))
        .sum();

    let risk = risk_score(beneficial_score, harmful_score, profile.weight);
    let risk_level = RiskLevel::from_score(risk);
    let record = DiseaseRisk {
        risk_score: round_dp(risk, 1),
        risk_level,
        color: risk_level.color().to_string(),
        beneficial_score: round_dp(beneficial_score, 2),
        harmful_score: round_dp(harmful_score, 2),
        key_findings: key_findings(index, profile),
    };
    (record, risk)
}

/// Elevated harmful taxa first, then depleted beneficial ones, from the head of each list.
fn key_findings(index: &AbundanceIndex, profile: &DiseaseProfile) -> Vec<KeyFinding> {
    let elevated = profile.harmful.iter().take(FINDINGS_PER_LIST).filter_map(|taxon| {
        let abundance = index.abundance_of(taxon);
        (abundance > ELEVATED_HARMFUL_PCT).then(|| KeyFinding {
            taxon: taxon.clone(),
            abundance: round_dp(abundance, 2),
            direction: FindingDirection::Elevated,
        })
    });
    let depleted = profile.beneficial.iter().take(FINDINGS_PER_LIST).filter_map(|taxon| {
        let abundance = index.abundance_of(taxon);
        (abundance < DEPLETED_BENEFICIAL_PCT).then(|| KeyFinding {
            taxon: taxon.clone(),
            abundance: round_dp(abundance, 2),
            direction: FindingDirection::Depleted,
        })
    });

    elevated.chain(depleted).take(MAX_FINDINGS).collect()
}
