// src/scoring/mod.rs
pub mod age_predict;
pub mod bacteria_health;
pub mod disease_risk;

pub use age_predict::{AgePredictor, AgeReport};
pub use bacteria_health::{BacteriaEvaluation, BacteriaHealthScorer};
pub use disease_risk::{DiseaseRiskAssessor, DiseaseRiskReport};
