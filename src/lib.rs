// src/lib.rs
pub mod abundance;
pub mod config;
pub mod diversity;
pub mod enterotype;
pub mod error;
pub mod output;
pub mod reference;
pub mod scoring;
pub mod table;
pub mod types;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::abundance::AbundanceIndex;
use crate::config::PipelineConfig;
use crate::diversity::DiversityReport;
use crate::enterotype::EnterotypeReport;
use crate::error::Result;
use crate::reference::ReferenceSet;
use crate::scoring::{
    AgePredictor, AgeReport, BacteriaEvaluation, BacteriaHealthScorer, DiseaseRiskAssessor,
    DiseaseRiskReport,
};
use crate::table::read_abundance_table;
use crate::types::AbundanceTable;

/// All stage records for one sample. Stages never read each other's output,
/// so every field is produced independently from the same table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub sample_id: String,
    pub diversity: DiversityReport,
    /// `None` when the table carries no classified genus.
    pub enterotype: Option<EnterotypeReport>,
    pub bacteria: BacteriaEvaluation,
    pub disease_risk: DiseaseRiskReport,
    pub age: AgeReport,
}

impl SampleReport {
    /// Render the merged report as pretty-printed JSON on demand.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run every stage over one in-memory table.
pub fn analyze_sample(
    table: &AbundanceTable,
    refs: &ReferenceSet,
    config: &PipelineConfig,
) -> SampleReport {
    // 1. One index per sample, shared read-only by the scoring stages
    let index = AbundanceIndex::with_rank(table, config.match_rank);

    // 2. Table-level analyses and index-based scoring are independent
    let ((diversity, enterotype), (bacteria, (disease_risk, age))) = rayon::join(
        || rayon::join(|| diversity::analyze(table), || enterotype::classify(table)),
        || {
            rayon::join(
                || BacteriaHealthScorer::new(&refs.ranges).evaluate(&index),
                || {
                    rayon::join(
                        || DiseaseRiskAssessor::new(&refs.diseases).assess(&index),
                        || AgePredictor::new(&refs.markers).predict(&index, config.chronological_age),
                    )
                },
            )
        },
    );

    SampleReport {
        sample_id: table.sample_id.clone(),
        diversity,
        enterotype,
        bacteria,
        disease_risk,
        age,
    }
}

/// Analyse many independent samples in parallel, preserving input order.
pub fn analyze_tables(
    tables: &[AbundanceTable],
    refs: &ReferenceSet,
    config: &PipelineConfig,
) -> Vec<SampleReport> {
    tables
        .par_iter()
        .map(|table| analyze_sample(table, refs, config))
        .collect()
}

/// Read every table, stopping at the first that fails to load.
pub fn load_tables(paths: &[PathBuf]) -> Result<Vec<AbundanceTable>> {
    let tables = paths
        .iter()
        .map(read_abundance_table)
        .collect::<Result<Vec<_>>>()?;
    log::info!("Loaded {} abundance table(s)", tables.len());
    Ok(tables)
}

/// Load references and tables from disk, then analyse every table.
pub fn run_pipeline(paths: &[PathBuf], config: &PipelineConfig) -> Result<Vec<SampleReport>> {
    let refs = ReferenceSet::from_config(config);
    let tables = load_tables(paths)?;
    Ok(analyze_tables(&tables, &refs, config))
}
