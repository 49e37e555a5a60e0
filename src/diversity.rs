// src/diversity.rs

//! Alpha diversity, phylum balance, and composition summaries for one sample.
//!
//! Shannon, Simpson, Chao1 and Pielou evenness operate on raw read counts with
//! zero-count taxa dropped. The B/F ratio and composition work on rank roll-ups.

use serde::{Deserialize, Serialize};

use crate::abundance::{rollup, round_dp};
use crate::types::{AbundanceTable, Rank};

/// Observed-taxa window considered typical for a healthy gut sample.
pub const NORMAL_OBSERVED_RANGE: (usize, usize) = (350, 770);

/// Reference window for the Bacteroidetes/Firmicutes ratio.
pub const NORMAL_BF_RANGE: (f64, f64) = (0.84, 4.94);

const BACTEROIDETES_NAMES: [&str; 2] = ["Bacteroidetes", "Bacteroidota"];
const FIRMICUTES_NAMES: [&str; 2] = ["Firmicutes", "Bacillota"];

const COMPOSITION_TOP_N: usize = 10;

/// Shannon entropy: H = -Σ p_i * ln(p_i), natural log.
pub fn shannon(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let mut h = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / total as f64;
            h -= p * p.ln();
        }
    }
    h
}

/// Simpson's diversity index: 1 - Σ p_i²
pub fn simpson(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let mut sum_p2 = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / total as f64;
            sum_p2 += p * p;
        }
    }
    1.0 - sum_p2
}

/// Chao1 richness estimator.
///
/// `S_obs + f1² / (2·f2)` with doubletons present, otherwise the
/// bias-corrected `S_obs + f1·(f1-1) / 2` when there is more than one singleton.
pub fn chao1(counts: &[u64]) -> f64 {
    let s_obs = counts.iter().filter(|&&c| c > 0).count() as f64;
    let f1 = counts.iter().filter(|&&c| c == 1).count() as f64;
    let f2 = counts.iter().filter(|&&c| c == 2).count() as f64;

    if f2 > 0.0 {
        s_obs + (f1 * f1) / (2.0 * f2)
    } else if f1 > 1.0 {
        s_obs + f1 * (f1 - 1.0) / 2.0
    } else {
        s_obs
    }
}

/// Pielou evenness J = H / ln(S); defined as 1 for a single taxon.
pub fn pielou_evenness(shannon: f64, observed: usize) -> f64 {
    if observed > 1 {
        shannon / (observed as f64).ln()
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityStatus {
    Low,
    Normal,
    High,
}

impl DiversityStatus {
    pub fn from_observed(observed: usize) -> Self {
        let (lo, hi) = NORMAL_OBSERVED_RANGE;
        if observed < lo {
            DiversityStatus::Low
        } else if observed > hi {
            DiversityStatus::High
        } else {
            DiversityStatus::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaDiversity {
    pub shannon: f64,
    pub simpson: f64,
    pub chao1: f64,
    pub observed_asvs: usize,
    pub evenness: f64,
    pub total_reads: u64,
    pub status: DiversityStatus,
}

/// Alpha diversity over the non-zero counts; `None` when the sample is empty.
pub fn alpha_diversity(table: &AbundanceTable) -> Option<AlphaDiversity> {
    let counts = table.nonzero_counts();
    if counts.is_empty() {
        return None;
    }

    let observed = counts.len();
    let h = shannon(&counts);
    Some(AlphaDiversity {
        shannon: h,
        simpson: simpson(&counts),
        chao1: chao1(&counts),
        observed_asvs: observed,
        evenness: pielou_evenness(h, observed),
        total_reads: table.total_reads(),
        status: DiversityStatus::from_observed(observed),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BfStatus {
    Normal,
    /// Firmicutes dominate.
    Low,
    /// Bacteroidetes dominate.
    High,
    /// No Firmicutes reads, so the ratio has no value.
    Undetermined,
    /// The table carries no Phylum column.
    CannotCompute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BfRatio {
    pub value: Option<f64>,
    pub bacteroidetes: u64,
    pub firmicutes: u64,
    pub status: BfStatus,
}

pub fn bf_ratio(table: &AbundanceTable) -> BfRatio {
    let Some(phyla) = rollup(table, Rank::Phylum) else {
        log::warn!("No Phylum column in sample {}; B/F ratio cannot be computed", table.sample_id);
        return BfRatio {
            value: None,
            bacteroidetes: 0,
            firmicutes: 0,
            status: BfStatus::CannotCompute,
        };
    };

    let bacteroidetes: u64 = BACTEROIDETES_NAMES.iter().map(|n| phyla.get(n)).sum();
    let firmicutes: u64 = FIRMICUTES_NAMES.iter().map(|n| phyla.get(n)).sum();

    if firmicutes == 0 {
        return BfRatio {
            value: None,
            bacteroidetes,
            firmicutes,
            status: BfStatus::Undetermined,
        };
    }

    let ratio = bacteroidetes as f64 / firmicutes as f64;
    let (lo, hi) = NORMAL_BF_RANGE;
    let status = if ratio < lo {
        BfStatus::Low
    } else if ratio > hi {
        BfStatus::High
    } else {
        BfStatus::Normal
    };

    BfRatio {
        value: Some(ratio),
        bacteroidetes,
        firmicutes,
        status,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankComposition {
    pub rank: Rank,
    pub taxa: Vec<String>,
    /// Percent of classified reads at this rank, 3 dp.
    pub abundance: Vec<f64>,
}

/// Top taxa per rank (Phylum through Species) for every rank present with reads.
pub fn composition(table: &AbundanceTable) -> Vec<RankComposition> {
    Rank::ALL[1..]
        .iter()
        .filter_map(|&rank| {
            let top = rollup(table, rank)?.top(COMPOSITION_TOP_N);
            if top.is_empty() {
                return None;
            }
            let (taxa, abundance) = top.into_iter().map(|(n, p)| (n, round_dp(p, 3))).unzip();
            Some(RankComposition {
                rank,
                taxa,
                abundance,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_reads: u64,
    pub total_asvs: usize,
    pub singleton_asvs: usize,
    pub mean_asv_abundance: f64,
    pub max_asv_abundance: u64,
}

pub fn basic_stats(table: &AbundanceTable) -> BasicStats {
    let counts = table.nonzero_counts();
    let total: u64 = counts.iter().sum();
    BasicStats {
        total_reads: table.total_reads(),
        total_asvs: counts.len(),
        singleton_asvs: counts.iter().filter(|&&c| c == 1).count(),
        mean_asv_abundance: if counts.is_empty() {
            0.0
        } else {
            total as f64 / counts.len() as f64
        },
        max_asv_abundance: counts.iter().copied().max().unwrap_or(0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityReport {
    pub alpha_diversity: Option<AlphaDiversity>,
    pub bf_ratio: BfRatio,
    pub composition: Vec<RankComposition>,
    pub basic_stats: BasicStats,
}

pub fn analyze(table: &AbundanceTable) -> DiversityReport {
    let report = DiversityReport {
        alpha_diversity: alpha_diversity(table),
        bf_ratio: bf_ratio(table),
        composition: composition(table),
        basic_stats: basic_stats(table),
    };
    if let Some(alpha) = &report.alpha_diversity {
        log::info!(
            "Diversity for {}: shannon={:.3}, observed={}, status={:?}",
            table.sample_id,
            alpha.shannon,
            alpha.observed_asvs,
            alpha.status
        );
    } else {
        log::warn!("Sample {} has no reads; alpha diversity skipped", table.sample_id);
    }
    report
}
