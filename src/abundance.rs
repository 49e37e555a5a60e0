//src/abundance.rs

use ahash::AHashMap;

use crate::types::{AbundanceTable, Rank};

/// Label marking reads the classifier could not place at a rank.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Strips every occurrence of the rank's prefix marker and trims whitespace.
pub fn clean_label(raw: &str, rank: Rank) -> String {
    raw.replace(rank.prefix(), "").trim().to_string()
}

/// Bidirectional, case-insensitive substring match on already-cleaned labels.
///
/// Short names will over-match (`Ruminococcus` also hits `Ruminococcus_gnavus`);
/// callers rely on this for genus families like `Prevotella_9`.
pub fn fuzzy_match(query: &str, label: &str) -> bool {
    matches_lowered(&query.to_lowercase(), &label.to_lowercase())
}

fn matches_lowered(query: &str, label: &str) -> bool {
    !label.is_empty() && (label.contains(query) || query.contains(label))
}

pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Read counts summed per cleaned label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankRollup {
    pub taxa: Vec<(String, u64)>,
}

impl RankRollup {
    pub fn total(&self) -> u64 {
        self.taxa.iter().map(|(_, c)| c).sum()
    }

    pub fn get(&self, name: &str) -> u64 {
        self.taxa
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Percent of the rolled-up total for each label; empty when the total is 0.
    pub fn relative(&self) -> Vec<(String, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        self.taxa
            .iter()
            .map(|(n, c)| (n.clone(), *c as f64 / total as f64 * 100.0))
            .collect()
    }

    /// Labels sorted by descending count; ties keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(String, f64)> {
        let mut rel = self.relative();
        rel.sort_by(|a, b| b.1.total_cmp(&a.1));
        rel.truncate(n);
        rel
    }
}

/// Sums counts per cleaned label at `rank`, skipping missing and unclassified cells.
///
/// Returns `None` when the table has no column for the rank.
pub fn rollup(table: &AbundanceTable, rank: Rank) -> Option<RankRollup> {
    if !table.has_rank(rank) {
        return None;
    }

    let mut positions: AHashMap<String, usize> = AHashMap::new();
    let mut rollup = RankRollup::default();
    for record in &table.records {
        let Some(raw) = record.label(rank) else {
            continue;
        };
        if raw == UNCLASSIFIED {
            continue;
        }
        let label = clean_label(raw, rank);
        if label.is_empty() || label == UNCLASSIFIED {
            continue;
        }
        match positions.get(&label) {
            Some(&pos) => rollup.taxa[pos].1 += record.count,
            None => {
                positions.insert(label.clone(), rollup.taxa.len());
                rollup.taxa.push((label, record.count));
            }
        }
    }
    Some(rollup)
}

/// Answers "what percent of all reads belongs to taxon X at rank R".
///
/// Built once per sample. Labels are cleaned and lower-cased up front, and
/// counts are pre-summed per distinct label, so each query is a linear scan
/// over distinct labels only.
#[derive(Debug, Clone)]
pub struct AbundanceIndex {
    total_reads: u64,
    default_rank: Rank,
    /// Per rank (by `Rank::index()`), `None` when the column is absent.
    labels: [Option<Vec<(String, u64)>>; 7],
}

impl AbundanceIndex {
    pub fn new(table: &AbundanceTable) -> Self {
        Self::with_rank(table, Rank::Genus)
    }

    /// Index whose `abundance_of` lookups default to `rank`.
    pub fn with_rank(table: &AbundanceTable, default_rank: Rank) -> Self {
        let mut labels: [Option<Vec<(String, u64)>>; 7] = Default::default();

        for &rank in &table.ranks {
            let mut sums: AHashMap<String, u64> = AHashMap::new();
            for record in &table.records {
                let cleaned = record
                    .label(rank)
                    .map(|raw| clean_label(raw, rank).to_lowercase())
                    .unwrap_or_default();
                *sums.entry(cleaned).or_insert(0) += record.count;
            }
            labels[rank.index()] = Some(sums.into_iter().collect());
        }

        Self {
            total_reads: table.total_reads(),
            default_rank,
            labels,
        }
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    pub fn default_rank(&self) -> Rank {
        self.default_rank
    }

    pub fn has_rank(&self, rank: Rank) -> bool {
        self.labels[rank.index()].is_some()
    }

    /// Relative abundance (percent) of reads whose label at `rank` fuzzy-matches `name`.
    ///
    /// Returns 0 when the rank is absent or the sample has no reads.
    pub fn abundance(&self, name: &str, rank: Rank) -> f64 {
        if self.total_reads == 0 {
            return 0.0;
        }
        let Some(labels) = &self.labels[rank.index()] else {
            return 0.0;
        };

        let query = name.to_lowercase();
        let matched: u64 = labels
            .iter()
            .filter(|(label, _)| matches_lowered(&query, label))
            .map(|(_, count)| count)
            .sum();

        let pct = matched as f64 / self.total_reads as f64 * 100.0;
        log::debug!("abundance({name}, {rank}) = {pct:.4}%");
        pct
    }

    /// [`abundance`](Self::abundance) at the index's default rank.
    pub fn abundance_of(&self, name: &str) -> f64 {
        self.abundance(name, self.default_rank)
    }
}
