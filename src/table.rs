//src/table.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{ProfileError, Result};
use crate::types::{AbundanceTable, Rank, TaxonRecord};

/// Column headers that never hold sample counts.
pub const RESERVED_COLUMNS: [&str; 9] = [
    "Taxon",
    "Confidence",
    "Kingdom",
    "Phylum",
    "Class",
    "Order",
    "Family",
    "Genus",
    "Species",
];

pub fn is_reserved_column(name: &str) -> bool {
    RESERVED_COLUMNS.contains(&name)
}

/// Picks the single sample column out of the header (after the row-index column).
///
/// More than one candidate is rejected rather than silently taking the first.
pub fn select_sample_column(columns: &[String]) -> Result<usize> {
    let candidates: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_reserved_column(c))
        .map(|(i, _)| i)
        .collect();

    match candidates.as_slice() {
        [only] => Ok(*only),
        [] => Err(ProfileError::MissingSampleColumn {
            columns: columns.to_vec(),
        }),
        many => Err(ProfileError::AmbiguousSampleColumns {
            columns: many.iter().map(|&i| columns[i].clone()).collect(),
        }),
    }
}

/// Reads an abundance table from disk. Paths ending in `.gz` are decompressed.
pub fn read_abundance_table<P: AsRef<Path>>(path: P) -> Result<AbundanceTable> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };

    parse_abundance_table(reader).map_err(|e| match e {
        // line-level I/O errors carry no path; attach it here
        ProfileError::Io { source, .. } => ProfileError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses a tab-separated table in the format:
/// ```text
/// <id>\t[<rank columns>...]\t<sample>
/// ASV1\tp__Firmicutes\tg__Roseburia\t120
/// ```
/// The first column is the row index; rank columns come from [`RESERVED_COLUMNS`].
pub fn parse_abundance_table<R: BufRead>(reader: R) -> Result<AbundanceTable> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.map_err(io_error)?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(ProfileError::EmptyTable),
        }
    };

    let mut fields = header.trim_end_matches('\r').split('\t');
    // Row-index header (often empty or "#OTU ID")
    fields.next();
    let columns: Vec<String> = fields.map(|s| s.trim().to_string()).collect();

    let sample_col = select_sample_column(&columns)?;
    let rank_cols: Vec<(usize, Rank)> = columns
        .iter()
        .enumerate()
        .filter_map(|(i, c)| Rank::from_column(c).map(|r| (i, r)))
        .collect();
    let ranks: Vec<Rank> = rank_cols.iter().map(|&(_, r)| r).collect();
    let expected = columns.len() + 1;

    let mut records = Vec::new();
    let mut total: u64 = 0;
    for (idx, line_result) in lines {
        let line = line_result.map_err(io_error)?;
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() != expected {
            return Err(ProfileError::MalformedRow {
                line: line_no,
                expected,
                found: parts.len(),
            });
        }

        let values = &parts[1..];
        let count = parse_count(values[sample_col], line_no)?;
        total = total
            .checked_add(count)
            .ok_or(ProfileError::CountOverflow { line: line_no })?;
        let mut record = TaxonRecord::new(parts[0].trim(), count);
        for &(col, rank) in &rank_cols {
            record.lineage[rank.index()] = parse_label(values[col]);
        }
        records.push(record);
    }

    let table = AbundanceTable::new(columns[sample_col].clone(), ranks, records);
    log::info!(
        "Loaded abundance table for sample {} with {} taxa, {} reads",
        table.sample_id,
        table.records.len(),
        table.total_reads()
    );
    Ok(table)
}

fn io_error(source: std::io::Error) -> ProfileError {
    ProfileError::Io {
        path: Default::default(),
        source,
    }
}

fn parse_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed == "NA" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Largest float count that still converts to an exact integer (2^53).
const MAX_FLOAT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Counts are integers, but exports often write them as `12.0`.
fn parse_count(raw: &str, line: usize) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(v) = trimmed.parse::<u64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if (0.0..=MAX_FLOAT_COUNT).contains(&v) && v.fract() == 0.0 => Ok(v as u64),
        _ => Err(ProfileError::InvalidCount {
            line,
            value: trimmed.to_string(),
        }),
    }
}
