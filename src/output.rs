// src/output.rs

use ahash::AHashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ProfileError, Result};
use crate::SampleReport;

/// `<out_dir>/<sample_id>.json`, provided the id is a single plain file name.
pub fn report_path(out_dir: &Path, sample_id: &str) -> Result<PathBuf> {
    let file_name = format!("{sample_id}.json");
    let mut components = Path::new(&file_name).components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !is_plain || sample_id.is_empty() || sample_id.contains(['/', '\\', '\0']) || sample_id == ".." {
        return Err(ProfileError::InvalidSampleId {
            sample_id: sample_id.to_string(),
        });
    }
    Ok(out_dir.join(file_name))
}

/// Resolves every report path before writing, so nothing is written when any
/// id is unusable or shared by two samples.
pub fn write_reports(reports: &[SampleReport], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = AHashSet::new();
    let mut paths = Vec::with_capacity(reports.len());
    for report in reports {
        if !seen.insert(report.sample_id.as_str()) {
            return Err(ProfileError::DuplicateSampleId {
                sample_id: report.sample_id.clone(),
            });
        }
        paths.push(report_path(out_dir, &report.sample_id)?);
    }

    fs::create_dir_all(out_dir).map_err(|source| ProfileError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    for (report, path) in reports.iter().zip(&paths) {
        let json = report.to_json().map_err(|source| ProfileError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ProfileError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {}", path.display());
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_stay_inside_the_output_dir() {
        let out = Path::new("reports");
        assert_eq!(report_path(out, "S01").unwrap(), out.join("S01.json"));
        assert_eq!(report_path(out, "gut.sample-2").unwrap(), out.join("gut.sample-2.json"));
    }

    #[test]
    fn path_like_ids_are_rejected() {
        let out = Path::new("reports");
        for id in ["/tmp/x", "../x", "a/b", "..", "", "a\\b"] {
            assert!(
                matches!(report_path(out, id), Err(ProfileError::InvalidSampleId { .. })),
                "{id:?} should be rejected"
            );
        }
    }
}
