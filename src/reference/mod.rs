// src/reference/mod.rs

pub mod diseases;
pub mod markers;
pub mod ranges;

pub use diseases::{DiseaseDatabase, DiseaseProfile};
pub use markers::{AgeMarkers, AgingMarker, YouthMarker};
pub use ranges::ReferenceRanges;

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::{ProfileError, Result};

/// Reference tables loaded from JSON with a built-in fallback.
///
/// A file that fails to load or validate is replaced by the whole
/// `Default`; entries are never merged.
pub trait ReferenceData: DeserializeOwned + Default {
    /// Short name for log messages.
    const KIND: &'static str;

    fn validate(&self) -> Result<()>;

    fn try_load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ProfileError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        data.validate()?;
        Ok(data)
    }

    fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::debug!("Using built-in {}", Self::KIND);
            return Self::default();
        };
        match Self::try_load(path) {
            Ok(data) => {
                log::info!("Loaded {} from {}", Self::KIND, path.display());
                data
            }
            Err(e) => {
                log::warn!("Falling back to built-in {}: {e}", Self::KIND);
                Self::default()
            }
        }
    }
}

pub(crate) fn check_range(name: &str, [min, max]: [f64; 2]) -> Result<()> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
        return Err(ProfileError::InvalidReference(format!(
            "{name}: range [{min}, {max}] must satisfy 0 <= min <= max"
        )));
    }
    Ok(())
}

/// The three reference tables one run scores against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    pub ranges: ReferenceRanges,
    pub diseases: DiseaseDatabase,
    pub markers: AgeMarkers,
}

impl ReferenceSet {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            ranges: ReferenceRanges::load_or_default(config.ranges_path.as_deref()),
            diseases: DiseaseDatabase::load_or_default(config.diseases_path.as_deref()),
            markers: AgeMarkers::load_or_default(config.markers_path.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn check_range_rules() {
        assert!(check_range("x", [0.0, 1.0]).is_ok());
        assert!(check_range("x", [0.5, 0.5]).is_ok());
        assert!(check_range("x", [2.0, 1.0]).is_err());
        assert!(check_range("x", [-1.0, 1.0]).is_err());
        assert!(check_range("x", [0.0, f64::NAN]).is_err());
    }

    #[test]
    fn malformed_file_falls_back_wholesale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"beneficial\": {{\"Bifidobacterium\": [5, 1]}}}}").unwrap();

        assert!(ReferenceRanges::try_load(file.path()).is_err());
        let ranges = ReferenceRanges::load_or_default(Some(file.path()));
        assert_eq!(ranges, ReferenceRanges::builtin());
    }

    #[test]
    fn missing_file_falls_back() {
        let path = Path::new("/nonexistent/age_markers.json");
        assert!(matches!(AgeMarkers::try_load(path), Err(ProfileError::Io { .. })));
        assert_eq!(AgeMarkers::load_or_default(Some(path)), AgeMarkers::builtin());
    }

    #[test]
    fn valid_file_replaces_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"CRC": {{"beneficial": ["Bifidobacterium"], "harmful": ["Fusobacterium"], "weight": 1.8}}}}"#
        )
        .unwrap();

        let db = DiseaseDatabase::load_or_default(Some(file.path()));
        assert_eq!(db.diseases.len(), 1);
        assert_eq!(db.diseases["CRC"].harmful, vec!["Fusobacterium".to_string()]);
    }
}
