//src/config.rs

use std::path::PathBuf;

use crate::types::Rank;

/// Settings for one pipeline run.
///
/// Reference paths left as `None` use the built-in tables.
///
/// ```rust
/// use gutprofile::config::PipelineConfig;
///
/// let config = PipelineConfig {
///     chronological_age: Some(52.0),
///     ..Default::default()
/// };
/// assert!(config.ranges_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub ranges_path: Option<PathBuf>,
    pub diseases_path: Option<PathBuf>,
    pub markers_path: Option<PathBuf>,
    /// Rank used for every taxon lookup by the scoring stages.
    pub match_rank: Rank,
    /// Only affects the age status label, never the biological age.
    pub chronological_age: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ranges_path: None,
            diseases_path: None,
            markers_path: None,
            match_rank: Rank::Genus,
            chronological_age: None,
        }
    }
}
