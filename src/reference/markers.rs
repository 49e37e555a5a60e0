// src/reference/markers.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_range, ReferenceData};
use crate::error::{ProfileError, Result};

/// Taxon whose presence within `optimal_range` pulls biological age down.
/// The weight is signed; negative weights make the sample "younger".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YouthMarker {
    pub weight: f64,
    pub optimal_range: [f64; 2],
}

/// Taxon that adds age once its abundance exceeds `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgingMarker {
    pub weight: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeMarkers {
    pub youth_associated: BTreeMap<String, YouthMarker>,
    pub aging_associated: BTreeMap<String, AgingMarker>,
    pub baseline_age: f64,
}

impl AgeMarkers {
    pub fn builtin() -> Self {
        let youth = [
            ("Bifidobacterium", -2.5, [5.0, 15.0]),
            ("Lactobacillus", -1.8, [0.5, 3.0]),
            ("Prevotella", -1.5, [10.0, 40.0]),
            ("Faecalibacterium", -2.0, [5.0, 15.0]),
            ("Akkermansia", -1.2, [1.0, 5.0]),
        ];
        let aging = [
            ("Escherichia", 2.0, 1.0),
            ("Enterococcus", 1.8, 0.5),
            ("Streptococcus", 1.5, 2.0),
            ("Clostridium", 1.3, 3.0),
            ("Staphylococcus", 1.6, 0.1),
            ("Klebsiella", 1.4, 0.5),
        ];

        Self {
            youth_associated: youth
                .into_iter()
                .map(|(name, weight, optimal_range)| {
                    (name.to_string(), YouthMarker { weight, optimal_range })
                })
                .collect(),
            aging_associated: aging
                .into_iter()
                .map(|(name, weight, threshold)| (name.to_string(), AgingMarker { weight, threshold }))
                .collect(),
            baseline_age: 40.0,
        }
    }
}

impl Default for AgeMarkers {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceData for AgeMarkers {
    const KIND: &'static str = "age markers";

    fn validate(&self) -> Result<()> {
        if !self.baseline_age.is_finite() {
            return Err(ProfileError::InvalidReference(format!(
                "baseline age {} is not a number",
                self.baseline_age
            )));
        }
        for (name, marker) in &self.youth_associated {
            if !marker.weight.is_finite() {
                return Err(ProfileError::InvalidReference(format!("{name}: weight is not finite")));
            }
            check_range(name, marker.optimal_range)?;
        }
        for (name, marker) in &self.aging_associated {
            if !(marker.weight.is_finite() && marker.weight > 0.0) {
                return Err(ProfileError::InvalidReference(format!(
                    "{name}: aging weight {} must be positive",
                    marker.weight
                )));
            }
            if !(marker.threshold.is_finite() && marker.threshold >= 0.0) {
                return Err(ProfileError::InvalidReference(format!(
                    "{name}: threshold {} must be >= 0",
                    marker.threshold
                )));
            }
        }
        Ok(())
    }
}
