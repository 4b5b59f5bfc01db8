//! Weight estimate output models

use serde::{Deserialize, Serialize};

/// Which ratio the estimator ended up using, from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioSource {
    /// Calibrated ratio for the animal's own breed
    BreedCalibrated,
    /// Calibrated herd-wide ratio
    HerdCalibrated,
    /// Built-in baseline for the breed, no calibration data yet
    BreedBaseline,
    /// Population-average fallback constant
    GlobalDefault,
}

/// Plausible weight band around the point estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

/// Result of a weight estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEstimate {
    pub weight_kg: f64,
    pub range: WeightRange,
    pub girth_cm: f64,
    /// Final girth/height ratio after breed, BCS, and width adjustments
    pub ratio_used: f64,
    pub ratio_source: RatioSource,
    /// Heuristic 0-100 quality score, not a statistical confidence interval
    pub confidence: u8,
}
