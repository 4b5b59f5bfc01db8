//! Calibration records: scale-verified measurement/weight pairs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Breed, Measurement};

/// Girth/height ratio used when no calibration data exists at all
pub const DEFAULT_OVERALL_RATIO: f64 = 1.35;

/// A scale-verified calibration point
///
/// Born when a scale weight is recorded against stored photo measurements for
/// the same animal. Immutable once created, except for overwrite-by-id when
/// the same animal is re-weighed with a corrected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Operator-assigned animal identifier (ear tag)
    pub id: String,
    /// Date the scale weight was taken
    pub date: DateTime<Utc>,
    pub measurement: Measurement,
    pub true_weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<Breed>,
    /// Girth/height ratio that would have predicted the scale weight exactly
    pub implied_ratio: f64,
}

/// Error statistics of the current ratio against all stored points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationStats {
    pub count: usize,
    /// Mean absolute error in kg
    pub avg_error_kg: f64,
    /// Mean absolute error as a percentage of scale weight
    pub avg_error_percent: f64,
    /// Standard deviation of the signed error in kg
    pub std_dev_kg: f64,
}

/// The herd's calibration state, one per ranch
///
/// `overall_ratio`, `per_breed_ratio`, and `stats` are pure functions of
/// `points` and are always recomputed from them; persisted derived values are
/// never trusted across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub points: Vec<CalibrationPoint>,
    pub overall_ratio: f64,
    #[serde(default)]
    pub per_breed_ratio: BTreeMap<Breed, f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: CalibrationStats,
}

impl CalibrationState {
    /// Most specific ratio available for the given breed
    pub fn ratio_for(&self, breed: Option<Breed>) -> f64 {
        breed
            .and_then(|b| self.per_breed_ratio.get(&b).copied())
            .unwrap_or(self.overall_ratio)
    }

    pub fn is_calibrated(&self) -> bool {
        !self.points.is_empty()
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            overall_ratio: DEFAULT_OVERALL_RATIO,
            per_breed_ratio: BTreeMap::new(),
            last_updated: None,
            stats: CalibrationStats::default(),
        }
    }
}
