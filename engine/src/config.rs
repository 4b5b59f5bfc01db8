//! Engine configuration
//!
//! Every constant the calibration algorithm depends on lives here as a named,
//! overridable value with the herd-proven defaults.

use serde::Deserialize;
use shared::EstimatorParams;

/// Configuration for a herd's [`Calibrator`](crate::Calibrator)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibratorConfig {
    /// Key under which the full calibration state is persisted
    pub storage_key: String,

    /// Retention bound: only the most recent points are kept, so calibration
    /// stays responsive to current herd composition
    pub max_points: usize,

    /// Recency half-life in days; older validation data counts less as herd
    /// condition and season change
    pub half_life_days: f64,

    /// Implied ratios outside this band are rejected at entry as bad input
    pub implied_ratio_min: f64,
    pub implied_ratio_max: f64,

    /// Stored points outside this band are excluded from averages entirely
    pub outlier_ratio_min: f64,
    pub outlier_ratio_max: f64,

    /// Start a fresh herd from the scale-verified anchor animals instead of
    /// an empty point set
    pub seed_when_empty: bool,

    /// Formula constants shared with the estimator
    pub estimator: EstimatorParams,
}

impl CalibratorConfig {
    /// Config with the state keyed to a specific herd/ranch
    pub fn for_herd(herd: &str) -> Self {
        Self {
            storage_key: format!("calibration/{herd}"),
            ..Default::default()
        }
    }
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            storage_key: "calibration/default".to_string(),
            max_points: 50,
            half_life_days: 180.0,
            implied_ratio_min: 1.0,
            implied_ratio_max: 2.0,
            outlier_ratio_min: 0.8,
            outlier_ratio_max: 2.0,
            seed_when_empty: false,
            estimator: EstimatorParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn herd_scoped_storage_key() {
        let config = CalibratorConfig::for_herd("venecia");
        assert_eq!(config.storage_key, "calibration/venecia");
        assert_eq!(config.max_points, 50);
    }

    #[test]
    fn partial_json_overrides_merge_with_defaults() {
        let config: CalibratorConfig =
            serde_json::from_str(r#"{"half_life_days": 90.0, "estimator": {"width_factor": 0.15}}"#)
                .unwrap();
        assert_eq!(config.half_life_days, 90.0);
        assert_eq!(config.estimator.width_factor, 0.15);
        assert_eq!(config.max_points, 50);
        assert_eq!(config.estimator.bcs_step, 0.04);
    }
}
