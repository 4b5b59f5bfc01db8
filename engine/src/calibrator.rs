//! Self-calibrating girth ratio from scale-truth feedback
//!
//! Whenever a scale weight becomes available for a previously measured animal,
//! the pair is folded into a recency-weighted average of implied ratios,
//! overall and per breed. Derived ratios are pure functions of the point set:
//! they are recomputed on every mutation and on load, never hand-edited and
//! never trusted from persistence.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use shared::{
    estimator, validation, BodyConditionScore, Breed, CalibrationPoint, CalibrationState,
    CalibrationStats, EstimatorParams, Measurement, WeightEstimate,
};

use crate::config::CalibratorConfig;
use crate::error::{EngineError, EngineResult};
use crate::seed;
use crate::store::CalibrationStore;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Lifecycle of a calibrator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibratorPhase {
    /// Fresh instance, nothing read from the store yet
    Uninitialized,
    /// Raw state read (or defaulted), derived ratios not yet recomputed
    Loaded,
    /// Derived ratios recomputed; all operations available
    Ready,
}

impl CalibratorPhase {
    fn name(&self) -> &'static str {
        match self {
            CalibratorPhase::Uninitialized => "uninitialized",
            CalibratorPhase::Loaded => "loaded",
            CalibratorPhase::Ready => "ready",
        }
    }
}

/// Why `load` fell back to defaults instead of restoring persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFallback {
    /// Store read failed; ranch operation must not block on cloud availability
    StoreUnavailable,
    /// Persisted payload did not deserialize
    CorruptPayload,
}

/// Observable outcome of `load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub restored_points: usize,
    pub fallback: Option<LoadFallback>,
}

/// Outcome of a mutating calibration operation
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationUpdate {
    pub overall_ratio: f64,
    pub stats: CalibrationStats,
    /// False when the store write failed; the in-memory state remains correct
    /// and usable until the next successful persist
    pub persisted: bool,
}

/// A scale-verified pair to fold into the calibration
#[derive(Debug, Clone)]
pub struct NewCalibrationPoint {
    /// Animal identifier (ear tag); re-submitting the same id corrects the
    /// existing point instead of duplicating it
    pub id: String,
    pub measurement: Measurement,
    pub true_weight_kg: f64,
    pub breed: Option<Breed>,
    /// Weigh-in date; defaults to now for live entries
    pub date: Option<DateTime<Utc>>,
}

/// Owns the herd's calibration state and its persistence
pub struct Calibrator<S: CalibrationStore> {
    store: S,
    config: CalibratorConfig,
    state: CalibrationState,
    phase: CalibratorPhase,
}

impl<S: CalibrationStore> Calibrator<S> {
    pub fn new(store: S, config: CalibratorConfig) -> Self {
        let state = CalibrationState {
            overall_ratio: config.estimator.default_ratio,
            ..Default::default()
        };
        Self {
            store,
            config,
            state,
            phase: CalibratorPhase::Uninitialized,
        }
    }

    pub fn phase(&self) -> CalibratorPhase {
        self.phase
    }

    /// Read persisted state and recompute derived ratios
    ///
    /// Never fails fatally: an unreachable store or corrupt payload degrades
    /// to the built-in defaults, reported through the returned [`LoadReport`].
    pub async fn load(&mut self) -> LoadReport {
        let mut fallback = None;

        let raw = match self.store.get(&self.config.storage_key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %self.config.storage_key, error = %err,
                    "calibration store unreachable, starting from defaults");
                fallback = Some(LoadFallback::StoreUnavailable);
                None
            }
        };

        let mut points = match raw {
            Some(value) => match serde_json::from_value::<CalibrationState>(value) {
                Ok(persisted) => persisted.points,
                Err(err) => {
                    warn!(key = %self.config.storage_key, error = %err,
                        "persisted calibration state is corrupt, starting from defaults");
                    fallback = Some(LoadFallback::CorruptPayload);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if points.is_empty() && fallback.is_none() && self.config.seed_when_empty {
            points = seed::anchor_points();
            info!(points = points.len(), "seeding fresh herd with anchor animals");
        }

        self.state = CalibrationState {
            points,
            overall_ratio: self.config.estimator.default_ratio,
            ..Default::default()
        };
        self.phase = CalibratorPhase::Loaded;
        self.recompute_at(Utc::now());
        self.phase = CalibratorPhase::Ready;

        info!(
            points = self.state.points.len(),
            overall_ratio = self.state.overall_ratio,
            "calibration state loaded"
        );
        LoadReport {
            restored_points: self.state.points.len(),
            fallback,
        }
    }

    /// Current calibration state (read-only)
    pub fn state(&self) -> EngineResult<&CalibrationState> {
        self.ensure_ready()?;
        Ok(&self.state)
    }

    /// Most specific current ratio: per-breed if known, else overall
    pub fn get_ratio(&self, breed: Option<Breed>) -> EngineResult<f64> {
        self.ensure_ready()?;
        let ratio = self.state.ratio_for(breed);
        debug!(?breed, ratio, "ratio served");
        Ok(ratio)
    }

    /// Estimate a weight using the current calibration
    pub fn estimate(
        &self,
        measurement: &Measurement,
        breed: Option<Breed>,
        bcs: BodyConditionScore,
    ) -> EngineResult<WeightEstimate> {
        self.ensure_ready()?;
        let result = estimator::estimate(measurement, breed, bcs, &self.state, &self.config.estimator)?;
        Ok(result)
    }

    /// Fold a scale-verified pair into the calibration
    ///
    /// Rejects input whose implied ratio falls outside the sanity band without
    /// touching state. Upserts by animal id, enforces the retention bound,
    /// recomputes, and persists the new state.
    pub async fn add_point(&mut self, input: NewCalibrationPoint) -> EngineResult<CalibrationUpdate> {
        self.ensure_ready()?;
        validation::validate_measurement(&input.measurement)?;

        let ratio = estimator::implied_ratio(
            input.measurement.height_cm,
            input.measurement.length_cm,
            input.true_weight_kg,
            &self.config.estimator,
        )?;
        validation::validate_implied_ratio(
            ratio,
            self.config.implied_ratio_min,
            self.config.implied_ratio_max,
        )?;

        let point = CalibrationPoint {
            id: input.id,
            date: input.date.unwrap_or_else(Utc::now),
            measurement: input.measurement,
            true_weight_kg: input.true_weight_kg,
            breed: input.breed,
            implied_ratio: ratio,
        };

        if let Some(existing) = self.state.points.iter_mut().find(|p| p.id == point.id) {
            debug!(id = %point.id, "re-calibrating existing animal");
            *existing = point;
        } else {
            self.state.points.push(point);
        }
        self.enforce_retention();

        self.recompute_at(Utc::now());
        let persisted = self.persist().await;
        Ok(self.update_summary(persisted))
    }

    /// Remove a calibration point by animal id
    ///
    /// Emptying the point set reverts ratios to the built-in defaults.
    pub async fn delete_point(&mut self, id: &str) -> EngineResult<CalibrationUpdate> {
        self.ensure_ready()?;
        let index = self
            .state
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EngineError::PointNotFound(id.to_string()))?;
        self.state.points.remove(index);

        self.recompute_at(Utc::now());
        let persisted = self.persist().await;
        Ok(self.update_summary(persisted))
    }

    /// Full-state snapshot for backup
    pub fn export_state(&self) -> EngineResult<CalibrationState> {
        self.ensure_ready()?;
        Ok(self.state.clone())
    }

    /// Replace the point set from a backup payload
    ///
    /// Structurally invalid payloads are rejected with the prior state left
    /// untouched. Derived ratios are always re-derived from the imported raw
    /// points, never taken from the payload.
    pub async fn import_state(&mut self, payload: Value) -> EngineResult<CalibrationUpdate> {
        self.ensure_ready()?;

        let object = payload
            .as_object()
            .ok_or_else(|| EngineError::ImportValidation("payload must be a JSON object".into()))?;
        let points_value = object
            .get("points")
            .ok_or_else(|| EngineError::ImportValidation("missing `points` field".into()))?;
        if !points_value.is_array() {
            return Err(EngineError::ImportValidation("`points` must be an array".into()));
        }
        let points: Vec<CalibrationPoint> = serde_json::from_value(points_value.clone())
            .map_err(|err| EngineError::ImportValidation(format!("invalid calibration point: {err}")))?;

        self.state.points = points;
        self.enforce_retention();
        self.recompute_at(Utc::now());
        let persisted = self.persist().await;
        info!(points = self.state.points.len(), "calibration state imported");
        Ok(self.update_summary(persisted))
    }

    fn ensure_ready(&self) -> EngineResult<()> {
        if self.phase != CalibratorPhase::Ready {
            return Err(EngineError::NotReady(self.phase.name()));
        }
        Ok(())
    }

    /// Keep only the most recent `max_points`, oldest dropped first
    fn enforce_retention(&mut self) {
        self.state.points.sort_by(|a, b| a.date.cmp(&b.date));
        let overflow = self.state.points.len().saturating_sub(self.config.max_points);
        if overflow > 0 {
            self.state.points.drain(..overflow);
        }
    }

    fn recompute_at(&mut self, now: DateTime<Utc>) {
        let params = &self.config.estimator;

        self.state.overall_ratio = optimal_ratio(&self.state.points, now, &self.config)
            .unwrap_or(params.default_ratio);

        self.state.per_breed_ratio.clear();
        for breed in Breed::ALL {
            if let Some(ratio) = breed_ratio(&self.state.points, breed, now, &self.config) {
                self.state.per_breed_ratio.insert(breed, ratio);
            }
        }

        self.state.stats =
            calibration_stats(&self.state.points, self.state.overall_ratio, params);
        self.state.last_updated = Some(now);

        info!(
            points = self.state.points.len(),
            overall_ratio = self.state.overall_ratio,
            avg_error_kg = self.state.stats.avg_error_kg,
            "calibration recomputed"
        );
    }

    /// Whole-state write; failure keeps the in-memory state authoritative
    async fn persist(&mut self) -> bool {
        let value = match serde_json::to_value(&self.state) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "calibration state failed to serialize");
                return false;
            }
        };
        match self.store.set(&self.config.storage_key, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %self.config.storage_key, error = %err,
                    "calibration persist failed, continuing with in-memory state");
                false
            }
        }
    }

    fn update_summary(&self, persisted: bool) -> CalibrationUpdate {
        CalibrationUpdate {
            overall_ratio: self.state.overall_ratio,
            stats: self.state.stats,
            persisted,
        }
    }
}

/// Recency weight of a calibration point: exponential decay by age
pub fn recency_weight(age_days: f64, half_life_days: f64) -> f64 {
    (-age_days.max(0.0) / half_life_days).exp()
}

/// Recency-weighted average of implied ratios, clamped to the safety band
///
/// Outlier points are excluded from the average entirely, not down-weighted.
/// Returns `None` when no usable point remains.
pub fn optimal_ratio(
    points: &[CalibrationPoint],
    now: DateTime<Utc>,
    config: &CalibratorConfig,
) -> Option<f64> {
    weighted_ratio(points.iter(), now, config)
}

/// Per-breed variant of [`optimal_ratio`], restricted to that breed's points
pub fn breed_ratio(
    points: &[CalibrationPoint],
    breed: Breed,
    now: DateTime<Utc>,
    config: &CalibratorConfig,
) -> Option<f64> {
    weighted_ratio(points.iter().filter(|p| p.breed == Some(breed)), now, config)
}

fn weighted_ratio<'a>(
    points: impl Iterator<Item = &'a CalibrationPoint>,
    now: DateTime<Utc>,
    config: &CalibratorConfig,
) -> Option<f64> {
    let mut weight_sum = 0.0;
    let mut ratio_sum = 0.0;

    for point in points {
        if point.implied_ratio < config.outlier_ratio_min
            || point.implied_ratio > config.outlier_ratio_max
        {
            continue;
        }
        let age_days = (now - point.date).num_seconds() as f64 / SECONDS_PER_DAY;
        let weight = recency_weight(age_days, config.half_life_days);
        weight_sum += weight;
        ratio_sum += point.implied_ratio * weight;
    }

    if weight_sum <= 0.0 {
        return None;
    }
    let ratio = ratio_sum / weight_sum;
    Some(ratio.clamp(config.estimator.min_ratio, config.estimator.max_ratio))
}

/// Error statistics of a ratio against the stored points
///
/// Re-runs the raw weight formula (girth = height × ratio) over every point
/// and compares against the scale weight.
pub fn calibration_stats(
    points: &[CalibrationPoint],
    ratio: f64,
    params: &EstimatorParams,
) -> CalibrationStats {
    if points.is_empty() {
        return CalibrationStats::default();
    }

    let errors: Vec<(f64, f64)> = points
        .iter()
        .map(|p| {
            let girth = p.measurement.height_cm * ratio;
            let predicted = girth * girth * p.measurement.length_cm / params.schaeffer_k;
            let error = predicted - p.true_weight_kg;
            (error, error / p.true_weight_kg * 100.0)
        })
        .collect();

    let n = errors.len() as f64;
    let avg_error_kg = errors.iter().map(|(e, _)| e.abs()).sum::<f64>() / n;
    let avg_error_percent = errors.iter().map(|(_, p)| p.abs()).sum::<f64>() / n;
    let mean = errors.iter().map(|(e, _)| e).sum::<f64>() / n;
    let variance = errors.iter().map(|(e, _)| (e - mean).powi(2)).sum::<f64>() / n;

    CalibrationStats {
        count: points.len(),
        avg_error_kg,
        avg_error_percent,
        std_dev_kg: variance.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::Measurement;

    fn point(id: &str, implied_ratio: f64, age_days: i64, now: DateTime<Utc>) -> CalibrationPoint {
        CalibrationPoint {
            id: id.to_string(),
            date: now - Duration::days(age_days),
            measurement: Measurement::new(105.0, 125.0),
            true_weight_kg: 231.0,
            breed: None,
            implied_ratio,
        }
    }

    #[test]
    fn recency_weight_halves_nowhere_near_half_life() {
        assert!((recency_weight(0.0, 180.0) - 1.0).abs() < 1e-12);
        assert!(recency_weight(180.0, 180.0) < recency_weight(90.0, 180.0));
        // Negative ages (clock skew) are treated as fresh
        assert!((recency_weight(-5.0, 180.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn recent_points_dominate_the_average() {
        let now = Utc::now();
        let config = CalibratorConfig::default();
        let points = vec![point("old", 1.30, 360, now), point("new", 1.40, 0, now)];
        let ratio = optimal_ratio(&points, now, &config).unwrap();
        // Midpoint is 1.35; the fresh point must pull the average past it
        assert!(ratio > 1.35);
        assert!(ratio < 1.40);
    }

    #[test]
    fn outliers_are_excluded_entirely() {
        let now = Utc::now();
        let config = CalibratorConfig::default();
        let points = vec![
            point("good", 1.35, 0, now),
            point("garbage", 2.50, 0, now),
            point("garbage2", 0.50, 0, now),
        ];
        let ratio = optimal_ratio(&points, now, &config).unwrap();
        assert!((ratio - 1.35).abs() < 1e-9);
    }

    #[test]
    fn all_outliers_yields_none() {
        let now = Utc::now();
        let config = CalibratorConfig::default();
        let points = vec![point("garbage", 2.50, 0, now)];
        assert_eq!(optimal_ratio(&points, now, &config), None);
    }

    #[test]
    fn weighted_average_is_clamped_to_safety_band() {
        let now = Utc::now();
        let config = CalibratorConfig::default();
        // Valid per the outlier band, but above the estimator safety band
        let points = vec![point("deep", 1.80, 0, now)];
        let ratio = optimal_ratio(&points, now, &config).unwrap();
        assert!((ratio - config.estimator.max_ratio).abs() < 1e-9);
    }

    #[test]
    fn stats_on_perfectly_calibrated_points_are_zero() {
        let params = EstimatorParams::default();
        // implied ratio for (105, 125, 231) predicts the weight exactly
        let ratio = estimator::implied_ratio(105.0, 125.0, 231.0, &params).unwrap();
        let now = Utc::now();
        let points = vec![point("exact", ratio, 0, now)];
        let stats = calibration_stats(&points, ratio, &params);
        assert_eq!(stats.count, 1);
        assert!(stats.avg_error_kg < 1e-9);
        assert!(stats.std_dev_kg < 1e-9);
    }

    #[test]
    fn stats_empty_points() {
        let stats = calibration_stats(&[], 1.35, &EstimatorParams::default());
        assert_eq!(stats, CalibrationStats::default());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn averaged_ratio_stays_in_safety_band(
                ratios in proptest::collection::vec(0.5f64..2.5, 1..20),
                ages in proptest::collection::vec(0i64..1000, 1..20),
            ) {
                let now = Utc::now();
                let config = CalibratorConfig::default();
                let points: Vec<CalibrationPoint> = ratios
                    .iter()
                    .zip(ages.iter().cycle())
                    .enumerate()
                    .map(|(i, (&r, &age))| point(&format!("#{i}"), r, age, now))
                    .collect();

                if let Some(ratio) = optimal_ratio(&points, now, &config) {
                    prop_assert!(ratio >= config.estimator.min_ratio - 1e-9);
                    prop_assert!(ratio <= config.estimator.max_ratio + 1e-9);
                }
            }

            #[test]
            fn fresher_point_pulls_average_its_way(
                old_ratio in 1.21f64..1.54,
                new_ratio in 1.21f64..1.54,
                age in 30i64..900,
            ) {
                // Stay inside the clamp band so only recency matters
                prop_assume!((old_ratio - new_ratio).abs() > 0.01);
                let now = Utc::now();
                let config = CalibratorConfig::default();
                let points = vec![
                    point("old", old_ratio, age, now),
                    point("new", new_ratio, 0, now),
                ];
                let averaged = optimal_ratio(&points, now, &config).unwrap();
                let midpoint = (old_ratio + new_ratio) / 2.0;
                // The recent point carries strictly more weight
                if new_ratio > old_ratio {
                    prop_assert!(averaged > midpoint);
                } else {
                    prop_assert!(averaged < midpoint);
                }
            }
        }
    }
}
