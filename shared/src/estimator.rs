//! Weight estimation from photographic body measurements
//!
//! The model is a Schaeffer-type heart-girth regression: girth is predicted
//! from withers height through a breed- and condition-adjusted ratio, then
//! weight follows from `girth² × length / K`. Everything here is pure and
//! deterministic; the calibration engine supplies the current ratio state.

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;
use crate::models::{
    BodyConditionScore, Breed, CalibrationState, Measurement, RatioSource, WeightEstimate,
    WeightRange, DEFAULT_OVERALL_RATIO,
};
use crate::validation::{
    validate_girth, validate_height, validate_length, validate_measurement,
    validate_scale_weight, MIN_WIDTH_FOR_ADJUSTMENT_CM,
};

/// Confidence scoring: a heuristic quality score, not a statistical interval
const CONFIDENCE_BASE: u8 = 70;
const CONFIDENCE_WIDTH_BONUS: u8 = 8;
const CONFIDENCE_BCS_BONUS: u8 = 4;
const CONFIDENCE_BREED_BONUS: u8 = 5;
const CONFIDENCE_CALIBRATION_BONUS: u8 = 3;
const CONFIDENCE_CAP: u8 = 95;

/// Calibration point count at which the herd ratio is considered well fed
const WELL_CALIBRATED_POINTS: usize = 5;

/// Tunable constants of the estimation model
///
/// The adjustment factors were tuned against a handful of scale-verified
/// animals, so they are seed defaults rather than proven constants; deployments
/// may override any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
    /// Population-average girth/height ratio when nothing better is known
    pub default_ratio: f64,
    /// Ratio shift per body-condition point away from 5
    pub bcs_step: f64,
    /// Width/height proportion of a moderate animal
    pub width_baseline: f64,
    /// Ratio shift per unit of width/height deviation from the baseline
    pub width_factor: f64,
    /// Hard safety band: final ratios never leave [min_ratio, max_ratio],
    /// which guards against pathological calibration drift
    pub min_ratio: f64,
    pub max_ratio: f64,
    /// Schaeffer formula divisor, a fixed physical-model constant
    pub schaeffer_k: f64,
    /// Half-width of the reported weight range, in percent
    pub range_percent: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            default_ratio: DEFAULT_OVERALL_RATIO,
            bcs_step: 0.04,
            width_baseline: 0.52,
            width_factor: 0.12,
            min_ratio: 1.20,
            max_ratio: 1.55,
            schaeffer_k: 10840.0,
            range_percent: 8.0,
        }
    }
}

/// Predict chest girth from height, applying BCS and width adjustments
pub fn compute_girth(
    height_cm: f64,
    width_cm: Option<f64>,
    bcs: BodyConditionScore,
    base_ratio: f64,
    params: &EstimatorParams,
) -> Result<f64, EstimateError> {
    validate_height(height_cm)?;

    let mut ratio = base_ratio + bcs.ratio_offset(params.bcs_step);

    if let Some(width) = width_cm {
        if width > MIN_WIDTH_FOR_ADJUSTMENT_CM {
            let width_height = width / height_cm;
            ratio += (width_height - params.width_baseline) * params.width_factor;
        }
    }

    let ratio = ratio.clamp(params.min_ratio, params.max_ratio);
    Ok(height_cm * ratio)
}

/// Schaeffer-type closed form: weight = girth² × length / K
pub fn compute_weight(
    girth_cm: f64,
    length_cm: f64,
    params: &EstimatorParams,
) -> Result<f64, EstimateError> {
    validate_girth(girth_cm)?;
    validate_length(length_cm)?;
    Ok(girth_cm * girth_cm * length_cm / params.schaeffer_k)
}

/// Solve the weight formula backwards: the girth/height ratio that would have
/// predicted the scale weight exactly
pub fn implied_ratio(
    height_cm: f64,
    length_cm: f64,
    true_weight_kg: f64,
    params: &EstimatorParams,
) -> Result<f64, EstimateError> {
    validate_height(height_cm)?;
    validate_length(length_cm)?;
    validate_scale_weight(true_weight_kg)?;

    let ideal_girth = (true_weight_kg * params.schaeffer_k / length_cm).sqrt();
    Ok(ideal_girth / height_cm)
}

/// Full estimation pipeline: measurements + breed + BCS + calibration state
/// in, weight estimate with range and confidence out
pub fn estimate(
    measurement: &Measurement,
    breed: Option<Breed>,
    bcs: BodyConditionScore,
    state: &CalibrationState,
    params: &EstimatorParams,
) -> Result<WeightEstimate, EstimateError> {
    validate_measurement(measurement)?;

    let (base_ratio, ratio_source) = select_ratio(breed, state, params);
    let girth_cm = compute_girth(
        measurement.height_cm,
        measurement.width_cm,
        bcs,
        base_ratio,
        params,
    )?;
    let weight_kg = compute_weight(girth_cm, measurement.length_cm, params)?;

    // Widen the band when observed calibration error is worse than the default
    let half_width_percent = params.range_percent.max(state.stats.avg_error_percent);
    let range = WeightRange {
        min_kg: weight_kg * (1.0 - half_width_percent / 100.0),
        max_kg: weight_kg * (1.0 + half_width_percent / 100.0),
    };

    let width_captured = measurement
        .width_cm
        .is_some_and(|w| w > MIN_WIDTH_FOR_ADJUSTMENT_CM);
    let confidence = confidence_score(width_captured, bcs, breed.is_some(), state.stats.count);

    Ok(WeightEstimate {
        weight_kg,
        range,
        girth_cm,
        ratio_used: girth_cm / measurement.height_cm,
        ratio_source,
        confidence,
    })
}

/// Pick the most specific ratio available: per-breed calibrated, herd
/// calibrated, breed baseline, then the global default
fn select_ratio(
    breed: Option<Breed>,
    state: &CalibrationState,
    params: &EstimatorParams,
) -> (f64, RatioSource) {
    if let Some(b) = breed {
        if let Some(&ratio) = state.per_breed_ratio.get(&b) {
            return (ratio, RatioSource::BreedCalibrated);
        }
    }
    if state.is_calibrated() {
        return (state.overall_ratio, RatioSource::HerdCalibrated);
    }
    if let Some(b) = breed {
        return (b.baseline_ratio(), RatioSource::BreedBaseline);
    }
    (params.default_ratio, RatioSource::GlobalDefault)
}

fn confidence_score(
    width_captured: bool,
    bcs: BodyConditionScore,
    breed_known: bool,
    calibration_points: usize,
) -> u8 {
    let mut confidence = CONFIDENCE_BASE;
    if width_captured {
        confidence += CONFIDENCE_WIDTH_BONUS;
    }
    if bcs.is_normal_range() {
        confidence += CONFIDENCE_BCS_BONUS;
    }
    if breed_known {
        confidence += CONFIDENCE_BREED_BONUS;
    }
    if calibration_points >= WELL_CALIBRATED_POINTS {
        confidence += CONFIDENCE_CALIBRATION_BONUS;
    }
    confidence.min(CONFIDENCE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> EstimatorParams {
        EstimatorParams::default()
    }

    fn calibrated_state(ratio: f64) -> CalibrationState {
        // One dummy point so the state counts as calibrated
        CalibrationState {
            points: vec![crate::models::CalibrationPoint {
                id: "ANCHOR".to_string(),
                date: chrono::Utc::now(),
                measurement: Measurement::new(105.0, 125.0),
                true_weight_kg: 231.0,
                breed: None,
                implied_ratio: ratio,
            }],
            overall_ratio: ratio,
            ..Default::default()
        }
    }

    #[test]
    fn anchor_animal_girth_and_weight() {
        // Herd anchor: 105 cm tall, 125 cm long, ratio 1.348, scale weight 231 kg
        let state = calibrated_state(1.348);
        let m = Measurement::new(105.0, 125.0);
        let result = estimate(&m, None, BodyConditionScore::default(), &state, &params()).unwrap();

        assert!((result.girth_cm - 141.54).abs() < 0.01);
        assert!((result.weight_kg - 231.0).abs() < 1.5);
        assert_eq!(result.ratio_source, RatioSource::HerdCalibrated);
    }

    #[test]
    fn anchor_animal_implied_ratio() {
        let ratio = implied_ratio(105.0, 125.0, 231.0, &params()).unwrap();
        assert!((ratio - 1.348).abs() < 0.001);
    }

    #[test]
    fn invalid_height_rejected() {
        let m = Measurement::new(40.0, 125.0);
        let err = estimate(
            &m,
            None,
            BodyConditionScore::default(),
            &CalibrationState::default(),
            &params(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InvalidMeasurement {
                field: "height_cm",
                ..
            }
        ));
    }

    #[test]
    fn short_animal_girth_below_formula_floor_rejected() {
        // 60 cm calf passes the height check but lands under the 80 cm girth floor
        let girth = compute_girth(
            60.0,
            None,
            BodyConditionScore::default(),
            1.25,
            &params(),
        )
        .unwrap();
        assert!(compute_weight(girth, 60.0, &params()).is_err());
    }

    #[test]
    fn estimate_is_deterministic() {
        let state = calibrated_state(1.36);
        let m = Measurement::with_width(110.0, 130.0, 56.0);
        let bcs = BodyConditionScore::new(6).unwrap();
        let a = estimate(&m, Some(Breed::ZebuPure), bcs, &state, &params()).unwrap();
        let b = estimate(&m, Some(Breed::ZebuPure), bcs, &state, &params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ratio_precedence_breed_then_herd_then_baseline_then_default() {
        let p = params();
        let empty = CalibrationState::default();

        // No breed, no calibration: global default
        let m = Measurement::new(105.0, 125.0);
        let bcs = BodyConditionScore::default();
        let r = estimate(&m, None, bcs, &empty, &p).unwrap();
        assert_eq!(r.ratio_source, RatioSource::GlobalDefault);
        assert!((r.ratio_used - p.default_ratio).abs() < 1e-9);

        // Breed known, no calibration: breed baseline
        let r = estimate(&m, Some(Breed::EuropeanBeef), bcs, &empty, &p).unwrap();
        assert_eq!(r.ratio_source, RatioSource::BreedBaseline);
        assert!((r.ratio_used - 1.42).abs() < 1e-9);

        // Calibrated herd, breed without its own points: herd ratio
        let state = calibrated_state(1.30);
        let r = estimate(&m, Some(Breed::EuropeanBeef), bcs, &state, &p).unwrap();
        assert_eq!(r.ratio_source, RatioSource::HerdCalibrated);

        // Breed with its own calibrated ratio wins
        let mut state = calibrated_state(1.30);
        state.per_breed_ratio.insert(Breed::EuropeanBeef, 1.44);
        let r = estimate(&m, Some(Breed::EuropeanBeef), bcs, &state, &p).unwrap();
        assert_eq!(r.ratio_source, RatioSource::BreedCalibrated);
        assert!((r.ratio_used - 1.44).abs() < 1e-9);
    }

    #[test]
    fn extreme_bcs_and_width_stay_inside_safety_band() {
        let p = params();
        let fat = BodyConditionScore::new(9).unwrap();
        // Width far above the 0.52 baseline
        let girth = compute_girth(105.0, Some(95.0), fat, 1.42, &p).unwrap();
        let ratio = girth / 105.0;
        assert!(ratio <= p.max_ratio + 1e-9);
        assert!(ratio >= p.min_ratio - 1e-9);
        assert!((ratio - p.max_ratio).abs() < 1e-9);

        let thin = BodyConditionScore::new(1).unwrap();
        let girth = compute_girth(105.0, None, thin, 1.20, &p).unwrap();
        assert!((girth / 105.0 - p.min_ratio).abs() < 1e-9);
    }

    #[test]
    fn width_below_capture_threshold_ignored() {
        let p = params();
        let bcs = BodyConditionScore::default();
        let without = compute_girth(105.0, None, bcs, 1.35, &p).unwrap();
        let with_noise = compute_girth(105.0, Some(15.0), bcs, 1.35, &p).unwrap();
        assert_eq!(without, with_noise);
    }

    #[test]
    fn range_widens_with_observed_calibration_error() {
        let mut state = calibrated_state(1.35);
        let m = Measurement::new(105.0, 125.0);
        let bcs = BodyConditionScore::default();

        state.stats.avg_error_percent = 4.0; // better than default, keep ±8%
        let tight = estimate(&m, None, bcs, &state, &params()).unwrap();
        assert!((tight.range.max_kg / tight.weight_kg - 1.08).abs() < 1e-9);

        state.stats.avg_error_percent = 12.0; // worse, widen to ±12%
        let wide = estimate(&m, None, bcs, &state, &params()).unwrap();
        assert!((wide.range.max_kg / wide.weight_kg - 1.12).abs() < 1e-9);
    }

    #[test]
    fn confidence_bonuses_and_cap() {
        let bcs = BodyConditionScore::default();
        assert_eq!(confidence_score(false, bcs, false, 0), 70);
        assert_eq!(confidence_score(true, bcs, false, 0), 82);
        assert_eq!(confidence_score(true, bcs, true, 5), 90);

        let extreme = BodyConditionScore::new(9).unwrap();
        assert_eq!(confidence_score(false, extreme, false, 0), 70);

        // Cap holds even if bonuses were retuned upward
        assert!(confidence_score(true, bcs, true, 50) <= CONFIDENCE_CAP);
    }

    proptest! {
        #[test]
        fn formula_round_trip_recovers_girth(
            girth in 80.0f64..260.0,
            length in 50.0f64..220.0,
        ) {
            let p = params();
            let weight = compute_weight(girth, length, &p).unwrap();
            let recovered = (weight * p.schaeffer_k / length).sqrt();
            prop_assert!((recovered - girth).abs() < 1e-9);
        }

        #[test]
        fn weight_monotonic_in_height_and_length(
            height in 80.0f64..180.0,
            length in 90.0f64..200.0,
            delta in 0.5f64..30.0,
        ) {
            let p = params();
            let bcs = BodyConditionScore::default();
            let ratio = 1.35;

            let g1 = compute_girth(height, None, bcs, ratio, &p).unwrap();
            let g2 = compute_girth(height + delta, None, bcs, ratio, &p).unwrap();
            let w_low = compute_weight(g1, length, &p).unwrap();
            let w_tall = compute_weight(g2, length, &p).unwrap();
            prop_assert!(w_tall > w_low);

            let w_long = compute_weight(g1, length + delta, &p).unwrap();
            prop_assert!(w_long > w_low);
        }

        #[test]
        fn adjusted_ratio_never_leaves_safety_band(
            height in 60.0f64..200.0,
            width in 0.0f64..150.0,
            bcs_raw in 1u8..=9,
            base in 1.0f64..1.6,
        ) {
            let p = params();
            let bcs = BodyConditionScore::new(bcs_raw).unwrap();
            let width = if width > 0.0 { Some(width) } else { None };
            let girth = compute_girth(height, width, bcs, base, &p).unwrap();
            let ratio = girth / height;
            prop_assert!(ratio >= p.min_ratio - 1e-9);
            prop_assert!(ratio <= p.max_ratio + 1e-9);
        }
    }
}
