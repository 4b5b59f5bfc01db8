//! WebAssembly module for the Cattle Weight Estimation Platform
//!
//! Provides client-side computation for:
//! - Weight estimation from body measurements
//! - Girth/weight formula building blocks
//! - Breed detection from AI labels
//! - Client-side calibration recompute (persistence stays on the JS side)
//! - Chute photo reference-frame conversions

use chrono::Utc;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use cattle_weight_engine::calibrator::{breed_ratio, calibration_stats, optimal_ratio};
use cattle_weight_engine::CalibratorConfig;
use shared::{
    estimator, reference, BodyConditionScore, Breed, CalibrationState, EstimatorParams,
    Measurement,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Estimation request as the UI sends it
#[derive(Deserialize)]
struct EstimateRequest {
    height_cm: f64,
    length_cm: f64,
    #[serde(default)]
    width_cm: Option<f64>,
    #[serde(default)]
    bcs: Option<u8>,
    #[serde(default)]
    breed: Option<String>,
}

fn js_err(err: impl std::fmt::Display) -> String {
    err.to_string()
}

/// Estimate a weight from a measurement payload and the current calibration
/// state, both as JSON strings. Returns the estimate as JSON.
#[wasm_bindgen]
pub fn estimate_weight(request_json: &str, state_json: &str) -> Result<String, String> {
    let request: EstimateRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid request JSON: {e}"))?;
    let state: CalibrationState = serde_json::from_str(state_json)
        .map_err(|e| format!("Invalid calibration state JSON: {e}"))?;

    let measurement = Measurement {
        height_cm: request.height_cm,
        length_cm: request.length_cm,
        width_cm: request.width_cm,
    };
    let bcs = match request.bcs {
        Some(score) => BodyConditionScore::new(score).map_err(js_err)?,
        None => BodyConditionScore::default(),
    };
    let breed = request.breed.as_deref().and_then(Breed::from_label);

    let estimate = estimator::estimate(
        &measurement,
        breed,
        bcs,
        &state,
        &EstimatorParams::default(),
    )
    .map_err(js_err)?;

    serde_json::to_string(&estimate).map_err(js_err)
}

/// Predict chest girth from height with BCS and width adjustments
#[wasm_bindgen]
pub fn compute_girth_cm(
    height_cm: f64,
    width_cm: f64,
    bcs: u8,
    base_ratio: f64,
) -> Result<f64, String> {
    let bcs = BodyConditionScore::new(bcs).map_err(js_err)?;
    let width = (width_cm > 0.0).then_some(width_cm);
    estimator::compute_girth(height_cm, width, bcs, base_ratio, &EstimatorParams::default())
        .map_err(js_err)
}

/// Schaeffer formula: weight = girth² × length / K
#[wasm_bindgen]
pub fn compute_weight_kg(girth_cm: f64, length_cm: f64) -> Result<f64, String> {
    estimator::compute_weight(girth_cm, length_cm, &EstimatorParams::default()).map_err(js_err)
}

/// Girth/height ratio implied by a scale weight
#[wasm_bindgen]
pub fn implied_girth_ratio(
    height_cm: f64,
    length_cm: f64,
    true_weight_kg: f64,
) -> Result<f64, String> {
    estimator::implied_ratio(
        height_cm,
        length_cm,
        true_weight_kg,
        &EstimatorParams::default(),
    )
    .map_err(js_err)
}

/// Map an AI-detected breed label to the platform's breed key
///
/// Unknown labels fall back to the F1 cross, the herd's middle ground.
#[wasm_bindgen]
pub fn detect_breed(label: &str) -> String {
    let breed = Breed::from_label(label).unwrap_or(Breed::ZebuEuropeanCross);
    match serde_json::to_value(breed) {
        Ok(serde_json::Value::String(key)) => key,
        _ => "zebu_european_cross".to_string(),
    }
}

/// Recompute derived calibration ratios and stats from raw points
///
/// The JS side owns persistence (Firestore/localStorage); this keeps the
/// derived values honest after any client-side state edit.
#[wasm_bindgen]
pub fn recompute_calibration(state_json: &str) -> Result<String, String> {
    let mut state: CalibrationState = serde_json::from_str(state_json)
        .map_err(|e| format!("Invalid calibration state JSON: {e}"))?;

    let config = CalibratorConfig::default();
    let now = Utc::now();

    state.overall_ratio =
        optimal_ratio(&state.points, now, &config).unwrap_or(config.estimator.default_ratio);
    state.per_breed_ratio.clear();
    for breed in Breed::ALL {
        if let Some(ratio) = breed_ratio(&state.points, breed, now, &config) {
            state.per_breed_ratio.insert(breed, ratio);
        }
    }
    state.stats = calibration_stats(&state.points, state.overall_ratio, &config.estimator);
    state.last_updated = Some(now);

    serde_json::to_string(&state).map_err(js_err)
}

/// Pixel scale of a lateral chute photo from one known bar position
#[wasm_bindgen]
pub fn calibrate_lateral_scale(known_bar: u8, bar_y_px: f64) -> Result<f64, String> {
    reference::LateralFrame::from_known_bar(known_bar, bar_y_px)
        .map(|frame| frame.scale_px_per_cm)
        .ok_or_else(|| format!("No chute bar {known_bar} or degenerate position"))
}

/// Withers height in cm from lateral-view pixel coordinates
#[wasm_bindgen]
pub fn lateral_height_cm(withers_y_px: f64, scale_px_per_cm: f64) -> f64 {
    let frame = reference::LateralFrame {
        floor_y_px: reference::FLOOR_Y_PX,
        scale_px_per_cm,
    };
    frame.height_cm(withers_y_px)
}

/// Body length in cm from lateral-view pixel coordinates
#[wasm_bindgen]
pub fn lateral_length_cm(shoulder_x_px: f64, pinbone_x_px: f64, scale_px_per_cm: f64) -> f64 {
    let frame = reference::LateralFrame {
        floor_y_px: reference::FLOOR_Y_PX,
        scale_px_per_cm,
    };
    frame.length_cm(shoulder_x_px, pinbone_x_px)
}

/// Barrel width in cm from rear-view pixel coordinates of the chute columns
/// and the animal's edges
#[wasm_bindgen]
pub fn rear_width_cm(
    column_left_x_px: f64,
    column_right_x_px: f64,
    animal_left_x_px: f64,
    animal_right_x_px: f64,
) -> Result<f64, String> {
    let frame = reference::RearFrame::from_chute_columns(column_left_x_px, column_right_x_px)
        .ok_or_else(|| "Chute columns coincide, cannot derive scale".to_string())?;
    Ok(frame.width_cm(animal_left_x_px, animal_right_x_px))
}
