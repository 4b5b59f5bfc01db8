//! Input validation for body measurements
//!
//! Values below these thresholds are outside the plausible range for cattle
//! and are rejected as invalid input, never silently clamped.

use crate::error::EstimateError;
use crate::models::Measurement;

/// Minimum plausible withers height
pub const MIN_HEIGHT_CM: f64 = 60.0;

/// Minimum plausible chest girth
pub const MIN_GIRTH_CM: f64 = 80.0;

/// Minimum plausible body length
pub const MIN_LENGTH_CM: f64 = 50.0;

/// Width readings at or below this are treated as "not captured" rather than
/// as a real barrel measurement
pub const MIN_WIDTH_FOR_ADJUSTMENT_CM: f64 = 20.0;

pub fn validate_height(height_cm: f64) -> Result<(), EstimateError> {
    if !height_cm.is_finite() || height_cm < MIN_HEIGHT_CM {
        return Err(EstimateError::InvalidMeasurement {
            field: "height_cm",
            value: height_cm,
            min: MIN_HEIGHT_CM,
        });
    }
    Ok(())
}

pub fn validate_length(length_cm: f64) -> Result<(), EstimateError> {
    if !length_cm.is_finite() || length_cm < MIN_LENGTH_CM {
        return Err(EstimateError::InvalidMeasurement {
            field: "length_cm",
            value: length_cm,
            min: MIN_LENGTH_CM,
        });
    }
    Ok(())
}

pub fn validate_girth(girth_cm: f64) -> Result<(), EstimateError> {
    if !girth_cm.is_finite() || girth_cm < MIN_GIRTH_CM {
        return Err(EstimateError::InvalidMeasurement {
            field: "girth_cm",
            value: girth_cm,
            min: MIN_GIRTH_CM,
        });
    }
    Ok(())
}

/// Validate a full photographic measurement set
pub fn validate_measurement(measurement: &Measurement) -> Result<(), EstimateError> {
    validate_height(measurement.height_cm)?;
    validate_length(measurement.length_cm)?;
    if let Some(width) = measurement.width_cm {
        if !width.is_finite() || width <= 0.0 {
            return Err(EstimateError::InvalidMeasurement {
                field: "width_cm",
                value: width,
                min: 0.0,
            });
        }
    }
    Ok(())
}

pub fn validate_scale_weight(weight_kg: f64) -> Result<(), EstimateError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(EstimateError::InvalidScaleWeight(weight_kg));
    }
    Ok(())
}

/// Check an implied girth/height ratio against a sanity band
pub fn validate_implied_ratio(ratio: f64, min: f64, max: f64) -> Result<(), EstimateError> {
    if !ratio.is_finite() || ratio < min || ratio > max {
        return Err(EstimateError::RatioOutOfRange { ratio, min, max });
    }
    Ok(())
}
