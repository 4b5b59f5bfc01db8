//! Typed failures for the estimation formulas
//!
//! Bad field measurements are an expected, frequent condition (photos taken at
//! an angle, mistyped tape readings), so every failure carries the offending
//! field and the bound it violated for display back to the operator.

use thiserror::Error;

/// Errors produced by the pure estimation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// A measurement is outside the plausible physical range for cattle
    #[error("invalid measurement: {field} = {value} cm, minimum is {min} cm")]
    InvalidMeasurement {
        field: &'static str,
        value: f64,
        min: f64,
    },

    /// Scale weight must be a positive number of kilograms
    #[error("invalid scale weight: {0} kg")]
    InvalidScaleWeight(f64),

    /// Body condition score outside the standard 1-9 scale
    #[error("body condition score {0} is outside the 1-9 scale")]
    InvalidBodyCondition(u8),

    /// A girth/height ratio derived from inputs falls outside the sanity band,
    /// which indicates bad measurement input rather than a calibration signal
    #[error("girth/height ratio {ratio:.3} is outside the plausible band [{min}, {max}]")]
    RatioOutOfRange { ratio: f64, min: f64, max: f64 },
}
