//! Photographic body measurements

use serde::{Deserialize, Serialize};

/// Body measurements taken from chute photographs
///
/// Width (ancho) comes from the rear view and is optional; height (altura) and
/// length (largo) come from the lateral view. The platform is agnostic to
/// whether the numbers came from manual entry or the AI vision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Withers height: floor to shoulder ridge, in cm
    pub height_cm: f64,
    /// Body length: shoulder point to pin bone, in cm
    pub length_cm: f64,
    /// Barrel width at the widest point, in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_cm: Option<f64>,
}

impl Measurement {
    pub fn new(height_cm: f64, length_cm: f64) -> Self {
        Self {
            height_cm,
            length_cm,
            width_cm: None,
        }
    }

    pub fn with_width(height_cm: f64, length_cm: f64, width_cm: f64) -> Self {
        Self {
            height_cm,
            length_cm,
            width_cm: Some(width_cm),
        }
    }

    /// Width as a proportion of height, when width was captured
    pub fn width_height_ratio(&self) -> Option<f64> {
        self.width_cm.map(|w| w / self.height_cm)
    }
}
