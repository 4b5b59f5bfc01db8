//! Chute (manga) photo reference frame
//!
//! Photos are taken with the animal standing in the cattle chute, whose bar
//! heights and internal width are known. That turns pixel coordinates from the
//! lateral and rear views into centimetres without any computer vision: the
//! AI service only has to report pixel positions.

use serde::{Deserialize, Serialize};

/// Pixel row of the chute floor in the standard camera setup
pub const FLOOR_Y_PX: f64 = 800.0;

/// Height of each lateral bar above the floor, in cm (bar 1 is the highest)
pub const BAR_HEIGHTS_CM: [(u8, f64); 6] = [
    (1, 158.0),
    (2, 130.0),
    (3, 102.0),
    (4, 74.0),
    (5, 46.0),
    (6, 18.0),
];

/// Scale observed when bar 3 sits at y=390 in the standard setup
pub const DEFAULT_SCALE_PX_PER_CM: f64 = 4.02;

/// Internal width between the chute columns, visible in the rear view
pub const INTERNAL_WIDTH_CM: f64 = 60.5;

pub fn bar_height_cm(bar: u8) -> Option<f64> {
    BAR_HEIGHTS_CM
        .iter()
        .find(|(n, _)| *n == bar)
        .map(|(_, h)| *h)
}

/// Lateral (side) view frame: derives height and length from pixel positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralFrame {
    pub floor_y_px: f64,
    pub scale_px_per_cm: f64,
}

impl LateralFrame {
    /// Calibrate the pixel scale from one bar with a known height
    pub fn from_known_bar(bar: u8, bar_y_px: f64) -> Option<Self> {
        Self::from_known_bar_with_floor(bar, bar_y_px, FLOOR_Y_PX)
    }

    pub fn from_known_bar_with_floor(bar: u8, bar_y_px: f64, floor_y_px: f64) -> Option<Self> {
        let height = bar_height_cm(bar)?;
        let scale = (floor_y_px - bar_y_px) / height;
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        Some(Self {
            floor_y_px,
            scale_px_per_cm: scale,
        })
    }

    /// Expected pixel row of a bar under this frame's scale
    pub fn bar_y_px(&self, bar: u8) -> Option<f64> {
        bar_height_cm(bar).map(|h| self.floor_y_px - h * self.scale_px_per_cm)
    }

    /// Withers height from the pixel row of the shoulder ridge
    pub fn height_cm(&self, withers_y_px: f64) -> f64 {
        (self.floor_y_px - withers_y_px) / self.scale_px_per_cm
    }

    /// Body length from the pixel columns of shoulder point and pin bone
    pub fn length_cm(&self, shoulder_x_px: f64, pinbone_x_px: f64) -> f64 {
        (pinbone_x_px - shoulder_x_px).abs() / self.scale_px_per_cm
    }
}

impl Default for LateralFrame {
    fn default() -> Self {
        Self {
            floor_y_px: FLOOR_Y_PX,
            scale_px_per_cm: DEFAULT_SCALE_PX_PER_CM,
        }
    }
}

/// Rear view frame: derives barrel width from the chute's internal width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RearFrame {
    pub scale_px_per_cm: f64,
}

impl RearFrame {
    /// Calibrate from the pixel columns of the two chute posts
    pub fn from_chute_columns(left_x_px: f64, right_x_px: f64) -> Option<Self> {
        let width_px = (right_x_px - left_x_px).abs();
        if width_px <= 0.0 {
            return None;
        }
        Some(Self {
            scale_px_per_cm: width_px / INTERNAL_WIDTH_CM,
        })
    }

    /// Barrel width from the animal's left and right edge pixels
    pub fn width_cm(&self, animal_left_x_px: f64, animal_right_x_px: f64) -> f64 {
        (animal_right_x_px - animal_left_x_px).abs() / self.scale_px_per_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_setup_recovers_documented_scale() {
        // Bar 3 (102 cm) at y=390 gives the documented 4.02 px/cm
        let frame = LateralFrame::from_known_bar(3, 390.0).unwrap();
        assert!((frame.scale_px_per_cm - 4.02).abs() < 0.005);
    }

    #[test]
    fn height_and_length_from_pixels() {
        let frame = LateralFrame {
            floor_y_px: 800.0,
            scale_px_per_cm: 4.0,
        };
        // Withers at y=380: (800-380)/4 = 105 cm
        assert!((frame.height_cm(380.0) - 105.0).abs() < 1e-9);
        // Shoulder at x=200, pin bone at x=700: 500 px / 4 = 125 cm
        assert!((frame.length_cm(200.0, 700.0) - 125.0).abs() < 1e-9);
        assert!((frame.length_cm(700.0, 200.0) - 125.0).abs() < 1e-9);
    }

    #[test]
    fn bar_positions_invert_the_scale() {
        let frame = LateralFrame::default();
        let y = frame.bar_y_px(3).unwrap();
        let recovered = LateralFrame::from_known_bar(3, y).unwrap();
        assert!((recovered.scale_px_per_cm - frame.scale_px_per_cm).abs() < 1e-9);
    }

    #[test]
    fn rear_frame_width() {
        // Chute posts 242 px apart over 60.5 cm: scale 4 px/cm
        let frame = RearFrame::from_chute_columns(300.0, 542.0).unwrap();
        assert!((frame.scale_px_per_cm - 4.0).abs() < 1e-9);
        assert!((frame.width_cm(380.0, 600.0) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_rejected() {
        assert!(LateralFrame::from_known_bar(9, 390.0).is_none());
        assert!(LateralFrame::from_known_bar(3, 800.0).is_none()); // zero scale
        assert!(RearFrame::from_chute_columns(100.0, 100.0).is_none());
    }
}
