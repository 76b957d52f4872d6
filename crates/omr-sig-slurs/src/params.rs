use omr_sig_core::grades::INTRINSIC_RATIO;
use serde::{Deserialize, Serialize};

/// Slur thresholds, in interline fractions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlurParams {
    /// Abscissa extension of the note lookup windows beyond a slur end.
    pub area_dx: f32,
    /// Abscissa margin of the note lookup windows inside the slur.
    pub area_x_margin: f32,
    /// Ordinate extension of the note lookup windows.
    pub area_dy: f32,
    /// Maximum pitch difference, in interlines, between the ends of two
    /// slurs connected across a system break.
    pub max_delta_y: f32,
    /// Maximum RMS distance of glyph points to the fitted circle.
    pub max_circle_distance: f32,
    pub intrinsic_ratio: f64,
}

impl Default for SlurParams {
    fn default() -> Self {
        Self {
            area_dx: 2.0,
            area_x_margin: 1.0,
            area_dy: 6.0,
            max_delta_y: 4.0,
            max_circle_distance: 0.2,
            intrinsic_ratio: INTRINSIC_RATIO,
        }
    }
}
