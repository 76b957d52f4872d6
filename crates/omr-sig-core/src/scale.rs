use serde::{Deserialize, Serialize};

/// Invalid scale definition.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("interline must be a positive finite number of pixels, got {0}")]
    InvalidInterline(f32),
}

/// Sheet scale: the interline (distance between two staff lines) in pixels.
///
/// All geometric thresholds are expressed as interline fractions and
/// converted through this type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    interline: f32,
}

impl Scale {
    pub fn new(interline: f32) -> Result<Self, ScaleError> {
        if !interline.is_finite() || interline <= 0.0 {
            return Err(ScaleError::InvalidInterline(interline));
        }
        Ok(Self { interline })
    }

    #[inline]
    pub fn interline(&self) -> f32 {
        self.interline
    }

    /// Convert an interline fraction to pixels.
    #[inline]
    pub fn to_pixels(&self, frac: f32) -> f32 {
        frac * self.interline
    }

    /// Convert a pixel distance to an interline fraction.
    #[inline]
    pub fn pixels_to_frac(&self, pixels: f32) -> f32 {
        pixels / self.interline
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self { interline: 20.0 }
    }
}
