use crate::geom::Rect;
use crate::shape::Shape;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a glyph, owned by the glyph source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphId(pub u32);

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "glyph#{}", self.0)
    }
}

/// Connected-component image fragment, read-only for the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub id: GlyphId,
    /// Pixel bounding box.
    pub bounds: Rect,
    /// Pixel centroid.
    pub center: Point2<f32>,
    /// Optional pixel samples along the glyph skeleton, used by curve fits.
    #[serde(default)]
    pub points: Vec<Point2<f32>>,
    /// Very-important glyph: every decision about it is logged at info level.
    #[serde(default)]
    pub vip: bool,
}

impl Glyph {
    /// Glyph whose centroid is the centre of its box.
    pub fn from_bounds(id: u32, bounds: Rect) -> Self {
        Self {
            id: GlyphId(id),
            bounds,
            center: bounds.center(),
            points: Vec::new(),
            vip: false,
        }
    }

    pub fn with_points(mut self, points: Vec<Point2<f32>>) -> Self {
        self.points = points;
        self
    }
}

/// Classifier belief that a glyph has a given shape, `grade` in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub shape: Shape,
    pub grade: f64,
}

impl Evaluation {
    pub fn new(shape: Shape, grade: f64) -> Self {
        Self {
            shape,
            grade: grade.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:.3})", self.shape, self.grade)
    }
}
