use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Identity of a staff within its system (1-based, top down).
///
/// Staves at the same rank in consecutive systems share the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub usize);

/// A five-line staff, assumed horizontal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    /// Id of the containing part (1-based).
    pub part: usize,
    pub left_x: f32,
    pub right_x: f32,
    /// Ordinate of the top line, in pixels.
    pub top_line_y: f32,
    /// Distance between two lines, in pixels.
    pub interline: f32,
}

impl Staff {
    pub const LINE_COUNT: usize = 5;

    #[inline]
    pub fn bottom_line_y(&self) -> f32 {
        self.top_line_y + (Self::LINE_COUNT as f32 - 1.0) * self.interline
    }

    #[inline]
    pub fn mid_line_y(&self) -> f32 {
        self.top_line_y + 2.0 * self.interline
    }

    /// Pitch position of `p`: 0 on the middle line, one unit per half
    /// interline, positive downward (lines sit at -4, -2, 0, 2, 4).
    pub fn pitch_position_of(&self, p: Point2<f32>) -> f32 {
        (p.y - self.mid_line_y()) / (self.interline / 2.0)
    }

    /// Ordinate at a given pitch position.
    pub fn y_at_pitch(&self, pitch: f32) -> f32 {
        self.mid_line_y() + pitch * self.interline / 2.0
    }

    /// Vertical distance from `y` to the staff lines area (0 inside).
    pub fn vertical_gap(&self, y: f32) -> f32 {
        if y < self.top_line_y {
            self.top_line_y - y
        } else if y > self.bottom_line_y() {
            y - self.bottom_line_y()
        } else {
            0.0
        }
    }
}
