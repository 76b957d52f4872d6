use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Horizontal side of an entity (barline side, slur end, stack side).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalSide {
    Left,
    Right,
}

impl HorizontalSide {
    pub const ALL: [HorizontalSide; 2] = [HorizontalSide::Left, HorizontalSide::Right];

    #[inline]
    pub fn opposite(self) -> HorizontalSide {
        match self {
            HorizontalSide::Left => HorizontalSide::Right,
            HorizontalSide::Right => HorizontalSide::Left,
        }
    }
}

/// Sign of `v` as -1, 0 or +1 (zero maps to zero, unlike `f32::signum`).
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Axis-aligned rectangle, `y` growing downward.
///
/// Empty rectangles (zero width or height) still carry a position so that a
/// point can be grown into a lookup window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Degenerate rectangle located at `p`.
    pub fn at(p: Point2<f32>) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// Rectangle of given size centred on `c`.
    pub fn centered(c: Point2<f32>, width: f32, height: f32) -> Self {
        Self::new(c.x - width / 2.0, c.y - height / 2.0, width, height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow by `dx` on both horizontal sides and `dy` on both vertical sides.
    pub fn grown(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Upper or lower half of this rectangle.
    pub fn half(&self, lower: bool) -> Rect {
        let h = self.height / 2.0;
        if lower {
            Rect::new(self.x, self.y + h, self.width, h)
        } else {
            Rect::new(self.x, self.y, self.width, h)
        }
    }

    /// Point containment, left/top edges inclusive, right/bottom exclusive.
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strict overlap test; rectangles that merely touch do not intersect.
    ///
    /// A degenerate rectangle intersects another one when it lies strictly
    /// inside it on the degenerate axis.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Straight segment, used for barline medians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point2<f32>,
    pub p2: Point2<f32>,
}

impl Segment {
    pub fn new(p1: Point2<f32>, p2: Point2<f32>) -> Self {
        Self { p1, p2 }
    }

    /// Abscissa of the (extended) line at ordinate `y`.
    ///
    /// A horizontal segment has no defined abscissa; the midpoint is used.
    pub fn x_at_y(&self, y: f32) -> f32 {
        let dy = self.p2.y - self.p1.y;
        if dy.abs() < f32::EPSILON {
            return 0.5 * (self.p1.x + self.p2.x);
        }
        self.p1.x + (y - self.p1.y) * (self.p2.x - self.p1.x) / dy
    }

    pub fn midpoint(&self) -> Point2<f32> {
        Point2::new(0.5 * (self.p1.x + self.p2.x), 0.5 * (self.p1.y + self.p2.y))
    }
}

/// Cubic Bézier curve: start point, two control points, end point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicCurve {
    pub p1: Point2<f32>,
    pub c1: Point2<f32>,
    pub c2: Point2<f32>,
    pub p2: Point2<f32>,
}

impl CubicCurve {
    pub fn new(p1: Point2<f32>, c1: Point2<f32>, c2: Point2<f32>, p2: Point2<f32>) -> Self {
        Self { p1, c1, c2, p2 }
    }

    /// Curve translated by `-offset` (pixel to system-relative coordinates).
    pub fn relative_to(&self, offset: Vector2<f32>) -> CubicCurve {
        CubicCurve::new(
            self.p1 - offset,
            self.c1 - offset,
            self.c2 - offset,
            self.p2 - offset,
        )
    }

    /// Signed area of the control polygon seen from the chord `p1 -> p2`.
    ///
    /// Negative when the first control point lies below the chord (y down),
    /// i.e. when the curve bulges downward.
    pub fn bulge(&self) -> f32 {
        let d = self.p2 - self.p1;
        (self.c1.x * d.y) - (self.c1.y * d.x) - (self.p1.x * d.y) + (self.p1.y * d.x)
    }

    pub fn end(&self, side: crate::HorizontalSide) -> Point2<f32> {
        match side {
            crate::HorizontalSide::Left => self.p1,
            crate::HorizontalSide::Right => self.p2,
        }
    }

    pub fn point_at(&self, t: f32) -> Point2<f32> {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point2::new(
            a * self.p1.x + b * self.c1.x + c * self.c2.x + d * self.p2.x,
            a * self.p1.y + b * self.c1.y + c * self.c2.y + d * self.p2.y,
        )
    }
}
