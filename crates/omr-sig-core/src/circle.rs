//! Circle fitting for curved glyphs (slurs, ties).
//!
//! The fit is the algebraic (Kåsa) least-squares circle: we solve
//! `x² + y² + D·x + E·y + F = 0` for `(D, E, F)` over all sample points, then
//! measure the RMS radial deviation of the samples as the fit distance.

use crate::geom::CubicCurve;
use nalgebra::{DMatrix, DVector, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Circle approximating a set of points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
    /// RMS distance of the fitted points to the circle, in pixels.
    pub distance: f32,
}

impl Circle {
    /// Least-squares circle through `points`.
    ///
    /// Returns `None` for fewer than 3 points or (near) collinear samples.
    pub fn fit(points: &[Point2<f32>]) -> Option<Circle> {
        let n = points.len();
        if n < 3 {
            return None;
        }

        // Centre the samples to keep the system well conditioned.
        let mean = points
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, p| {
                acc + Vector2::new(p.x as f64, p.y as f64)
            })
            / n as f64;

        let mut a = DMatrix::<f64>::zeros(n, 3);
        let mut b = DVector::<f64>::zeros(n);
        for (row, p) in points.iter().enumerate() {
            let x = p.x as f64 - mean.x;
            let y = p.y as f64 - mean.y;
            a[(row, 0)] = x;
            a[(row, 1)] = y;
            a[(row, 2)] = 1.0;
            b[row] = -(x * x + y * y);
        }

        let svd = a.svd(true, true);
        let sv_max = svd.singular_values.max();
        if sv_max <= 0.0 || svd.singular_values.min() <= sv_max * 1e-7 {
            // Collinear (or repeated) samples.
            return None;
        }
        let sol = svd.solve(&b, 1e-9).ok()?;
        let (d, e, f) = (sol[0], sol[1], sol[2]);
        let cx = -d / 2.0;
        let cy = -e / 2.0;
        let r2 = cx * cx + cy * cy - f;
        if !r2.is_finite() || r2 <= 0.0 {
            return None;
        }
        let radius = r2.sqrt();
        if !radius.is_finite() || radius > 1e6 {
            return None;
        }

        let center = Point2::new((cx + mean.x) as f32, (cy + mean.y) as f32);
        let radius = radius as f32;
        let sq_sum: f32 = points
            .iter()
            .map(|p| {
                let dev = (p - center).norm() - radius;
                dev * dev
            })
            .sum();
        let distance = (sq_sum / n as f32).sqrt();

        Some(Circle {
            center,
            radius,
            distance,
        })
    }

    /// Whether the fit is tight enough, `max_distance` in pixels.
    pub fn is_valid(&self, max_distance: f32) -> bool {
        self.distance <= max_distance
    }

    /// Cubic approximation of the arc from `start` to `end` passing near
    /// `through`.
    ///
    /// `start` and `end` are projected onto the circle first. Of the two arcs
    /// joining them, the one on the same side of the chord as `through` is
    /// kept.
    pub fn arc_curve(
        &self,
        start: Point2<f32>,
        end: Point2<f32>,
        through: Point2<f32>,
    ) -> CubicCurve {
        let c = self.center;
        let r = self.radius;
        let a1 = (start.y - c.y).atan2(start.x - c.x);
        let a2 = (end.y - c.y).atan2(end.x - c.x);
        let two_pi = 2.0 * std::f32::consts::PI;

        let mut sweep = (a2 - a1).rem_euclid(two_pi);
        if sweep > std::f32::consts::PI {
            sweep -= two_pi;
        }

        // Keep the arc on the side of `through`.
        let mid_angle = a1 + sweep / 2.0;
        let mid = Point2::new(c.x + r * mid_angle.cos(), c.y + r * mid_angle.sin());
        let chord = end - start;
        let side_of = |p: Point2<f32>| chord.x * (p.y - start.y) - chord.y * (p.x - start.x);
        if side_of(mid) * side_of(through) < 0.0 {
            sweep -= two_pi * sweep.signum();
        }

        let p1 = Point2::new(c.x + r * a1.cos(), c.y + r * a1.sin());
        let a_end = a1 + sweep;
        let p2 = Point2::new(c.x + r * a_end.cos(), c.y + r * a_end.sin());
        let k = 4.0 / 3.0 * (sweep / 4.0).tan();
        let t1 = Vector2::new(-a1.sin(), a1.cos());
        let t2 = Vector2::new(-a_end.sin(), a_end.cos());

        CubicCurve::new(p1, p1 + t1 * (k * r), p2 - t2 * (k * r), p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn arc_points(cx: f32, cy: f32, r: f32, from: f32, to: f32, n: usize) -> Vec<Point2<f32>> {
        (0..n)
            .map(|i| {
                let t = from + (to - from) * i as f32 / (n - 1) as f32;
                Point2::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect()
    }

    #[test]
    fn fits_exact_arc() {
        let pts = arc_points(50.0, 20.0, 30.0, 0.3, 2.8, 25);
        let circle = Circle::fit(&pts).expect("circle");
        assert_abs_diff_eq!(circle.center.x, 50.0, epsilon = 1e-2);
        assert_abs_diff_eq!(circle.center.y, 20.0, epsilon = 1e-2);
        assert_abs_diff_eq!(circle.radius, 30.0, epsilon = 1e-2);
        assert!(circle.is_valid(0.1));
    }

    #[test]
    fn rejects_collinear_points() {
        let pts: Vec<_> = (0..10).map(|i| Point2::new(i as f32, 2.0 * i as f32)).collect();
        assert!(Circle::fit(&pts).is_none());
    }

    #[test]
    fn arc_curve_stays_on_the_through_side() {
        // Lower half of a circle: the arc bulges downward (y down).
        let pts = arc_points(50.0, 0.0, 20.0, 0.2, std::f32::consts::PI - 0.2, 30);
        let circle = Circle::fit(&pts).expect("circle");
        let start = *pts.last().unwrap();
        let end = pts[0];
        let through = pts[15];
        let curve = circle.arc_curve(start, end, through);
        let mid = curve.point_at(0.5);
        assert_abs_diff_eq!(mid.x, 50.0, epsilon = 0.5);
        assert_abs_diff_eq!(mid.y, 20.0, epsilon = 0.5);
        assert!(curve.bulge() < 0.0);
    }
}
