//! Reference grade constants shared by all resolvers.

/// Ratio applied to a classifier grade to get the intrinsic grade of an
/// interpretation built from it.
pub const INTRINSIC_RATIO: f64 = 0.8;

/// Default minimum grade for a relation to be attached to the graph.
pub const MIN_CONNECTION_GRADE: f64 = 0.1;

/// Intrinsic grade of an interpretation built from an evaluation.
#[inline]
pub fn intrinsic_grade(ratio: f64, eval_grade: f64) -> f64 {
    (ratio * eval_grade).clamp(0.0, 1.0)
}
