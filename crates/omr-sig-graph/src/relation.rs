//! Typed relations and the gap grading protocol.
//!
//! Every relation derives its grade from two fractional gaps (interline
//! units) measured by the resolver that proposes it. The horizontal gap is
//! signed: positive means the partners are apart, negative that they
//! overlap. The grade is the weighted geometric mean of the horizontal and
//! vertical impacts, each a linear ramp from 1 (no gap) to 0 (maximum gap).

use omr_sig_core::grades::MIN_CONNECTION_GRADE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of relation kinds handled by the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Repeat dot to its barline.
    RepeatDotBar,
    /// Repeat dot to its partner on the other side of the middle line.
    RepeatDotPair,
    /// Fermata dot to a fermata arc.
    DotFermata,
    /// Augmentation dot to a head or a rest.
    Augmentation,
    /// Second augmentation dot to the first one.
    DoubleDot,
    /// Head chord to an articulation.
    ChordArticulation,
    /// Slur to the note it starts on.
    SlurLeftNote,
    /// Slur to the note it ends on.
    SlurRightNote,
}

impl RelationKind {
    pub const ALL: [RelationKind; 8] = [
        RelationKind::RepeatDotBar,
        RelationKind::RepeatDotPair,
        RelationKind::DotFermata,
        RelationKind::Augmentation,
        RelationKind::DoubleDot,
        RelationKind::ChordArticulation,
        RelationKind::SlurLeftNote,
        RelationKind::SlurRightNote,
    ];

    /// A source holds at most one outgoing relation of this kind.
    pub fn is_single_source(self) -> bool {
        matches!(
            self,
            RelationKind::RepeatDotBar
                | RelationKind::Augmentation
                | RelationKind::DoubleDot
                | RelationKind::SlurLeftNote
                | RelationKind::SlurRightNote
        )
    }

    /// A target holds at most one incoming relation of this kind.
    pub fn is_single_target(self) -> bool {
        matches!(
            self,
            RelationKind::DoubleDot
                | RelationKind::DotFermata
                | RelationKind::ChordArticulation
        )
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Maximum gaps and weights for one relation kind, in interline fractions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapLimits {
    /// Maximum horizontal gap when the partners are apart.
    pub x_out_gap_max: f32,
    /// Maximum horizontal overlap; 0 forbids any overlap.
    pub x_in_gap_max: f32,
    pub y_gap_max: f32,
    pub x_weight: f64,
    pub y_weight: f64,
    pub min_grade: f64,
}

impl Default for GapLimits {
    fn default() -> Self {
        Self::new(1.0, 0.0, 1.0)
    }
}

impl GapLimits {
    /// Limits with unit weights and the default minimum grade.
    pub const fn new(x_out_gap_max: f32, x_in_gap_max: f32, y_gap_max: f32) -> Self {
        Self {
            x_out_gap_max,
            x_in_gap_max,
            y_gap_max,
            x_weight: 1.0,
            y_weight: 1.0,
            min_grade: MIN_CONNECTION_GRADE,
        }
    }

    fn x_impact(&self, x_gap: f32) -> f64 {
        let impact = if x_gap >= 0.0 {
            if self.x_out_gap_max <= 0.0 {
                0.0
            } else {
                (self.x_out_gap_max - x_gap) / self.x_out_gap_max
            }
        } else if self.x_in_gap_max <= 0.0 {
            0.0
        } else {
            (self.x_in_gap_max + x_gap) / self.x_in_gap_max
        };
        f64::from(impact).clamp(0.0, 1.0)
    }

    fn y_impact(&self, y_gap: f32) -> f64 {
        if self.y_gap_max <= 0.0 {
            return if y_gap == 0.0 { 1.0 } else { 0.0 };
        }
        f64::from((self.y_gap_max - y_gap.abs()) / self.y_gap_max).clamp(0.0, 1.0)
    }

    /// Grade of a pair of fractional gaps.
    pub fn grade(&self, x_gap: f32, y_gap: f32) -> f64 {
        let xi = self.x_impact(x_gap);
        let yi = self.y_impact(y_gap);
        let weights = self.x_weight + self.y_weight;
        if weights <= 0.0 {
            return 0.0;
        }
        (xi.powf(self.x_weight) * yi.powf(self.y_weight)).powf(1.0 / weights)
    }
}

/// Gap limits for every graded relation kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationParams {
    pub repeat_dot_bar: GapLimits,
    pub dot_fermata: GapLimits,
    pub augmentation: GapLimits,
    pub double_dot: GapLimits,
    pub chord_articulation: GapLimits,
}

impl Default for RelationParams {
    fn default() -> Self {
        Self {
            repeat_dot_bar: GapLimits::new(1.5, 0.0, 0.5),
            dot_fermata: GapLimits::new(0.8, 0.8, 0.8),
            augmentation: GapLimits::new(1.25, 0.1, 0.8),
            double_dot: GapLimits::new(1.0, 0.1, 0.25),
            chord_articulation: GapLimits::new(0.75, 0.0, 2.0),
        }
    }
}

impl RelationParams {
    /// Limits of a graded kind; structural kinds (pairs, slur ends) have none.
    pub fn limits(&self, kind: RelationKind) -> Option<&GapLimits> {
        match kind {
            RelationKind::RepeatDotBar => Some(&self.repeat_dot_bar),
            RelationKind::DotFermata => Some(&self.dot_fermata),
            RelationKind::Augmentation => Some(&self.augmentation),
            RelationKind::DoubleDot => Some(&self.double_dot),
            RelationKind::ChordArticulation => Some(&self.chord_articulation),
            RelationKind::RepeatDotPair
            | RelationKind::SlurLeftNote
            | RelationKind::SlurRightNote => None,
        }
    }
}

/// A graded, typed edge payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    /// Horizontal gap in interline fractions, negative for an overlap.
    pub x_gap: f32,
    pub y_gap: f32,
    pub grade: f64,
    pub min_grade: f64,
    /// Forced by a user; automated pruning never touches it.
    #[serde(default)]
    pub manual: bool,
}

impl Relation {
    /// Ungraded relation, always acceptable.
    pub fn new(kind: RelationKind) -> Self {
        Self {
            kind,
            x_gap: 0.0,
            y_gap: 0.0,
            grade: 1.0,
            min_grade: 0.0,
            manual: false,
        }
    }

    /// Relation graded from the given gaps.
    pub fn graded(kind: RelationKind, limits: &GapLimits, x_gap: f32, y_gap: f32) -> Self {
        let mut rel = Self::new(kind);
        rel.set_gaps(limits, x_gap, y_gap, false);
        rel
    }

    /// Record the gaps and recompute the grade, which is returned.
    ///
    /// A manual relation keeps the maximum grade.
    pub fn set_gaps(&mut self, limits: &GapLimits, x_gap: f32, y_gap: f32, manual: bool) -> f64 {
        self.x_gap = x_gap;
        self.y_gap = y_gap;
        self.manual = manual;
        self.min_grade = limits.min_grade;
        self.grade = if manual { 1.0 } else { limits.grade(x_gap, y_gap) };
        self.grade
    }

    pub fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    /// Whether the relation may be attached to the graph.
    #[inline]
    pub fn is_acceptable(&self) -> bool {
        self.grade >= self.min_grade
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(x:{:.2} y:{:.2} g:{:.3})",
            self.kind, self.x_gap, self.y_gap, self.grade
        )?;
        if self.manual {
            f.write_str(" manual")?;
        }
        Ok(())
    }
}
