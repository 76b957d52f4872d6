use omr_sig_core::{CubicCurve, GlyphId, Point2, Rect, Segment, Shape, StaffId, Step, StemDir};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of an interpretation inside its system graph.
///
/// Handles are arena indices: they stay valid after the interpretation is
/// removed, the graph simply stops reporting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterId(pub u32);

impl InterId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inter#{}", self.0)
    }
}

/// Barline payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarlineData {
    /// Median line of the bar, top to bottom.
    pub median: Segment,
    /// Mean width in pixels.
    pub width: f32,
}

/// Note head payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadData {
    pub step: Step,
    pub octave: i32,
    /// Chord the head belongs to, if known.
    #[serde(default)]
    pub chord: Option<InterId>,
}

/// Head chord payload: the heads sharing a stem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChordData {
    pub heads: Vec<InterId>,
    #[serde(default)]
    pub stem: StemDir,
    /// Free end of the stem (the head location for stemless chords).
    pub tail: Point2<f32>,
}

/// Slur payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlurData {
    /// Curve in system-relative coordinates.
    pub curve: CubicCurve,
    /// Whether the slur lies below its embraced notes.
    pub below: bool,
    pub tie: bool,
}

/// Kind-specific part of an interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterKind {
    Barline(BarlineData),
    /// Repeat dot, `pitch` is +1 or -1 (either side of the middle line).
    RepeatDot { pitch: i32 },
    AugmentationDot,
    FermataArc,
    FermataDot,
    Articulation,
    Head(HeadData),
    HeadChord(ChordData),
    Rest,
    Slur(SlurData),
}

/// Payload-free discriminant of [`InterKind`], used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterTag {
    Barline,
    RepeatDot,
    AugmentationDot,
    FermataArc,
    FermataDot,
    Articulation,
    Head,
    HeadChord,
    Rest,
    Slur,
}

impl InterKind {
    pub fn tag(&self) -> InterTag {
        match self {
            InterKind::Barline(_) => InterTag::Barline,
            InterKind::RepeatDot { .. } => InterTag::RepeatDot,
            InterKind::AugmentationDot => InterTag::AugmentationDot,
            InterKind::FermataArc => InterTag::FermataArc,
            InterKind::FermataDot => InterTag::FermataDot,
            InterKind::Articulation => InterTag::Articulation,
            InterKind::Head(_) => InterTag::Head,
            InterKind::HeadChord(_) => InterTag::HeadChord,
            InterKind::Rest => InterTag::Rest,
            InterKind::Slur(_) => InterTag::Slur,
        }
    }
}

/// Minimum share of the smaller box two glyph-less (or distinct-glyph)
/// interpretations must have in common to overlap.
const OVERLAP_RATIO: f32 = 0.5;

/// One candidate interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inter {
    pub kind: InterKind,
    pub shape: Shape,
    /// Intrinsic grade in [0, 1].
    pub grade: f64,
    /// Pixel bounding box.
    pub bounds: Rect,
    #[serde(default)]
    pub staff: Option<StaffId>,
    /// Underlying glyph, absent for interpretations built from several.
    #[serde(default)]
    pub glyph: Option<GlyphId>,
    /// Set by [`crate::SIGraph::remove`]; removed inters are skipped by every
    /// graph query.
    #[serde(default)]
    pub(crate) removed: bool,
}

impl Inter {
    pub fn new(kind: InterKind, shape: Shape, grade: f64, bounds: Rect) -> Self {
        Self {
            kind,
            shape,
            grade: grade.clamp(0.0, 1.0),
            bounds,
            staff: None,
            glyph: None,
            removed: false,
        }
    }

    pub fn with_staff(mut self, staff: StaffId) -> Self {
        self.staff = Some(staff);
        self
    }

    pub fn with_glyph(mut self, glyph: GlyphId) -> Self {
        self.glyph = Some(glyph);
        self
    }

    #[inline]
    pub fn tag(&self) -> InterTag {
        self.kind.tag()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        self.bounds.center()
    }

    /// Whether both interpretations claim the same image material.
    ///
    /// Interpretations of one glyph always overlap. Otherwise the boxes must
    /// share at least half of the smaller one.
    pub fn overlaps(&self, other: &Inter) -> bool {
        if let (Some(a), Some(b)) = (self.glyph, other.glyph) {
            if a == b {
                return true;
            }
        }
        let Some(common) = self.bounds.intersection(&other.bounds) else {
            return false;
        };
        let smaller = self.bounds.area().min(other.bounds.area());
        smaller > 0.0 && common.area() >= OVERLAP_RATIO * smaller
    }

    pub fn as_barline(&self) -> Option<&BarlineData> {
        match &self.kind {
            InterKind::Barline(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_head(&self) -> Option<&HeadData> {
        match &self.kind {
            InterKind::Head(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_chord(&self) -> Option<&ChordData> {
        match &self.kind {
            InterKind::HeadChord(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_slur(&self) -> Option<&SlurData> {
        match &self.kind {
            InterKind::Slur(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_slur_mut(&mut self) -> Option<&mut SlurData> {
        match &mut self.kind {
            InterKind::Slur(data) => Some(data),
            _ => None,
        }
    }
}

impl fmt::Display for Inter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:.3})", self.shape, self.grade)?;
        if let Some(glyph) = self.glyph {
            write!(f, " {glyph}")?;
        }
        Ok(())
    }
}
