//! Staff barlines and their aggregation across the staves of a part.

use crate::graph::SIGraph;
use crate::inter::{InterId, InterTag};
use crate::relation::RelationKind;
use crate::system::Part;
use omr_sig_core::{HorizontalSide, Point2, Rect, Shape, StaffId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invalid-state conditions on barline queries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BarlineError {
    #[error("no staff barline for staff {} in part {part}", .staff.0)]
    NoStaffBarline { part: usize, staff: StaffId },
}

/// Visual style of a (staff) barline, derived from its bars left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarStyle {
    Regular,
    Heavy,
    LightLight,
    LightHeavy,
    HeavyLight,
    HeavyHeavy,
    /// Anything with more than two bars or non-bar shapes.
    Unusual,
}

impl BarStyle {
    pub fn from_shapes(shapes: &[Shape]) -> BarStyle {
        use Shape::{ThickBarline as Thick, ThinBarline as Thin};
        match shapes {
            [Thin] => BarStyle::Regular,
            [Thick] => BarStyle::Heavy,
            [Thin, Thin] => BarStyle::LightLight,
            [Thin, Thick] => BarStyle::LightHeavy,
            [Thick, Thin] => BarStyle::HeavyLight,
            [Thick, Thick] => BarStyle::HeavyHeavy,
            _ => BarStyle::Unusual,
        }
    }
}

/// The bars of one staff at one horizontal location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffBarline {
    pub staff: StaffId,
    /// Barline inters, left to right.
    pub bars: Vec<InterId>,
    pub style: BarStyle,
    pub left_x: f32,
    pub right_x: f32,
    pub center: Point2<f32>,
    /// Repeat dots on the right of the bars (start of a repeated section).
    #[serde(default)]
    pub left_repeat: bool,
    /// Repeat dots on the left of the bars (end of a repeated section).
    #[serde(default)]
    pub right_repeat: bool,
}

impl StaffBarline {
    /// Build from live barline inters; `None` when no bar is usable.
    pub fn from_bars(sig: &SIGraph, staff: StaffId, bars: &[InterId]) -> Option<Self> {
        let mut live: Vec<InterId> = bars
            .iter()
            .copied()
            .filter(|id| sig.inter(*id).is_some_and(|i| i.as_barline().is_some()))
            .collect();
        if live.is_empty() {
            return None;
        }
        sig.sort_by_abscissa(&mut live);

        let inters: Vec<_> = live.iter().filter_map(|id| sig.inter(*id)).collect();
        let shapes: Vec<Shape> = inters.iter().map(|i| i.shape).collect();
        let bounds = inters
            .iter()
            .skip(1)
            .fold(inters[0].bounds, |acc, i| acc.union(&i.bounds));
        let left_x = inters[0].center().x;
        let right_x = inters[inters.len() - 1].center().x;

        Some(Self {
            staff,
            style: BarStyle::from_shapes(&shapes),
            bars: live,
            left_x,
            right_x,
            center: bounds.center(),
            left_repeat: false,
            right_repeat: false,
        })
    }

    pub fn left_bar(&self) -> Option<InterId> {
        self.bars.first().copied()
    }

    pub fn right_bar(&self) -> Option<InterId> {
        self.bars.last().copied()
    }

    /// Bar facing repeat dots on `side` of a measure stack.
    ///
    /// Dots of a stack's left side sit right of its starting barline, and
    /// conversely.
    pub fn bar_facing(&self, stack_side: HorizontalSide) -> Option<InterId> {
        match stack_side {
            HorizontalSide::Left => self.right_bar(),
            HorizontalSide::Right => self.left_bar(),
        }
    }

    pub fn set_repeat(&mut self, stack_side: HorizontalSide) {
        match stack_side {
            HorizontalSide::Left => self.left_repeat = true,
            HorizontalSide::Right => self.right_repeat = true,
        }
    }

    /// Fermata arcs standing on these bars, top down.
    ///
    /// An arc counts when it carries a fermata dot, overlaps the bars
    /// horizontally and sits above the bars (or below them for
    /// [`Shape::FermataArcBelow`]) within one bar height.
    pub fn fermatas(&self, sig: &SIGraph) -> Vec<InterId> {
        let Some(bars) = self
            .bars
            .iter()
            .filter_map(|id| sig.inter(*id))
            .map(|i| i.bounds)
            .reduce(|acc, b| acc.union(&b))
        else {
            return Vec::new();
        };
        let mut arcs = sig.inters_where(|arc| {
            arc.tag() == InterTag::FermataArc && stands_on(&arc.bounds, arc.shape, &bars)
        });
        arcs.retain(|arc| sig.has_relation(*arc, RelationKind::DotFermata));
        sig.sort_by_ordinate(&mut arcs);
        arcs
    }
}

fn stands_on(arc: &Rect, shape: Shape, bars: &Rect) -> bool {
    if arc.x > bars.right() || arc.right() < bars.x {
        return false;
    }
    let gap = if shape == Shape::FermataArcBelow {
        arc.y - bars.bottom()
    } else {
        bars.y - arc.bottom()
    };
    (0.0..=bars.height).contains(&gap)
}

/// Logical barline of a part: one [`StaffBarline`] per staff, aligned with
/// the part's staves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartBarline {
    staff_barlines: Vec<StaffBarline>,
}

impl PartBarline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_staff_barlines(staff_barlines: Vec<StaffBarline>) -> Self {
        Self { staff_barlines }
    }

    /// Append the entry of the part's next staff.
    pub fn add_staff_barline(&mut self, staff_barline: StaffBarline) {
        self.staff_barlines.push(staff_barline);
    }

    pub fn staff_barlines(&self) -> &[StaffBarline] {
        &self.staff_barlines
    }

    pub fn staff_barlines_mut(&mut self) -> &mut [StaffBarline] {
        &mut self.staff_barlines
    }

    fn index_of(&self, part: &Part, staff: StaffId) -> Result<usize, BarlineError> {
        part.staff_index(staff)
            .filter(|i| self.staff_barlines.get(*i).is_some_and(|sb| sb.staff == staff))
            .ok_or(BarlineError::NoStaffBarline {
                part: part.id,
                staff,
            })
    }

    /// Entry of `staff`, which must belong to `part`.
    pub fn staff_barline(&self, part: &Part, staff: StaffId) -> Result<&StaffBarline, BarlineError> {
        let index = self.index_of(part, staff)?;
        Ok(&self.staff_barlines[index])
    }

    pub fn staff_barline_mut(
        &mut self,
        part: &Part,
        staff: StaffId,
    ) -> Result<&mut StaffBarline, BarlineError> {
        let index = self.index_of(part, staff)?;
        Ok(&mut self.staff_barlines[index])
    }

    pub fn left_x(&self, part: &Part, staff: StaffId) -> Result<f32, BarlineError> {
        Ok(self.staff_barline(part, staff)?.left_x)
    }

    pub fn right_x(&self, part: &Part, staff: StaffId) -> Result<f32, BarlineError> {
        Ok(self.staff_barline(part, staff)?.right_x)
    }

    /// Style of the first entry.
    pub fn style(&self) -> Option<BarStyle> {
        self.staff_barlines.first().map(|sb| sb.style)
    }

    pub fn is_left_repeat(&self) -> bool {
        self.staff_barlines.iter().any(|sb| sb.left_repeat)
    }

    pub fn is_right_repeat(&self) -> bool {
        self.staff_barlines.iter().any(|sb| sb.right_repeat)
    }

    /// Fermatas over every staff of the part, deduplicated, top down.
    pub fn fermatas(&self, sig: &SIGraph) -> Vec<InterId> {
        let mut arcs: Vec<InterId> = self
            .staff_barlines
            .iter()
            .flat_map(|sb| sb.fermatas(sig))
            .collect();
        sig.sort_by_ordinate(&mut arcs);
        arcs.dedup();
        arcs
    }

    /// Mean of the entries' centers.
    pub fn center(&self) -> Option<Point2<f32>> {
        if self.staff_barlines.is_empty() {
            return None;
        }
        let n = self.staff_barlines.len() as f32;
        let (sx, sy) = self
            .staff_barlines
            .iter()
            .fold((0.0, 0.0), |(sx, sy), sb| (sx + sb.center.x, sy + sb.center.y));
        Some(Point2::new(sx / n, sy / n))
    }
}

impl fmt::Display for PartBarline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PartBarline{")?;
        match self.style() {
            Some(style) => write!(f, "{style:?}")?,
            None => f.write_str("empty")?,
        }
        if self.is_left_repeat() {
            f.write_str(" left-repeat")?;
        }
        if self.is_right_repeat() {
            f.write_str(" right-repeat")?;
        }
        f.write_str(" staves:")?;
        for (i, sb) in self.staff_barlines.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", sb.staff.0)?;
        }
        f.write_str("}")
    }
}
