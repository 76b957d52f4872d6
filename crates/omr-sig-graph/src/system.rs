//! Per-system context handed to the resolvers: staves, parts, measure
//! stacks and the interpretation graph.

use crate::barline::PartBarline;
use crate::graph::SIGraph;
use crate::inter::{InterId, InterTag};
use omr_sig_core::{HorizontalSide, Point2, Scale, Staff, StaffId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A part: consecutive staves played by one instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// 1-based id, stable across systems.
    pub id: usize,
    /// Staves top down.
    pub staves: Vec<StaffId>,
}

impl Part {
    /// Rank of `staff` within the part.
    pub fn staff_index(&self, staff: StaffId) -> Option<usize> {
        self.staves.iter().position(|s| *s == staff)
    }
}

/// One part's slice of a measure stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub part: usize,
    #[serde(default)]
    pub left_barline: Option<PartBarline>,
    #[serde(default)]
    pub right_barline: Option<PartBarline>,
}

impl Measure {
    pub fn barline(&self, side: HorizontalSide) -> Option<&PartBarline> {
        match side {
            HorizontalSide::Left => self.left_barline.as_ref(),
            HorizontalSide::Right => self.right_barline.as_ref(),
        }
    }

    pub fn barline_mut(&mut self, side: HorizontalSide) -> Option<&mut PartBarline> {
        match side {
            HorizontalSide::Left => self.left_barline.as_mut(),
            HorizontalSide::Right => self.right_barline.as_mut(),
        }
    }
}

/// Vertically aligned measures, one per part.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureStack {
    pub left_x: f32,
    pub right_x: f32,
    pub measures: Vec<Measure>,
    /// Sides accepted as repeat boundaries.
    #[serde(default)]
    pub repeats: BTreeSet<HorizontalSide>,
}

impl MeasureStack {
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left_x && x <= self.right_x
    }

    pub fn is_repeat(&self, side: HorizontalSide) -> bool {
        self.repeats.contains(&side)
    }

    pub fn add_repeat(&mut self, side: HorizontalSide) {
        self.repeats.insert(side);
    }

    pub fn measure(&self, part: usize) -> Option<&Measure> {
        self.measures.iter().find(|m| m.part == part)
    }
}

/// Everything known about one system.
#[derive(Clone, Debug)]
pub struct SystemInfo {
    /// Rank of the system in its sheet.
    pub index: usize,
    pub scale: Scale,
    /// Pixel location of the system's top-left corner; system-relative
    /// coordinates are measured from it.
    pub origin: Point2<f32>,
    pub staves: Vec<Staff>,
    pub parts: Vec<Part>,
    /// Measure stacks, left to right.
    pub stacks: Vec<MeasureStack>,
    pub sig: SIGraph,
}

impl SystemInfo {
    pub fn new(index: usize, scale: Scale) -> Self {
        Self {
            index,
            scale,
            origin: Point2::origin(),
            staves: Vec::new(),
            parts: Vec::new(),
            stacks: Vec::new(),
            sig: SIGraph::new(),
        }
    }

    pub fn staff(&self, id: StaffId) -> Option<&Staff> {
        self.staves.iter().find(|s| s.id == id)
    }

    /// Staff nearest to `p`: smallest vertical gap to the lines, then the
    /// smallest distance to the middle line.
    pub fn closest_staff(&self, p: Point2<f32>) -> Option<&Staff> {
        self.staves.iter().min_by(|a, b| {
            let ka = (a.vertical_gap(p.y), (p.y - a.mid_line_y()).abs());
            let kb = (b.vertical_gap(p.y), (p.y - b.mid_line_y()).abs());
            ka.0.total_cmp(&kb.0).then(ka.1.total_cmp(&kb.1))
        })
    }

    /// Pitch position of `p` relative to its closest staff.
    pub fn estimated_pitch(&self, p: Point2<f32>) -> Option<f32> {
        self.closest_staff(p).map(|s| s.pitch_position_of(p))
    }

    pub fn part(&self, id: usize) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn part_of_staff(&self, staff: StaffId) -> Option<&Part> {
        self.parts.iter().find(|p| p.staff_index(staff).is_some())
    }

    /// Index of the stack spanning abscissa `x`.
    pub fn stack_at(&self, x: f32) -> Option<usize> {
        self.stacks.iter().position(|s| s.contains_x(x))
    }

    pub fn first_stack(&self) -> Option<&MeasureStack> {
        self.stacks.first()
    }

    pub fn last_stack(&self) -> Option<&MeasureStack> {
        self.stacks.last()
    }

    /// Pixel point to system-relative coordinates.
    pub fn to_relative(&self, p: Point2<f32>) -> Point2<f32> {
        p - self.origin.coords
    }

    /// System-relative point to pixel coordinates.
    pub fn to_absolute(&self, p: Point2<f32>) -> Point2<f32> {
        p + self.origin.coords
    }

    pub fn system_bars(&self) -> Vec<InterId> {
        self.sig.inters_of(InterTag::Barline)
    }

    pub fn system_head_chords(&self) -> Vec<InterId> {
        self.sig.inters_of(InterTag::HeadChord)
    }

    pub fn system_rests(&self) -> Vec<InterId> {
        self.sig.inters_of(InterTag::Rest)
    }

    pub fn system_heads(&self) -> Vec<InterId> {
        self.sig.inters_of(InterTag::Head)
    }

    /// Live heads of a chord.
    pub fn chord_heads(&self, chord: InterId) -> Vec<InterId> {
        self.sig
            .inter(chord)
            .and_then(|c| c.as_chord())
            .map(|data| {
                data.heads
                    .iter()
                    .copied()
                    .filter(|h| self.sig.contains(*h))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn staff(id: usize, top: f32) -> Staff {
        Staff {
            id: StaffId(id),
            part: 1,
            left_x: 0.0,
            right_x: 1000.0,
            top_line_y: top,
            interline: 20.0,
        }
    }

    fn system() -> SystemInfo {
        let mut system = SystemInfo::new(0, Scale::default());
        system.staves = vec![staff(1, 100.0), staff(2, 300.0)];
        system.stacks = vec![
            MeasureStack {
                left_x: 0.0,
                right_x: 400.0,
                ..MeasureStack::default()
            },
            MeasureStack {
                left_x: 400.0,
                right_x: 1000.0,
                ..MeasureStack::default()
            },
        ];
        system
    }

    #[test]
    fn closest_staff_uses_vertical_gap() {
        let system = system();
        assert_eq!(system.closest_staff(Point2::new(0.0, 150.0)).unwrap().id, StaffId(1));
        assert_eq!(system.closest_staff(Point2::new(0.0, 260.0)).unwrap().id, StaffId(2));
        assert_relative_eq!(system.estimated_pitch(Point2::new(0.0, 130.0)).unwrap(), -1.0);
    }

    #[test]
    fn stacks_are_found_by_abscissa() {
        let system = system();
        assert_eq!(system.stack_at(10.0), Some(0));
        assert_eq!(system.stack_at(999.0), Some(1));
        assert_eq!(system.stack_at(1200.0), None);
    }

    #[test]
    fn relative_coordinates_round_trip() {
        let mut system = system();
        system.origin = Point2::new(50.0, 80.0);
        let p = Point2::new(60.0, 100.0);
        assert_eq!(system.to_relative(p), Point2::new(10.0, 20.0));
        assert_eq!(system.to_absolute(system.to_relative(p)), p);
    }
}
