//! Host input model.
//!
//! A sheet is a list of systems. Each system carries its staves, parts and
//! measure stacks, the interpretations the host already built (barlines,
//! heads, chords, rests, fermata arcs) and the glyphs left to resolve.
//! Interpretations refer to each other by their index in `inters`, which is
//! also their handle once loaded in the graph.

use crate::error::InputError;
use omr_sig_core::{Evaluation, Glyph, Point2, Scale, Staff, StaffId};
use omr_sig_graph::{
    Inter, InterId, InterKind, InterTag, Measure, MeasureStack, Part, PartBarline, StaffBarline,
    SystemInfo,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bars of one staff on one side of a stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffBarsInput {
    pub staff: StaffId,
    /// Indices of barline inters.
    pub bars: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackInput {
    pub left_x: f32,
    pub right_x: f32,
    #[serde(default)]
    pub left_bars: Vec<StaffBarsInput>,
    #[serde(default)]
    pub right_bars: Vec<StaffBarsInput>,
}

/// A glyph with its classifier evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphInput {
    #[serde(flatten)]
    pub glyph: Glyph,
    pub eval: Evaluation,
}

fn origin() -> Point2<f32> {
    Point2::origin()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemInput {
    /// Pixel location of the system-relative origin.
    #[serde(default = "origin")]
    pub origin: Point2<f32>,
    pub staves: Vec<Staff>,
    /// One part per distinct `Staff::part` when empty.
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub stacks: Vec<StackInput>,
    #[serde(default)]
    pub inters: Vec<Inter>,
    #[serde(default)]
    pub glyphs: Vec<GlyphInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetInput {
    /// Interline in pixels, overriding the configured one.
    #[serde(default)]
    pub interline: Option<f32>,
    pub systems: Vec<SystemInput>,
}

/// A loaded system and the glyphs still to resolve in it.
pub type LoadedSystem = (SystemInfo, Vec<(Glyph, Evaluation)>);

impl SystemInput {
    /// Build the system context after checking every cross reference.
    pub fn into_system(self, index: usize, scale: Scale) -> Result<LoadedSystem, InputError> {
        let mut system = SystemInfo::new(index, scale);
        system.origin = self.origin;
        system.parts = if self.parts.is_empty() {
            default_parts(&self.staves)
        } else {
            self.parts
        };
        system.staves = self.staves;

        for part in &system.parts {
            for staff in &part.staves {
                check_staff(&system, *staff)?;
            }
        }

        check_inters(&system, &self.inters)?;
        for inter in self.inters {
            system.sig.add_vertex(inter);
        }

        for (k, stack) in self.stacks.iter().enumerate() {
            let measures = system
                .parts
                .iter()
                .map(|part| {
                    Ok(Measure {
                        part: part.id,
                        left_barline: part_barline(&system, k, part, &stack.left_bars)?,
                        right_barline: part_barline(&system, k, part, &stack.right_bars)?,
                    })
                })
                .collect::<Result<Vec<_>, InputError>>()?;
            system.stacks.push(MeasureStack {
                left_x: stack.left_x,
                right_x: stack.right_x,
                measures,
                ..MeasureStack::default()
            });
        }

        let glyphs = self
            .glyphs
            .into_iter()
            .map(|g| (g.glyph, g.eval))
            .collect();
        Ok((system, glyphs))
    }
}

fn default_parts(staves: &[Staff]) -> Vec<Part> {
    let ids: BTreeSet<usize> = staves.iter().map(|s| s.part).collect();
    ids.into_iter()
        .map(|id| Part {
            id,
            staves: staves.iter().filter(|s| s.part == id).map(|s| s.id).collect(),
        })
        .collect()
}

fn check_staff(system: &SystemInfo, staff: StaffId) -> Result<(), InputError> {
    match system.staff(staff) {
        Some(_) => Ok(()),
        None => Err(InputError::UnknownStaff {
            system: system.index,
            staff,
        }),
    }
}

fn check_ref(
    system: usize,
    inters: &[Inter],
    id: InterId,
    tag: InterTag,
    expected: &'static str,
) -> Result<(), InputError> {
    let inter = inters
        .get(id.0 as usize)
        .ok_or(InputError::UnknownInter { system, index: id.0 })?;
    if inter.tag() != tag {
        return Err(InputError::WrongKind {
            system,
            index: id.0,
            expected,
        });
    }
    Ok(())
}

fn check_inters(system: &SystemInfo, inters: &[Inter]) -> Result<(), InputError> {
    for inter in inters {
        if let Some(staff) = inter.staff {
            check_staff(system, staff)?;
        }
        match &inter.kind {
            InterKind::HeadChord(chord) => {
                for head in &chord.heads {
                    check_ref(system.index, inters, *head, InterTag::Head, "head")?;
                }
            }
            InterKind::Head(head) => {
                if let Some(chord) = head.chord {
                    check_ref(system.index, inters, chord, InterTag::HeadChord, "head chord")?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Part barline of one stack side, `None` when no staff of the part has bars
/// there.
fn part_barline(
    system: &SystemInfo,
    stack: usize,
    part: &Part,
    bars: &[StaffBarsInput],
) -> Result<Option<PartBarline>, InputError> {
    for entry in bars {
        check_staff(system, entry.staff)?;
    }
    let mut barline = PartBarline::new();
    for staff in &part.staves {
        let Some(entry) = bars.iter().find(|b| b.staff == *staff) else {
            continue;
        };
        let ids: Vec<InterId> = entry.bars.iter().map(|i| InterId(*i)).collect();
        for id in &ids {
            let tag = system
                .sig
                .inter(*id)
                .map(|i| i.tag())
                .ok_or(InputError::UnknownInter {
                    system: system.index,
                    index: id.0,
                })?;
            if tag != InterTag::Barline {
                return Err(InputError::WrongKind {
                    system: system.index,
                    index: id.0,
                    expected: "barline",
                });
            }
        }
        let staff_barline = StaffBarline::from_bars(&system.sig, *staff, &ids).ok_or(
            InputError::EmptyStaffBarline {
                system: system.index,
                stack,
                staff: *staff,
            },
        )?;
        barline.add_staff_barline(staff_barline);
    }
    Ok((!barline.staff_barlines().is_empty()).then_some(barline))
}
