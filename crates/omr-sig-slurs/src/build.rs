//! Slur construction: fit, embraced notes and tie detection.

use crate::params::SlurParams;
use crate::repair::GlyphRepair;
use log::{debug, info};
use omr_sig_core::grades::intrinsic_grade;
use omr_sig_core::{
    Circle, CubicCurve, Evaluation, Glyph, HorizontalSide, Issue, IssueSink, Point2, Rect, Shape,
    StemDir,
};
use omr_sig_graph::{
    HeadData, Inter, InterId, InterKind, Relation, RelationKind, SIGraph, SlurData, SystemInfo,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where a note may be embraced: a chord by its stem tail, or a single head
/// by its center.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Node {
    Chord(InterId),
    Note(InterId),
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    node: Node,
    /// System-relative location tested against the window.
    location: Point2<f32>,
}

/// The note retained on one slur side, with its chord stem direction.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Side {
    note: InterId,
    stem: StemDir,
}

/// Builds slur interpretations out of slur-shaped glyphs.
#[derive(Clone, Debug, Default)]
pub struct SlurBuilder {
    params: SlurParams,
}

impl SlurBuilder {
    pub fn new(params: SlurParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SlurParams {
        &self.params
    }

    /// Build a slur from a curved glyph and link it to the notes it
    /// embraces.
    ///
    /// A glyph whose points do not fit a circle is reported and handed once
    /// to `repair`; the repaired glyph is fitted again without further
    /// repair. Returns `None` when no valid arc is found or when the slur
    /// embraces no note on either side.
    pub fn build(
        &self,
        system: &mut SystemInfo,
        repair: &mut dyn GlyphRepair,
        glyph: &Glyph,
        eval: &Evaluation,
        issues: &mut dyn IssueSink,
    ) -> Option<InterId> {
        build_slur(system, &self.params, repair, glyph, eval, issues)
    }

    /// Build slurs for every glyph evaluated as a slur; others are skipped.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(system = system.index))
    )]
    pub fn build_all<'a, I>(
        &self,
        system: &mut SystemInfo,
        repair: &mut dyn GlyphRepair,
        glyphs: I,
        issues: &mut dyn IssueSink,
    ) -> Vec<InterId>
    where
        I: IntoIterator<Item = (&'a Glyph, &'a Evaluation)>,
    {
        let slurs: Vec<InterId> = glyphs
            .into_iter()
            .filter(|(_, eval)| eval.shape == Shape::Slur)
            .filter_map(|(glyph, eval)| self.build(system, repair, glyph, eval, issues))
            .collect();
        debug!("system#{} slurs:{}", system.index, slurs.len());
        slurs
    }
}

fn build_slur(
    system: &mut SystemInfo,
    params: &SlurParams,
    repair: &mut dyn GlyphRepair,
    glyph: &Glyph,
    eval: &Evaluation,
    issues: &mut dyn IssueSink,
) -> Option<InterId> {
    let max_distance = system.scale.to_pixels(params.max_circle_distance);
    let (glyph, circle) = match fitted(glyph, max_distance) {
        Some(circle) => (glyph.clone(), circle),
        None => {
            let Some((fixed, circle)) = repair
                .repair(system, glyph)
                .and_then(|fixed| fitted(&fixed, max_distance).map(|c| (fixed, c)))
            else {
                issues.report_issue(Issue::glyph(system.index, glyph.id, "spurious slur glyph"));
                return None;
            };
            debug!("{} repaired as {}", glyph.id, fixed.id);
            (fixed, circle)
        }
    };

    let curve = arc_of(&circle, &glyph.points)?.relative_to(system.origin.coords);
    let below = curve.bulge() < 0.0;

    let left = embraced(system, params, &curve, below, HorizontalSide::Left);
    let right = embraced(system, params, &curve, below, HorizontalSide::Right);
    let (left, right) = select_sides(&left, &right);
    if left.is_none() && right.is_none() {
        issues.report_issue(Issue::glyph(
            system.index,
            glyph.id,
            "slur with no embraced notes",
        ));
        return None;
    }

    let tie = same_height(
        left.and_then(|s| head_data(&system.sig, s.note)),
        right.and_then(|s| head_data(&system.sig, s.note)),
    );
    let staff = left
        .or(right)
        .and_then(|s| system.sig.inter(s.note))
        .and_then(|n| n.staff);

    let grade = intrinsic_grade(params.intrinsic_ratio, eval.grade);
    let mut inter = Inter::new(
        InterKind::Slur(SlurData { curve, below, tie }),
        Shape::Slur,
        grade,
        glyph.bounds,
    )
    .with_glyph(glyph.id);
    if let Some(staff) = staff {
        inter = inter.with_staff(staff);
    }
    let slur = system.sig.add_vertex(inter);

    for (side, kind) in [
        (left, RelationKind::SlurLeftNote),
        (right, RelationKind::SlurRightNote),
    ] {
        if let Some(side) = side {
            // Both endpoints are live; a failure here would be a bug upstream.
            if let Err(err) = system.sig.add_edge(slur, side.note, Relation::new(kind)) {
                debug!("{slur} not linked to {}: {err}", side.note);
            }
        }
    }

    if glyph.vip {
        info!("VIP {slur} left:{left:?} right:{right:?} tie:{tie}");
    }
    Some(slur)
}

fn fitted(glyph: &Glyph, max_distance: f32) -> Option<Circle> {
    Circle::fit(&glyph.points).filter(|c| c.is_valid(max_distance))
}

/// Pixel curve from the leftmost to the rightmost point of the glyph.
fn arc_of(circle: &Circle, points: &[Point2<f32>]) -> Option<CubicCurve> {
    let start = points.iter().copied().min_by(|a, b| a.x.total_cmp(&b.x))?;
    let end = points.iter().copied().max_by(|a, b| a.x.total_cmp(&b.x))?;
    let mid_x = (start.x + end.x) / 2.0;
    let through = points
        .iter()
        .copied()
        .min_by(|a, b| (a.x - mid_x).abs().total_cmp(&(b.x - mid_x).abs()))?;
    Some(circle.arc_curve(start, end, through))
}

/// Lookup window at one end of a system-relative curve.
///
/// The window extends away from the slur bulge: downward for a slur above
/// its notes, upward for a slur below them.
pub(crate) fn window(
    system: &SystemInfo,
    params: &SlurParams,
    curve: &CubicCurve,
    below: bool,
    side: HorizontalSide,
) -> Rect {
    let dx = system.scale.to_pixels(params.area_dx);
    let x_margin = system.scale.to_pixels(params.area_x_margin);
    let dy = system.scale.to_pixels(params.area_dy);
    let end = curve.end(side);
    let x = match side {
        HorizontalSide::Left => end.x - dx,
        HorizontalSide::Right => end.x - x_margin,
    };
    let y = if below { end.y - dy } else { end.y };
    Rect::new(x, y, dx + x_margin, dy)
}

/// Sides of the notes closest to one end of the curve.
fn embraced(
    system: &SystemInfo,
    params: &SlurParams,
    curve: &CubicCurve,
    below: bool,
    side: HorizontalSide,
) -> Vec<Side> {
    let area = window(system, params, curve, below, side);
    let mut candidates = Vec::new();
    for chord in system.system_head_chords() {
        let Some(data) = system.sig.inter(chord).and_then(|c| c.as_chord()) else {
            continue;
        };
        let tail = system.to_relative(data.tail);
        if area.contains(tail) {
            candidates.push(Candidate {
                node: Node::Chord(chord),
                location: tail,
            });
        }
        for head in system.chord_heads(chord) {
            let Some(inter) = system.sig.inter(head) else {
                continue;
            };
            let center = system.to_relative(inter.center());
            if area.contains(center) {
                candidates.push(Candidate {
                    node: Node::Note(head),
                    location: center,
                });
            }
        }
    }

    closest(candidates, curve.end(side))
        .into_iter()
        .filter_map(|c| side_of(system, c.node))
        .collect()
}

/// Keep only the candidates at minimum distance from `end`.
fn closest(mut candidates: Vec<Candidate>, end: Point2<f32>) -> Vec<Candidate> {
    let dist = |c: &Candidate| (c.location - end).norm();
    candidates.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
    let Some(best) = candidates.first().map(dist) else {
        return candidates;
    };
    candidates.retain(|c| dist(c) <= best);
    candidates
}

/// A chord stands for its last head.
fn side_of(system: &SystemInfo, node: Node) -> Option<Side> {
    let (note, chord) = match node {
        Node::Chord(chord) => (*system.chord_heads(chord).last()?, Some(chord)),
        Node::Note(note) => (note, chord_of(system, note)),
    };
    let stem = chord
        .and_then(|c| system.sig.inter(c))
        .and_then(|c| c.as_chord())
        .map(|c| c.stem)
        .unwrap_or_default();
    Some(Side { note, stem })
}

fn chord_of(system: &SystemInfo, head: InterId) -> Option<InterId> {
    if let Some(chord) = head_data(&system.sig, head).and_then(|h| h.chord) {
        return Some(chord);
    }
    system
        .system_head_chords()
        .into_iter()
        .find(|c| system.chord_heads(*c).contains(&head))
}

/// Pick one side per end.
///
/// With a single note on one end, an ambiguous other end prefers the first
/// note sharing its stem direction, else its last note. Otherwise the first
/// candidate of each end is taken.
fn select_sides(left: &[Side], right: &[Side]) -> (Option<Side>, Option<Side>) {
    match (left.len(), right.len()) {
        (0, _) => (None, right.first().copied()),
        (_, 0) => (left.first().copied(), None),
        (1, n) if n > 1 => (left.first().copied(), matching(right, left[0].stem)),
        (n, 1) if n > 1 => (matching(left, right[0].stem), right.first().copied()),
        _ => (left.first().copied(), right.first().copied()),
    }
}

fn matching(sides: &[Side], stem: StemDir) -> Option<Side> {
    sides
        .iter()
        .find(|s| s.stem == stem)
        .or_else(|| sides.last())
        .copied()
}

pub(crate) fn head_data(sig: &SIGraph, head: InterId) -> Option<&HeadData> {
    sig.inter(head).and_then(|h| h.as_head())
}

/// Two notes at the same step and octave.
pub(crate) fn same_height(a: Option<&HeadData>, b: Option<&HeadData>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.step == b.step && a.octave == b.octave,
        _ => false,
    }
}

/// Note linked to one end of a slur.
pub fn slur_note(sig: &SIGraph, slur: InterId, side: HorizontalSide) -> Option<InterId> {
    let kind = match side {
        HorizontalSide::Left => RelationKind::SlurLeftNote,
        HorizontalSide::Right => RelationKind::SlurRightNote,
    };
    sig.outgoing(slur, kind)
        .first()
        .and_then(|edge| sig.edge_target(*edge))
}
