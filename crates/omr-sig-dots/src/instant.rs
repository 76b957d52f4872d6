//! Checks run as soon as a dot glyph is evaluated.
//!
//! Barlines and head chords of the system must already be in the graph.
//! Both checks are independent: one glyph may end up as a provisional
//! repeat dot and as a staccato at the same time.

use crate::params::DotParams;
use crate::pending::PendingDot;
use log::{debug, info, warn};
use omr_sig_core::{sign, Rect, Shape};
use omr_sig_graph::{best_of, Inter, InterId, InterKind, Link, Relation, RelationKind, SystemInfo};

/// Try the dot as one of the two dots of a repeat sign.
///
/// The dot must sit about one step away from the middle line. Among the
/// bars around it yielding an acceptable grade, the horizontally closest
/// one wins, whatever their grades.
pub(crate) fn check_repeat(
    system: &mut SystemInfo,
    params: &DotParams,
    dot: &PendingDot,
) -> Option<InterId> {
    let center = dot.glyph.center;
    let staff = system.closest_staff(center)?;
    let staff_id = staff.id;
    let pp = staff.pitch_position_of(center);
    let limits = params.relations.repeat_dot_bar;

    let pitch_dif = (pp.abs() - 1.0).abs();
    if pitch_dif > 2.0 * limits.y_gap_max {
        return None;
    }

    let scale = system.scale;
    let lookup = Rect::at(center).grown(
        scale.to_pixels(limits.x_out_gap_max),
        scale.to_pixels(limits.y_gap_max),
    );
    let bars = system.sig.intersected(&system.system_bars(), &lookup);

    let mut best: Option<(InterId, Relation, f32)> = None;
    for bar_id in bars {
        let Some(bar) = system.sig.inter(bar_id) else {
            continue;
        };
        let Some(data) = bar.as_barline() else {
            continue;
        };
        let bar_center = bar.center();
        let bar_y = bar_center.y + bar.bounds.height / 8.0 * sign(center.y - bar_center.y);
        let bar_x = data.median.x_at_y(bar_y) + data.width / 2.0 * sign(center.x - bar_center.x);
        let x_gap = (bar_x - center.x).abs();
        let y_gap = (bar_y - center.y).abs();
        let rel = Relation::graded(
            RelationKind::RepeatDotBar,
            &limits,
            scale.pixels_to_frac(x_gap),
            scale.pixels_to_frac(y_gap),
        );
        if !rel.is_acceptable() {
            continue;
        }
        if best.map_or(true, |(_, _, best_gap)| x_gap < best_gap) {
            best = Some((bar_id, rel, x_gap));
        }
    }

    let (bar, rel, _) = best?;
    let pitch = if pp > 0.0 { 1 } else { -1 };
    let inter = Inter::new(
        InterKind::RepeatDot { pitch },
        Shape::RepeatDot,
        params.intrinsic_grade(dot.eval.grade),
        dot.glyph.bounds,
    )
    .with_staff(staff_id)
    .with_glyph(dot.glyph.id);
    let id = system.sig.add_vertex(inter);
    if let Err(err) = system.sig.add_edge(id, bar, rel) {
        warn!("repeat dot {} not linked to {bar}: {err}", dot.glyph.id);
        system.sig.remove(id);
        return None;
    }

    if dot.is_vip() {
        info!("VIP created repeat dot {id} from {} ({rel})", dot.glyph.id);
    } else {
        debug!("created repeat dot {id} from {} ({rel})", dot.glyph.id);
    }
    Some(id)
}

/// Try the dot as a staccato above or below one of the system head chords.
///
/// The best-graded chord wins.
pub(crate) fn check_staccato(
    system: &mut SystemInfo,
    params: &DotParams,
    dot: &PendingDot,
) -> Option<InterId> {
    let center = dot.glyph.center;
    let limits = params.relations.chord_articulation;
    let scale = system.scale;

    let mut links = Vec::new();
    for chord_id in system.system_head_chords() {
        let Some(chord) = system.sig.inter(chord_id) else {
            continue;
        };
        let b = chord.bounds;
        let y_gap = if center.y < b.y {
            b.y - center.y
        } else if center.y > b.bottom() {
            center.y - b.bottom()
        } else {
            continue;
        };
        let x_gap = (center.x - b.center().x).abs();
        let rel = Relation::graded(
            RelationKind::ChordArticulation,
            &limits,
            scale.pixels_to_frac(x_gap),
            scale.pixels_to_frac(y_gap),
        );
        if rel.is_acceptable() {
            links.push(Link::new(chord_id, rel, false));
        }
    }

    let link = best_of(links)?;
    let staff = system.sig.inter(link.partner).and_then(|c| c.staff);
    let mut inter = Inter::new(
        InterKind::Articulation,
        Shape::Staccato,
        params.intrinsic_grade(dot.eval.grade),
        dot.glyph.bounds,
    )
    .with_glyph(dot.glyph.id);
    inter.staff = staff;
    let id = system.sig.add_vertex(inter);
    if let Err(err) = link.apply_to(&mut system.sig, id) {
        warn!("staccato {} not linked to {}: {err}", dot.glyph.id, link.partner);
        system.sig.remove(id);
        return None;
    }

    if dot.is_vip() {
        info!("VIP created staccato {id} from {} on {}", dot.glyph.id, link.partner);
    } else {
        debug!("created staccato {id} from {} on {}", dot.glyph.id, link.partner);
    }
    Some(id)
}
