//! Checks run once all interpretations of the system exist, rests included.

use crate::params::DotParams;
use crate::pending::PendingDot;
use log::{debug, info, warn};
use omr_sig_core::{Glyph, GlyphId, Rect, Shape};
use omr_sig_graph::{
    best_of, GapLimits, Inter, InterId, InterKind, Link, Relation, RelationKind, SystemInfo,
};

/// Relation from a dot to a partner on its left, graded from box gaps.
fn dot_after(
    system: &SystemInfo,
    kind: RelationKind,
    limits: &GapLimits,
    dot: &Rect,
    partner: &Rect,
    y_gap: f32,
) -> Relation {
    let scale = system.scale;
    let x_gap = dot.x - partner.right();
    Relation::graded(
        kind,
        limits,
        scale.pixels_to_frac(x_gap),
        scale.pixels_to_frac(y_gap),
    )
}

/// Best head (among the heads of the system chords) the dot may augment.
fn lookup_head_link(system: &SystemInfo, limits: &GapLimits, glyph: &Glyph) -> Option<Link> {
    let links = system
        .system_head_chords()
        .into_iter()
        .flat_map(|chord| system.chord_heads(chord))
        .filter_map(|head_id| {
            let head = system.sig.inter(head_id)?;
            let y_gap = (glyph.center.y - head.center().y).abs();
            let rel = dot_after(
                system,
                RelationKind::Augmentation,
                limits,
                &glyph.bounds,
                &head.bounds,
                y_gap,
            );
            rel.is_acceptable().then(|| Link::new(head_id, rel, true))
        });
    best_of(links)
}

/// Every rest the dot may augment.
fn lookup_rest_links(system: &SystemInfo, limits: &GapLimits, glyph: &Glyph) -> Vec<Link> {
    system
        .system_rests()
        .into_iter()
        .filter_map(|rest_id| {
            let rest = system.sig.inter(rest_id)?;
            let cy = glyph.center.y;
            let y_gap = if cy < rest.bounds.y {
                rest.bounds.y - cy
            } else if cy > rest.bounds.bottom() {
                cy - rest.bounds.bottom()
            } else {
                0.0
            };
            let rel = dot_after(
                system,
                RelationKind::Augmentation,
                limits,
                &glyph.bounds,
                &rest.bounds,
                y_gap,
            );
            rel.is_acceptable().then(|| Link::new(rest_id, rel, true))
        })
        .collect()
}

/// Best first augmentation dot the glyph may follow.
fn lookup_dot_link(
    system: &SystemInfo,
    limits: &GapLimits,
    glyph: &Glyph,
    firsts: &[InterId],
) -> Option<Link> {
    let links = firsts.iter().filter_map(|first_id| {
        let first = system.sig.inter(*first_id)?;
        if first.glyph == Some(glyph.id) || first.center().x >= glyph.center.x {
            return None;
        }
        let y_gap = (glyph.center.y - first.center().y).abs();
        let rel = dot_after(
            system,
            RelationKind::DoubleDot,
            limits,
            &glyph.bounds,
            &first.bounds,
            y_gap,
        );
        rel.is_acceptable().then(|| Link::new(*first_id, rel, true))
    });
    best_of(links)
}

fn apply_links(system: &mut SystemInfo, id: InterId, links: &[Link]) -> usize {
    let mut applied = 0;
    for link in links {
        match link.apply_to(&mut system.sig, id) {
            Ok(_) => applied += 1,
            Err(err) => warn!("{id} not linked to {}: {err}", link.partner),
        }
    }
    applied
}

/// Try the dot as the augmentation dot of a head or a rest.
///
/// A dot augments a single partner: the best-graded among the best head and
/// every qualifying rest, the head first on ties.
pub(crate) fn check_note_augmentation(
    system: &mut SystemInfo,
    params: &DotParams,
    dot: &PendingDot,
) -> Option<InterId> {
    if dot.is_vip() {
        info!("VIP note augmentation check for {}", dot.glyph.id);
    }
    let limits = params.relations.augmentation;
    let candidates = lookup_head_link(system, &limits, &dot.glyph)
        .into_iter()
        .chain(lookup_rest_links(system, &limits, &dot.glyph));
    let link = best_of(candidates)?;

    let staff = system.sig.inter(link.partner).and_then(|p| p.staff);
    let mut inter = Inter::new(
        InterKind::AugmentationDot,
        Shape::AugmentationDot,
        params.intrinsic_grade(dot.eval.grade),
        dot.glyph.bounds,
    )
    .with_glyph(dot.glyph.id);
    inter.staff = staff;
    let id = system.sig.add_vertex(inter);
    if apply_links(system, id, &[link]) == 0 {
        system.sig.remove(id);
        return None;
    }
    debug!(
        "created augmentation dot {id} from {} on {}",
        dot.glyph.id, link.partner
    );
    Some(id)
}

/// Once a glyph is accepted as a second dot, its own first-dot reading
/// gives up the note it augmented. A reading left without any relation is
/// removed.
fn demote_first_reading(system: &mut SystemInfo, glyph: GlyphId, second: InterId) -> usize {
    let readings: Vec<InterId> = system
        .sig
        .inters_by_shape(Shape::AugmentationDot)
        .into_iter()
        .filter(|id| *id != second)
        .filter(|id| system.sig.inter(*id).is_some_and(|i| i.glyph == Some(glyph)))
        .collect();
    let mut dropped = 0;
    for reading in readings {
        let edges = system.sig.outgoing(reading, RelationKind::Augmentation);
        dropped += system.sig.remove_all_edges(edges);
        if system.sig.edges_of(reading).is_empty() {
            system.sig.remove(reading);
        }
    }
    dropped
}

/// Try the dot as the second dot of a double augmentation.
///
/// `firsts` are the augmentation dots known after the note checks of every
/// pending dot. Only firsts left of the dot and from another glyph qualify;
/// the best-graded one wins.
pub(crate) fn check_double_dot(
    system: &mut SystemInfo,
    params: &DotParams,
    dot: &PendingDot,
    firsts: &[InterId],
) -> Option<InterId> {
    if dot.is_vip() {
        info!("VIP double dot check for {}", dot.glyph.id);
    }
    let glyph = &dot.glyph;
    let link = lookup_dot_link(system, &params.relations.double_dot, glyph, firsts)?;

    let staff = system.sig.inter(link.partner).and_then(|p| p.staff);
    let mut inter = Inter::new(
        InterKind::AugmentationDot,
        Shape::AugmentationDot,
        params.intrinsic_grade(dot.eval.grade),
        glyph.bounds,
    )
    .with_glyph(glyph.id);
    inter.staff = staff;
    let id = system.sig.add_vertex(inter);
    if apply_links(system, id, &[link]) == 0 {
        system.sig.remove(id);
        return None;
    }
    let dropped = demote_first_reading(system, glyph.id, id);
    debug!(
        "created second dot {id} from {} after {}, {dropped} note link(s) dropped",
        glyph.id, link.partner
    );
    Some(id)
}

/// Try the dot as the dot of one or several fermata arcs.
///
/// An arc above the dot (opening downward) holds it in its lower half-box,
/// an arc below it in its upper half-box. The fermata dot is created on the
/// first qualifying arc and linked to every one.
pub(crate) fn check_fermata(
    system: &mut SystemInfo,
    params: &DotParams,
    dot: &PendingDot,
    arcs: &[InterId],
) -> Option<InterId> {
    let limits = params.relations.dot_fermata;
    let scale = system.scale;
    let center = dot.glyph.center;
    let mut fermata_dot: Option<InterId> = None;

    for arc_id in arcs {
        let Some(arc) = system.sig.inter(*arc_id) else {
            continue;
        };
        let below = arc.shape == Shape::FermataArcBelow;
        let half = arc.bounds.half(!below);
        if !half.contains(center) {
            continue;
        }
        let target = if below {
            params.fermata_below_target
        } else {
            params.fermata_above_target
        };
        let x_gap = (center.x - half.center().x).abs();
        let y_gap = (center.y - (half.y + half.height * target)).abs();
        let rel = Relation::graded(
            RelationKind::DotFermata,
            &limits,
            scale.pixels_to_frac(x_gap),
            scale.pixels_to_frac(y_gap),
        );
        if !rel.is_acceptable() {
            continue;
        }

        let id = match fermata_dot {
            Some(id) => id,
            None => {
                let inter = Inter::new(
                    InterKind::FermataDot,
                    Shape::FermataDot,
                    params.intrinsic_grade(dot.eval.grade),
                    dot.glyph.bounds,
                )
                .with_glyph(dot.glyph.id);
                let id = system.sig.add_vertex(inter);
                debug!("created fermata dot {id} from {}", dot.glyph.id);
                fermata_dot = Some(id);
                id
            }
        };
        match system.sig.add_edge(id, *arc_id, rel) {
            Ok(_) => debug!("{arc_id} matches {}", dot.glyph.id),
            Err(err) => warn!("fermata dot {id} not linked to {arc_id}: {err}"),
        }
    }
    fermata_dot
}
