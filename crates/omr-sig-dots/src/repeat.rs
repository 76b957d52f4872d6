//! Repeat sign finalization: pairing, pruning and stack assignment.

use crate::report::RepeatSide;
use log::{debug, info};
use omr_sig_core::{GlyphId, HorizontalSide, Shape};
use omr_sig_graph::{side_quorum, InterId, InterKind, Relation, RelationKind, SystemInfo};
use std::collections::BTreeSet;

/// Link repeat dots lying one interline apart vertically, left to right.
///
/// Each dot looks for partners in its box shifted toward the other side of
/// the middle line. The scan stops as soon as a candidate starts beyond the
/// right edge of that box. Returns the number of pairs linked.
pub(crate) fn build_repeat_pairs(system: &mut SystemInfo) -> usize {
    let interline = system.scale.interline();
    let dots = system.sig.inters_by_shape(Shape::RepeatDot);
    let mut pairs = Vec::new();

    for (i, dot_id) in dots.iter().enumerate() {
        let Some(dot) = system.sig.inter(*dot_id) else {
            continue;
        };
        let InterKind::RepeatDot { pitch } = dot.kind else {
            continue;
        };
        let lookup = dot.bounds.translated(0.0, -interline * pitch as f32);
        let x_break = lookup.right();

        for other_id in &dots[i + 1..] {
            let Some(other) = system.sig.inter(*other_id) else {
                continue;
            };
            if lookup.intersects(&other.bounds) {
                pairs.push((*dot_id, *other_id));
            } else if other.bounds.x >= x_break {
                break;
            }
        }
    }

    let mut linked = 0;
    for (dot, other) in pairs {
        debug!("pair {dot} and {other}");
        if system
            .sig
            .add_edge(dot, other, Relation::new(RelationKind::RepeatDotPair))
            .is_ok()
        {
            linked += 1;
        }
    }
    linked
}

/// Delete repeat dots left without a sibling. Manual ones are kept.
pub(crate) fn check_repeat_pairs(system: &mut SystemInfo, vips: &BTreeSet<GlyphId>) -> usize {
    let mut removed = 0;
    for dot in system.sig.inters_by_shape(Shape::RepeatDot) {
        if system.sig.has_relation(dot, RelationKind::RepeatDotPair) || system.sig.is_manual(dot)
        {
            continue;
        }
        let vip = system
            .sig
            .inter(dot)
            .and_then(|d| d.glyph)
            .is_some_and(|g| vips.contains(&g));
        if vip {
            info!("VIP deleting repeat dot lacking sibling {dot}");
        } else {
            debug!("deleting repeat dot lacking sibling {dot}");
        }
        if system.sig.remove(dot) {
            removed += 1;
        }
    }
    removed
}

/// Mark stack sides reaching the repeat quorum, then delete whatever
/// overlaps their repeat dots.
///
/// Returns the accepted sides and the number of deleted interpretations.
pub(crate) fn assign_stack_repeats(system: &mut SystemInfo) -> (Vec<RepeatSide>, usize) {
    let mut sides = Vec::new();
    let mut deleted = 0;

    for stack in 0..system.stacks.len() {
        for side in HorizontalSide::ALL {
            let quorum = side_quorum(system, stack, side);
            if !quorum.is_reached() {
                continue;
            }
            debug!(
                "stack#{stack} {side:?} repeat, bars:{} dots:{}",
                quorum.bar_count(),
                quorum.dot_count()
            );
            mark_repeat(system, stack, side);
            sides.push(RepeatSide { stack, side });

            let dots: BTreeSet<InterId> = quorum.dots().collect();
            deleted += delete_overlapping(system, &dots);
        }
    }
    (sides, deleted)
}

fn mark_repeat(system: &mut SystemInfo, stack: usize, side: HorizontalSide) {
    let Some(measure_stack) = system.stacks.get_mut(stack) else {
        return;
    };
    measure_stack.add_repeat(side);
    for measure in &mut measure_stack.measures {
        if let Some(barline) = measure.barline_mut(side) {
            for staff_barline in barline.staff_barlines_mut() {
                staff_barline.set_repeat(side);
            }
        }
    }
}

/// Repeat dots take precedence over any interpretation overlapping them.
fn delete_overlapping(system: &mut SystemInfo, dots: &BTreeSet<InterId>) -> usize {
    let sig = &system.sig;
    let mut doomed = BTreeSet::new();
    for dot_id in dots {
        let Some(dot) = sig.inter(*dot_id) else {
            continue;
        };
        for (id, inter) in sig.vertices() {
            if dots.contains(&id) || sig.is_manual(id) {
                continue;
            }
            if dot.bounds.intersects(&inter.bounds) && dot.overlaps(inter) {
                doomed.insert(id);
            }
        }
    }

    let mut deleted = 0;
    for id in doomed {
        debug!("{id} overlaps a repeat dot");
        if system.sig.remove(id) {
            deleted += 1;
        }
    }
    deleted
}
