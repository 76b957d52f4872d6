//! Slur stitching across system breaks.

use crate::build::{same_height, slur_note};
use crate::linkage::{far_head, SlurConnection, SlurLinkage, SlurRef};
use crate::params::SlurParams;
use log::{debug, info};
use omr_sig_core::{HorizontalSide, Issue, IssueSink, Point2, Staff};
use omr_sig_graph::{InterId, InterTag, SystemInfo};
use std::collections::BTreeSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Slur lacking its note on the side of a system break.
#[derive(Clone, Copy, Debug)]
struct Orphan {
    slur: InterId,
    /// Pixel end on the orphan side.
    end: Point2<f32>,
    /// System-relative ordinate of the left end, the sort key.
    y1: f32,
    part: usize,
}

/// Connects right orphans of a system to left orphans of the next one.
#[derive(Clone, Debug, Default)]
pub struct SlurStitcher {
    params: SlurParams,
}

impl SlurStitcher {
    pub fn new(params: SlurParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SlurParams {
        &self.params
    }

    /// Stitch every pair of consecutive systems, in order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(systems = systems.len()))
    )]
    pub fn stitch_all(
        &self,
        systems: &mut [SystemInfo],
        linkage: &mut SlurLinkage,
        issues: &mut dyn IssueSink,
    ) -> Vec<SlurConnection> {
        let mut connections = Vec::new();
        for next in 1..systems.len() {
            connections.extend(self.stitch(systems, next, linkage, issues));
        }
        connections
    }

    /// Connect the left orphans of `systems[next]` to the right orphans of
    /// `systems[next - 1]`, part by part.
    ///
    /// Orphans already connected are ignored, so running twice adds
    /// nothing. Orphans still unmatched are reported.
    pub fn stitch(
        &self,
        systems: &mut [SystemInfo],
        next: usize,
        linkage: &mut SlurLinkage,
        issues: &mut dyn IssueSink,
    ) -> Vec<SlurConnection> {
        let mut connections = Vec::new();
        if next == 0 || next >= systems.len() {
            return connections;
        }
        let (prev_sys, next_sys) = (&systems[next - 1], &systems[next]);
        let prev_orphans = orphans(prev_sys, linkage, HorizontalSide::Right);
        let next_orphans = orphans(next_sys, linkage, HorizontalSide::Left);
        let parts: BTreeSet<usize> = prev_orphans
            .iter()
            .chain(&next_orphans)
            .map(|o| o.part)
            .collect();

        let mut unmatched = Vec::new();
        for part in parts {
            let lefts: Vec<&Orphan> = next_orphans.iter().filter(|o| o.part == part).collect();
            let rights: Vec<&Orphan> = prev_orphans.iter().filter(|o| o.part == part).collect();
            let mut used = vec![false; rights.len()];

            'orphans: for left in lefts {
                let next_ref = SlurRef::new(next_sys.index, left.slur);
                for (j, right) in rights.iter().enumerate() {
                    if used[j] || !self.compatible(prev_sys, right, next_sys, left) {
                        continue;
                    }
                    used[j] = true;
                    let prev_ref = SlurRef::new(prev_sys.index, right.slur);
                    let tie = same_height(
                        far_head(systems, linkage.far_left_note(systems, prev_ref)),
                        far_head(systems, linkage.far_right_note(systems, next_ref)),
                    );
                    let connection = SlurConnection {
                        prev: prev_ref,
                        next: next_ref,
                        tie,
                    };
                    if linkage.connect(connection) {
                        debug!("connected {prev_ref} to {next_ref} tie:{tie}");
                        connections.push(connection);
                    }
                    continue 'orphans;
                }
                unmatched.push(unmatched_issue(next_sys, left));
            }

            for (j, right) in rights.iter().enumerate() {
                if !used[j] {
                    unmatched.push(unmatched_issue(prev_sys, right));
                }
            }
        }

        for issue in unmatched {
            issues.report_issue(issue);
        }

        for connection in &connections {
            for slur in [connection.prev, connection.next] {
                set_tie(systems, slur, connection.tie);
            }
        }
        if !connections.is_empty() {
            info!(
                "system#{} slurs connected to previous system: {}",
                systems[next].index,
                connections.len()
            );
        }
        connections
    }

    /// Same staff rank in the same part, and close pitch positions.
    fn compatible(
        &self,
        prev_sys: &SystemInfo,
        prev: &Orphan,
        next_sys: &SystemInfo,
        next: &Orphan,
    ) -> bool {
        let (Some(prev_staff), Some(next_staff)) = (
            prev_sys.closest_staff(prev.end),
            next_sys.closest_staff(next.end),
        ) else {
            return false;
        };
        if !same_staff(prev_sys, prev_staff, next_sys, next_staff) {
            return false;
        }
        let delta = prev_staff.pitch_position_of(prev.end) - next_staff.pitch_position_of(next.end);
        delta.abs() <= 2.0 * self.params.max_delta_y
    }
}

/// Staves match by rank within their part, or by id when parts are unknown.
fn same_staff(prev_sys: &SystemInfo, prev: &Staff, next_sys: &SystemInfo, next: &Staff) -> bool {
    let rank = |system: &SystemInfo, staff: &Staff| {
        system
            .part(staff.part)
            .and_then(|p| p.staff_index(staff.id))
    };
    match (rank(prev_sys, prev), rank(next_sys, next)) {
        (Some(a), Some(b)) => prev.part == next.part && a == b,
        _ => prev.id == next.id,
    }
}

/// Slurs of the stack next to a system break, missing their note on that
/// side and not yet extended, sorted by left end ordinate.
///
/// `Right` looks in the last stack, `Left` in the first one.
fn orphans(system: &SystemInfo, linkage: &SlurLinkage, side: HorizontalSide) -> Vec<Orphan> {
    let stack = match side {
        HorizontalSide::Left => system.first_stack(),
        HorizontalSide::Right => system.last_stack(),
    };
    let Some(stack) = stack else {
        return Vec::new();
    };

    let mut orphans = Vec::new();
    for slur in system.sig.inters_of(InterTag::Slur) {
        let Some(data) = system.sig.inter(slur).and_then(|s| s.as_slur()) else {
            continue;
        };
        if slur_note(&system.sig, slur, side).is_some()
            || linkage
                .extension(SlurRef::new(system.index, slur), side)
                .is_some()
        {
            continue;
        }
        let end = system.to_absolute(data.curve.end(side));
        // Ends drawn past the system edge still belong to the outer stack.
        let in_stack = match side {
            HorizontalSide::Left => end.x <= stack.right_x,
            HorizontalSide::Right => end.x >= stack.left_x,
        };
        if !in_stack {
            continue;
        }
        let Some(staff) = system.closest_staff(end) else {
            continue;
        };
        orphans.push(Orphan {
            slur,
            end,
            y1: data.curve.p1.y,
            part: staff.part,
        });
    }
    orphans.sort_by(|a, b| a.y1.total_cmp(&b.y1));
    orphans
}

fn unmatched_issue(system: &SystemInfo, orphan: &Orphan) -> Issue {
    let message = format!("could not connect slur {}", orphan.slur);
    match system.sig.inter(orphan.slur).and_then(|s| s.glyph) {
        Some(glyph) => Issue::glyph(system.index, glyph, message),
        None => Issue::at(system.index, orphan.end, message),
    }
}

fn set_tie(systems: &mut [SystemInfo], slur: SlurRef, tie: bool) {
    if let Some(data) = systems
        .iter_mut()
        .find(|s| s.index == slur.system)
        .and_then(|s| s.sig.inter_mut(slur.inter))
        .and_then(|i| i.as_slur_mut())
    {
        data.tie = tie;
    }
}
