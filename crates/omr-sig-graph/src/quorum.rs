//! Quorum aggregation of repeat dots per measure-stack side.
//!
//! A side of a stack is a repeat boundary when the distinct repeat dots
//! attached to the bars facing that side are at least as many as those
//! bars, and there is at least one.

use crate::inter::InterId;
use crate::relation::RelationKind;
use crate::system::SystemInfo;
use log::trace;
use omr_sig_core::HorizontalSide;
use std::collections::BTreeSet;

/// Bars and dots gathered on one side of one measure stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideQuorum {
    pub stack: usize,
    pub side: HorizontalSide,
    bars: BTreeSet<InterId>,
    dots: BTreeSet<InterId>,
}

impl SideQuorum {
    pub fn new(stack: usize, side: HorizontalSide) -> Self {
        Self {
            stack,
            side,
            bars: BTreeSet::new(),
            dots: BTreeSet::new(),
        }
    }

    /// Count a bar and the dots attached to it.
    pub fn add_bar<I>(&mut self, bar: InterId, dots: I)
    where
        I: IntoIterator<Item = InterId>,
    {
        self.bars.insert(bar);
        self.dots.extend(dots);
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    pub fn dots(&self) -> impl Iterator<Item = InterId> + '_ {
        self.dots.iter().copied()
    }

    pub fn is_reached(&self) -> bool {
        self.dot_count() > 0 && self.dot_count() >= self.bar_count()
    }
}

/// Gather the quorum of `side` for the stack at `stack`.
///
/// For every part measure with a barline on that side, the bar facing the
/// stack contributes the repeat dots linked to it.
pub fn side_quorum(system: &SystemInfo, stack: usize, side: HorizontalSide) -> SideQuorum {
    let mut quorum = SideQuorum::new(stack, side);
    let Some(measure_stack) = system.stacks.get(stack) else {
        return quorum;
    };
    let sig = &system.sig;

    for measure in &measure_stack.measures {
        let Some(barline) = measure.barline(side) else {
            continue;
        };
        for staff_barline in barline.staff_barlines() {
            let Some(bar) = staff_barline.bar_facing(side) else {
                continue;
            };
            if !sig.contains(bar) {
                continue;
            }
            let dots = sig
                .incoming(bar, RelationKind::RepeatDotBar)
                .into_iter()
                .filter_map(|edge| sig.edge_source(edge));
            quorum.add_bar(bar, dots);
        }
    }

    trace!(
        "stack#{} {:?} bars:{} dots:{}",
        stack,
        side,
        quorum.bar_count(),
        quorum.dot_count()
    );
    quorum
}
