use crate::instant::{check_repeat, check_staccato};
use crate::late::{check_double_dot, check_fermata, check_note_augmentation};
use crate::params::DotParams;
use crate::pending::{PendingDot, PendingDots};
use crate::repeat::{assign_stack_repeats, build_repeat_pairs, check_repeat_pairs};
use crate::report::DotReport;
use log::{debug, info};
use omr_sig_core::{Evaluation, Glyph, GlyphId, Shape};
use omr_sig_graph::{InterTag, SystemInfo};
use std::collections::BTreeSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Two-phase resolver of dot glyphs.
///
/// The instant phase runs per glyph and yields [`PendingDots`]; the late
/// phase consumes them once every other interpretation of the system is in
/// the graph.
#[derive(Clone, Debug, Default)]
pub struct DotResolver {
    params: DotParams,
}

impl DotResolver {
    pub fn new(params: DotParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &DotParams {
        &self.params
    }

    /// Record a dot glyph and try it as a repeat dot and as a staccato.
    ///
    /// Glyphs evaluated as anything but a dot shape are ignored.
    pub fn instant_checks(
        &self,
        system: &mut SystemInfo,
        pending: &mut PendingDots,
        glyph: Glyph,
        eval: Evaluation,
    ) {
        if !eval.shape.is_dot() {
            debug!("{} evaluated as {eval} is not a dot", glyph.id);
            return;
        }
        let dot = PendingDot { glyph, eval };
        if dot.is_vip() {
            info!("VIP instant dot checks for {} {}", dot.glyph.id, dot.eval);
        }
        if check_repeat(system, &self.params, &dot).is_some() {
            pending.repeat_dots += 1;
        }
        if check_staccato(system, &self.params, &dot).is_some() {
            pending.staccatos += 1;
        }
        pending.push(dot);
    }

    /// Run the instant checks over a batch of evaluated glyphs.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(system = system.index))
    )]
    pub fn instant_phase<I>(&self, system: &mut SystemInfo, glyphs: I) -> PendingDots
    where
        I: IntoIterator<Item = (Glyph, Evaluation)>,
    {
        let mut pending = PendingDots::new();
        for (glyph, eval) in glyphs {
            self.instant_checks(system, &mut pending, glyph, eval);
        }
        pending
    }

    /// Late checks, in order: note augmentation, double dot, fermata, then
    /// repeat finalization.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(system = system.index, dots = pending.len()))
    )]
    pub fn late_checks(&self, system: &mut SystemInfo, pending: PendingDots) -> DotReport {
        let mut report = DotReport {
            system: system.index,
            pending: pending.len(),
            repeat_dots: pending.repeat_dots(),
            staccatos: pending.staccatos(),
            ..DotReport::default()
        };

        for dot in pending.iter() {
            if check_note_augmentation(system, &self.params, dot).is_some() {
                report.augmentation_dots += 1;
            }
        }

        // Firsts are gathered once, after every note check.
        let firsts = system.sig.inters_by_shape(Shape::AugmentationDot);
        for dot in pending.iter() {
            if check_double_dot(system, &self.params, dot, &firsts).is_some() {
                report.double_dots += 1;
            }
        }

        let arcs = system.sig.inters_of(InterTag::FermataArc);
        if !arcs.is_empty() {
            for dot in pending.iter() {
                if check_fermata(system, &self.params, dot, &arcs).is_some() {
                    report.fermata_dots += 1;
                }
            }
        }

        let vips: BTreeSet<GlyphId> = pending
            .iter()
            .filter(|d| d.is_vip())
            .map(|d| d.glyph.id)
            .collect();
        report.repeat_pairs = build_repeat_pairs(system);
        report.unpaired_removed = check_repeat_pairs(system, &vips);
        let (sides, conflicts) = assign_stack_repeats(system);
        report.repeat_sides = sides;
        report.conflicts_removed = conflicts;

        info!(
            "system#{} dots:{} repeat pairs:{} staccato:{} augmentation:{} double:{} fermata:{} repeat sides:{}",
            report.system,
            report.pending,
            report.repeat_pairs,
            report.staccatos,
            report.augmentation_dots,
            report.double_dots,
            report.fermata_dots,
            report.repeat_sides.len()
        );
        report
    }
}
