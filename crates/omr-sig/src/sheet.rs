//! Sheet-level driver: per-system resolution, then stitching.

use crate::error::{InputError, SheetError};
use crate::input::{LoadedSystem, SheetInput};
use crate::io::SheetConfig;
use crate::report::{BarlineView, SheetReport, SystemReport};
use log::info;
use omr_sig_core::{Evaluation, Glyph, IssueLog, Scale, Shape};
use omr_sig_dots::{DotReport, DotResolver};
use omr_sig_graph::{InterId, SystemInfo};
use omr_sig_slurs::{NoRepair, SlurBuilder, SlurLinkage, SlurStitcher};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// One system once its glyphs are resolved.
#[derive(Clone, Debug)]
pub struct ResolvedSystem {
    pub system: SystemInfo,
    pub dots: DotReport,
    pub slurs: Vec<InterId>,
    pub issues: IssueLog,
}

/// Every system of a sheet, resolved and stitched.
#[derive(Clone, Debug)]
pub struct ProcessedSheet {
    pub systems: Vec<SystemInfo>,
    pub linkage: SlurLinkage,
    pub report: SheetReport,
}

/// Runs the resolvers over a sheet.
///
/// Systems are independent until stitching: they are resolved in parallel
/// (feature `rayon`), joined, then stitched pairwise in order.
#[derive(Clone, Debug, Default)]
pub struct SheetProcessor {
    config: SheetConfig,
    dots: DotResolver,
    slurs: SlurBuilder,
    stitcher: SlurStitcher,
}

impl SheetProcessor {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            dots: DotResolver::new(config.dots.clone()),
            slurs: SlurBuilder::new(config.slurs.clone()),
            stitcher: SlurStitcher::new(config.slurs.clone()),
            config,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Load, resolve and stitch a sheet described by host input.
    pub fn process(&self, input: SheetInput) -> Result<ProcessedSheet, SheetError> {
        let scale = match input.interline {
            Some(interline) => Scale::new(interline),
            None => self.config.scale(),
        }
        .map_err(InputError::from)?;
        let systems = input
            .systems
            .into_iter()
            .enumerate()
            .map(|(index, system)| system.into_system(index, scale))
            .collect::<Result<Vec<_>, InputError>>()?;
        Ok(self.run(systems))
    }

    /// Dot instant phase, slur construction, then dot late phase.
    ///
    /// Non-dot, non-slur glyphs are ignored. Slur glyphs are never repaired.
    pub fn resolve_system(
        &self,
        mut system: SystemInfo,
        glyphs: Vec<(Glyph, Evaluation)>,
    ) -> ResolvedSystem {
        let mut issues = IssueLog::new();
        let (slur_glyphs, others): (Vec<_>, Vec<_>) = glyphs
            .into_iter()
            .partition(|(_, eval)| eval.shape == Shape::Slur);

        let pending = self.dots.instant_phase(&mut system, others);
        let slurs = self.slurs.build_all(
            &mut system,
            &mut NoRepair,
            slur_glyphs.iter().map(|(glyph, eval)| (glyph, eval)),
            &mut issues,
        );
        let dots = self.dots.late_checks(&mut system, pending);

        ResolvedSystem {
            system,
            dots,
            slurs,
            issues,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(systems = systems.len()))
    )]
    pub fn run(&self, systems: Vec<LoadedSystem>) -> ProcessedSheet {
        #[cfg(feature = "rayon")]
        let resolved: Vec<ResolvedSystem> = systems
            .into_par_iter()
            .map(|(system, glyphs)| self.resolve_system(system, glyphs))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let resolved: Vec<ResolvedSystem> = systems
            .into_iter()
            .map(|(system, glyphs)| self.resolve_system(system, glyphs))
            .collect();

        let mut issues = IssueLog::new();
        let mut partial = Vec::with_capacity(resolved.len());
        let mut graphs = Vec::with_capacity(resolved.len());
        for r in resolved {
            issues.extend(r.issues);
            partial.push((r.dots, r.slurs));
            graphs.push(r.system);
        }

        let mut linkage = SlurLinkage::new();
        let mut stitch_issues = IssueLog::new();
        let connections = self
            .stitcher
            .stitch_all(&mut graphs, &mut linkage, &mut stitch_issues);
        issues.extend(stitch_issues);

        let systems = graphs
            .iter()
            .zip(partial)
            .map(|(system, (dots, slurs))| SystemReport {
                index: system.index,
                dots,
                slurs,
                barlines: BarlineView::collect(system),
                graph: system.sig.snapshot(),
            })
            .collect();
        info!(
            "sheet systems:{} slur connections:{} issues:{}",
            graphs.len(),
            connections.len(),
            issues.len()
        );

        ProcessedSheet {
            systems: graphs,
            linkage,
            report: SheetReport {
                systems,
                connections,
                issues: issues.into_issues(),
            },
        }
    }
}
