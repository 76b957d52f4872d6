//! Symbol interpretation graphs for optical music recognition.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates (`core`, `graph`, `dots`,
//!   `slurs`);
//! - a JSON input model for host-built systems ([`SheetInput`]);
//! - the sheet driver ([`SheetProcessor`]) resolving every system, in
//!   parallel with the `rayon` feature, then stitching slurs across system
//!   breaks;
//! - a JSON report ([`SheetReport`]) and the `omr-sig` command line tool
//!   (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use omr_sig::{SheetConfig, SheetInput, SheetProcessor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = SheetInput::load_json("sheet.json")?;
//! let sheet = SheetProcessor::new(SheetConfig::default()).process(input)?;
//! for issue in &sheet.report.issues {
//!     println!("{issue}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `omr_sig::core`: geometry, glyphs, staves, issues and logging.
//! - `omr_sig::graph`: interpretations, relations, the graph and barlines.
//! - `omr_sig::dots`: the two-phase dot resolver.
//! - `omr_sig::slurs`: slur construction and cross-system stitching.

pub use omr_sig_core as core;
pub use omr_sig_dots as dots;
pub use omr_sig_graph as graph;
pub use omr_sig_slurs as slurs;

mod error;
mod input;
mod io;
mod report;
mod sheet;

pub use error::{InputError, SheetError, SheetIoError};
pub use input::{GlyphInput, LoadedSystem, SheetInput, StackInput, StaffBarsInput, SystemInput};
pub use io::SheetConfig;
pub use report::{BarlineView, SheetReport, SystemReport};
pub use sheet::{ProcessedSheet, ResolvedSystem, SheetProcessor};

pub use omr_sig_core::{Issue, IssueLog, IssueSink};
pub use omr_sig_dots::{DotParams, DotReport, DotResolver};
pub use omr_sig_graph::{Inter, InterId, Relation, RelationKind, SIGraph, SystemInfo};
pub use omr_sig_slurs::{SlurLinkage, SlurParams, SlurStitcher};

/// Route `log` records into the `tracing` subscriber, then install it.
#[cfg(feature = "tracing")]
pub fn init_tracing(default_filter: &str, json: bool) {
    let _ = tracing_log::LogTracer::init();
    omr_sig_core::init_tracing(default_filter, json);
}
