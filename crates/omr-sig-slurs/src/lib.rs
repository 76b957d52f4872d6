//! Slurs: construction from curved glyphs and stitching across systems.
//!
//! [`SlurBuilder`] fits a circular arc on a slur glyph, looks for the notes
//! embraced at each end and records the slur in the system graph with its
//! `SlurLeftNote`/`SlurRightNote` relations. Once every system is built,
//! [`SlurStitcher`] connects slurs cut by a system break and keeps the
//! resulting chain in a [`SlurLinkage`] side table.

mod build;
mod linkage;
mod params;
mod repair;
mod stitch;

pub use build::{slur_note, SlurBuilder};
pub use linkage::{SlurConnection, SlurLinkage, SlurRef};
pub use params::SlurParams;
pub use repair::{GlyphRepair, NoRepair};
pub use stitch::SlurStitcher;
