use omr_sig_core::Glyph;
use omr_sig_graph::SystemInfo;

/// Host hook fixing a glyph that does not fit a slur arc, typically by
/// splitting off foreign pixels.
pub trait GlyphRepair {
    /// A corrected glyph to fit again, or `None` when nothing can be done.
    fn repair(&mut self, system: &SystemInfo, glyph: &Glyph) -> Option<Glyph>;
}

/// Repair hook that never repairs anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRepair;

impl GlyphRepair for NoRepair {
    fn repair(&mut self, _system: &SystemInfo, _glyph: &Glyph) -> Option<Glyph> {
        None
    }
}
