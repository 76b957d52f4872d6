use omr_sig_core::HorizontalSide;
use serde::{Deserialize, Serialize};

/// A stack side accepted as a repeat boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatSide {
    /// Index of the measure stack in its system.
    pub stack: usize,
    pub side: HorizontalSide,
}

/// Summary of what the dot resolver did to one system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DotReport {
    pub system: usize,
    /// Dot glyphs recorded by the instant phase.
    pub pending: usize,
    /// Provisional repeat dots created by the instant phase.
    pub repeat_dots: usize,
    pub staccatos: usize,
    pub augmentation_dots: usize,
    pub double_dots: usize,
    pub fermata_dots: usize,
    pub repeat_pairs: usize,
    /// Repeat dots deleted for lack of a sibling.
    pub unpaired_removed: usize,
    /// Interpretations deleted because they overlap an accepted repeat dot.
    pub conflicts_removed: usize,
    pub repeat_sides: Vec<RepeatSide>,
}
