//! Resolution of dot glyphs.
//!
//! A dot-shaped glyph may be a repeat dot, a staccato, an augmentation dot
//! (first or second), the dot of a fermata, or nothing. The resolver runs in
//! two phases per system:
//!
//! - [`DotResolver::instant_checks`] as soon as the glyph is evaluated
//!   (barlines and head chords already exist): provisional repeat dot and
//!   staccato;
//! - [`DotResolver::late_checks`] once all interpretations exist (rests
//!   included): augmentation, double dot, fermata, then repeat pairing,
//!   pruning and stack assignment.
//!
//! The instant phase hands its [`PendingDots`] to the late phase; nothing
//! else is shared between them.

mod instant;
mod late;
mod params;
mod pending;
mod repeat;
mod report;
mod resolver;

pub use params::DotParams;
pub use pending::{PendingDot, PendingDots};
pub use report::{DotReport, RepeatSide};
pub use resolver::DotResolver;
