//! Core types and utilities for symbol interpretation graphs.
//!
//! This crate is intentionally small and purely geometric. It knows about
//! glyphs, classifier evaluations, staves and the sheet scale, but nothing
//! about interpretations or their relations.

mod circle;
mod geom;
mod glyph;
pub mod grades;
mod issue;
mod logger;
mod music;
mod scale;
mod shape;
mod staff;

pub use circle::Circle;
pub use geom::{sign, CubicCurve, HorizontalSide, Rect, Segment};
pub use glyph::{Evaluation, Glyph, GlyphId};
pub use issue::{Issue, IssueLog, IssueSink, IssueTarget};
pub use music::{Step, StemDir};
pub use scale::{Scale, ScaleError};
pub use shape::Shape;
pub use staff::{Staff, StaffId};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_directives, init_with_level, LogDirectiveError, LogDirectives};

pub use nalgebra::{Point2, Vector2};
