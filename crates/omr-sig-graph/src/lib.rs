//! Symbol interpretation graph (SIG) of a music system.
//!
//! The graph holds candidate interpretations ([`Inter`]) as vertices and
//! graded, typed relations ([`Relation`]) as edges. Resolvers propose
//! interpretations, grade their relations with [`GapLimits`], and rely on
//! the graph to enforce cardinality by replacement.
//!
//! ```
//! use omr_sig_graph::{Inter, InterKind, Relation, RelationKind, SIGraph};
//! use omr_sig_core::{Rect, Shape};
//!
//! let mut sig = SIGraph::new();
//! let rest = sig.add_vertex(Inter::new(
//!     InterKind::Rest,
//!     Shape::QuarterRest,
//!     0.8,
//!     Rect::new(0.0, 0.0, 10.0, 20.0),
//! ));
//! let dot = sig.add_vertex(Inter::new(
//!     InterKind::AugmentationDot,
//!     Shape::AugmentationDot,
//!     0.7,
//!     Rect::new(14.0, 6.0, 4.0, 4.0),
//! ));
//! sig.add_edge(dot, rest, Relation::new(RelationKind::Augmentation)).unwrap();
//! assert!(sig.has_relation(rest, RelationKind::Augmentation));
//! ```

mod barline;
mod error;
mod graph;
mod inter;
mod link;
mod quorum;
mod relation;
mod system;

pub use barline::{BarStyle, BarlineError, PartBarline, StaffBarline};
pub use error::SigError;
pub use graph::{EdgeId, GraphSnapshot, InterEntry, RelationEntry, SIGraph};
pub use inter::{BarlineData, ChordData, HeadData, Inter, InterId, InterKind, InterTag, SlurData};
pub use link::{best_of, Link};
pub use quorum::{side_quorum, SideQuorum};
pub use relation::{GapLimits, Relation, RelationKind, RelationParams};
pub use system::{Measure, MeasureStack, Part, SystemInfo};
