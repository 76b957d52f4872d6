use crate::build::{head_data, same_height, slur_note};
use omr_sig_core::HorizontalSide;
use omr_sig_graph::{HeadData, InterId, SystemInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle on a slur living in some system of the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlurRef {
    /// `SystemInfo::index` of the owning system.
    pub system: usize,
    pub inter: InterId,
}

impl SlurRef {
    pub fn new(system: usize, inter: InterId) -> Self {
        Self { system, inter }
    }
}

impl fmt::Display for SlurRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}/{}", self.system, self.inter)
    }
}

/// Two slurs joined across a system break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlurConnection {
    /// Right orphan of the earlier system.
    pub prev: SlurRef,
    /// Left orphan of the following system.
    pub next: SlurRef,
    /// Whether the far-side notes share step and octave.
    pub tie: bool,
}

/// Side table of slur extensions across systems.
///
/// A connection sets `prev`'s right extension and `next`'s left extension
/// at once; neither end can be connected twice on the same side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlurLinkage {
    connections: Vec<SlurConnection>,
}

impl SlurLinkage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection.
    ///
    /// Returns `false`, leaving the table untouched, when `prev` already has
    /// a right extension or `next` a left one.
    pub fn connect(&mut self, connection: SlurConnection) -> bool {
        if self.right_extension(connection.prev).is_some()
            || self.left_extension(connection.next).is_some()
        {
            return false;
        }
        self.connections.push(connection);
        true
    }

    pub fn left_extension(&self, slur: SlurRef) -> Option<SlurRef> {
        self.connections
            .iter()
            .find(|c| c.next == slur)
            .map(|c| c.prev)
    }

    pub fn right_extension(&self, slur: SlurRef) -> Option<SlurRef> {
        self.connections
            .iter()
            .find(|c| c.prev == slur)
            .map(|c| c.next)
    }

    pub fn extension(&self, slur: SlurRef, side: HorizontalSide) -> Option<SlurRef> {
        match side {
            HorizontalSide::Left => self.left_extension(slur),
            HorizontalSide::Right => self.right_extension(slur),
        }
    }

    pub fn connections(&self) -> &[SlurConnection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Note embraced at the far left of the chain `slur` belongs to,
    /// following left extensions backward, as `(system index, head)`.
    pub fn far_left_note(
        &self,
        systems: &[SystemInfo],
        slur: SlurRef,
    ) -> Option<(usize, InterId)> {
        self.far_note(systems, slur, HorizontalSide::Left)
    }

    /// Note embraced at the far right of the chain `slur` belongs to.
    pub fn far_right_note(
        &self,
        systems: &[SystemInfo],
        slur: SlurRef,
    ) -> Option<(usize, InterId)> {
        self.far_note(systems, slur, HorizontalSide::Right)
    }

    fn far_note(
        &self,
        systems: &[SystemInfo],
        slur: SlurRef,
        side: HorizontalSide,
    ) -> Option<(usize, InterId)> {
        let mut current = slur;
        // A chain never visits more slurs than there are connections.
        for _ in 0..=self.connections.len() {
            let system = system_of(systems, current.system)?;
            if let Some(note) = slur_note(&system.sig, current.inter, side) {
                return Some((current.system, note));
            }
            current = self.extension(current, side)?;
        }
        None
    }

    /// Whether the far-side notes of the chain through `slur` make a tie.
    pub fn is_tie(&self, systems: &[SystemInfo], slur: SlurRef) -> bool {
        same_height(
            far_head(systems, self.far_left_note(systems, slur)),
            far_head(systems, self.far_right_note(systems, slur)),
        )
    }
}

pub(crate) fn system_of(systems: &[SystemInfo], index: usize) -> Option<&SystemInfo> {
    systems.iter().find(|s| s.index == index)
}

pub(crate) fn far_head(
    systems: &[SystemInfo],
    note: Option<(usize, InterId)>,
) -> Option<&HeadData> {
    let (system, head) = note?;
    head_data(&system_of(systems, system)?.sig, head)
}
