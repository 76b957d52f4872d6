//! Non-fatal issues reported to the host application.
//!
//! Nothing in the resolution core is fatal: a glyph that cannot be
//! interpreted, a slur without notes or a cross-system orphan only yields a
//! missing element plus an [`Issue`].

use crate::glyph::GlyphId;
use log::warn;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the issue is attached to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTarget {
    Glyph(GlyphId),
    Location(Point2<f32>),
}

/// One reported condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Index of the system the issue was found in.
    pub system: usize,
    pub target: IssueTarget,
    pub message: String,
}

impl Issue {
    pub fn glyph(system: usize, glyph: GlyphId, message: impl Into<String>) -> Self {
        Self {
            system,
            target: IssueTarget::Glyph(glyph),
            message: message.into(),
        }
    }

    pub fn at(system: usize, location: Point2<f32>, message: impl Into<String>) -> Self {
        Self {
            system,
            target: IssueTarget::Location(location),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            IssueTarget::Glyph(id) => write!(f, "system#{} {}: {}", self.system, id, self.message),
            IssueTarget::Location(p) => write!(
                f,
                "system#{} at ({:.0}, {:.0}): {}",
                self.system, p.x, p.y, self.message
            ),
        }
    }
}

/// Sink receiving non-fatal issues.
pub trait IssueSink {
    fn report_issue(&mut self, issue: Issue);
}

/// Collecting sink; every issue is also logged at warn level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Append all issues of `other`, keeping their order.
    pub fn extend(&mut self, other: IssueLog) {
        self.issues.extend(other.issues);
    }
}

impl IssueSink for IssueLog {
    fn report_issue(&mut self, issue: Issue) {
        warn!("{issue}");
        self.issues.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_report_order() {
        let mut log = IssueLog::new();
        log.report_issue(Issue::glyph(0, GlyphId(7), "first"));
        log.report_issue(Issue::at(1, Point2::new(3.0, 4.0), "second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.issues()[0].message, "first");
        assert_eq!(log.issues()[1].to_string(), "system#1 at (3, 4): second");
    }
}
