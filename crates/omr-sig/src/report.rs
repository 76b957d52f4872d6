use omr_sig_core::{HorizontalSide, Issue};
use omr_sig_dots::DotReport;
use omr_sig_graph::{BarStyle, GraphSnapshot, InterId, SystemInfo};
use omr_sig_slurs::SlurConnection;
use serde::{Deserialize, Serialize};

/// Aggregated view of one part barline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarlineView {
    pub stack: usize,
    pub part: usize,
    pub side: HorizontalSide,
    pub style: Option<BarStyle>,
    pub left_repeat: bool,
    pub right_repeat: bool,
}

impl BarlineView {
    pub(crate) fn collect(system: &SystemInfo) -> Vec<BarlineView> {
        let mut views = Vec::new();
        for (stack, measure_stack) in system.stacks.iter().enumerate() {
            for measure in &measure_stack.measures {
                for side in HorizontalSide::ALL {
                    if let Some(barline) = measure.barline(side) {
                        views.push(BarlineView {
                            stack,
                            part: measure.part,
                            side,
                            style: barline.style(),
                            left_repeat: barline.is_left_repeat(),
                            right_repeat: barline.is_right_repeat(),
                        });
                    }
                }
            }
        }
        views
    }
}

/// Resolution outcome of one system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub index: usize,
    pub dots: DotReport,
    pub slurs: Vec<InterId>,
    pub barlines: Vec<BarlineView>,
    pub graph: GraphSnapshot,
}

/// Resolution outcome of a whole sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
    pub systems: Vec<SystemReport>,
    pub connections: Vec<SlurConnection>,
    /// Every reported issue, system by system, then stitching issues.
    pub issues: Vec<Issue>,
}
