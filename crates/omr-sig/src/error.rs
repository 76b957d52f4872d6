use omr_sig_core::{ScaleError, StaffId};

/// Inconsistent host input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("system {system}: unknown inter #{index}")]
    UnknownInter { system: usize, index: u32 },
    #[error("system {system}: inter #{index} is not a {expected}")]
    WrongKind {
        system: usize,
        index: u32,
        expected: &'static str,
    },
    #[error("system {system}: unknown staff {staff:?}")]
    UnknownStaff { system: usize, staff: StaffId },
    #[error("system {system}: no live bar for staff {staff:?} in stack {stack}")]
    EmptyStaffBarline {
        system: usize,
        stack: usize,
        staff: StaffId,
    },
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

#[derive(thiserror::Error, Debug)]
pub enum SheetIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Io(#[from] SheetIoError),
}
