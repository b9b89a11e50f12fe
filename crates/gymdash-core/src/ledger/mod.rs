//! Assignment ledger: which member follows which plan, when, and on which
//! days.

pub mod model;
pub mod service;

pub use model::{
    Assignment, AssignmentFilter, AssignmentPatch, AssignmentStats, AssignmentView,
    NewAssignmentBatch, NotifyChannels, UNKNOWN,
};
pub use service::AssignmentLedger;
