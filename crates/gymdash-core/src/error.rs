//! Error types shared by the services.
//!
//! Services return `anyhow::Result`. Rule violations are raised as a
//! [`ValidationError`] before anything is written, so callers can
//! `downcast_ref` to tell them apart from storage failures.

use thiserror::Error;
use uuid::Uuid;

use crate::PlanKind;

/// A request that breaks a domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least one member")]
    NoMembers,

    #[error("select at least one day")]
    NoActiveDays,

    #[error("plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("assignment {0} not found")]
    AssignmentNotFound(Uuid),

    #[error("member {0} not found")]
    MemberNotFound(Uuid),

    #[error("food {0} not found")]
    FoodNotFound(Uuid),

    #[error("food name must not be blank")]
    BlankFoodName,

    #[error("scale percentage {0} is outside 50..=150")]
    ScaleOutOfRange(u16),

    #[error("progressive change of {0}% per week is outside 1..=50")]
    ProgressionOutOfRange(u8),

    #[error("custom cycle length must be between 1 and 365 days, got {0}")]
    CycleOutOfRange(u16),

    #[error("assignment {0} is not a diet assignment; only diet plans can be customized")]
    NotDietAssignment(Uuid),

    #[error("plan {id} is a {actual} plan, expected {expected}")]
    WrongPlanKind {
        id: Uuid,
        expected: PlanKind,
        actual: PlanKind,
    },
}

/// Why a single item of a fan-out operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkItemError {
    #[error("cancelled before it started")]
    Cancelled,

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("{0}")]
    Backend(String),
}

impl BulkItemError {
    /// Capture a storage failure with its full context chain.
    pub fn backend(err: &anyhow::Error) -> Self {
        Self::Backend(format!("{err:#}"))
    }
}
