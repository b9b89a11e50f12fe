//! Domain model and services for the gym back office.
//!
//! - [`catalog`]: diet and workout plan templates, TOML authoring, the
//!   embedded exercise library.
//! - [`ledger`]: member-to-plan assignments.
//! - [`overlay`]: per-member diet customization layered over a plan.
//! - [`bulk`]: selection state and fan-out over many plans.
//! - [`repository`]: storage ports with in-memory and Postgres adapters.

pub mod bulk;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod members;
pub mod overlay;
pub mod repository;
pub mod schedule;

pub use gymdash_db::models::{AssignmentStatus, MembershipStatus, OverlayStatus, PlanKind};
