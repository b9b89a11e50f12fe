//! Query functions, one module per table.

pub mod assignments;
pub mod food;
pub mod members;
pub mod overlays;
pub mod plans;
