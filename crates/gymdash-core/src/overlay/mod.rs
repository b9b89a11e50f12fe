//! Per-member customization of a diet assignment.
//!
//! An overlay sits on top of one diet assignment and records how that
//! member's version differs from the shared plan: which days are active,
//! rest or cheat days, macro adjustments, dietary restrictions and
//! meal-level swaps. The plan itself is never written.

pub mod conflicts;
pub mod macros;
pub mod meals;
pub mod model;
pub mod progress;
pub mod service;

pub use conflicts::{Conflict, ConflictReason, check_conflicts};
pub use macros::{EffectiveMacros, compute_effective_macros};
pub use meals::resolve_day_meals;
pub use model::{
    CustomizationOverlay, Direction, MacroOverrides, MealOverride, MedicalTag, Progression,
    Restrictions, ScalePercentage,
};
pub use progress::{ProgressionRun, advance_overlay, run_progression};
pub use service::OverlayService;
