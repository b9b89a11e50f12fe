use serde::Serialize;

use super::model::MacroOverrides;
use crate::catalog::Macros;

/// Base targets alongside what the member actually follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveMacros {
    pub base: Macros,
    pub effective: Macros,
}

fn scaled(value: u32, factor: f64) -> u32 {
    // Half rounds up; inputs are non-negative.
    (f64::from(value) * factor).round() as u32
}

/// Each macro is its absolute override if set, otherwise the base value
/// scaled by the overlay's percentage.
pub fn compute_effective_macros(base: &Macros, overrides: &MacroOverrides) -> Macros {
    let factor = overrides.scale.factor();
    Macros {
        calories: overrides
            .calories
            .unwrap_or_else(|| scaled(base.calories, factor)),
        protein: overrides
            .protein
            .unwrap_or_else(|| scaled(base.protein, factor)),
        carbs: overrides.carbs.unwrap_or_else(|| scaled(base.carbs, factor)),
        fat: overrides.fat.unwrap_or_else(|| scaled(base.fat, factor)),
    }
}

/// One week of progression applied to already-effective targets.
pub(crate) fn step_week(current: &Macros, factor: f64) -> Macros {
    Macros {
        calories: scaled(current.calories, factor),
        protein: scaled(current.protein, factor),
        carbs: scaled(current.carbs, factor),
        fat: scaled(current.fat, factor),
    }
}
