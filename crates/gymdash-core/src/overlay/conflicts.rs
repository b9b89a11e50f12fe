//! Restriction checks against a plan's meals.
//!
//! Nothing is removed from the plan; the caller decides what to do with the
//! findings.

use serde::Serialize;

use super::model::Restrictions;
use crate::catalog::{Allergen, DietDetails, DietType, MealTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ConflictReason {
    Allergen { allergen: Allergen },
    ExcludedIngredient { ingredient: String },
    DietType { diet_type: DietType },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub meal: MealTime,
    pub item: String,
    #[serde(flatten)]
    pub reason: ConflictReason,
}

/// Every food item that clashes with the member's restrictions, in meal
/// order. One item can produce several conflicts.
///
/// Items with no diet tags are not checked against the diet type.
pub fn check_conflicts(diet: &DietDetails, restrictions: &Restrictions) -> Vec<Conflict> {
    let excluded: Vec<String> = restrictions
        .excluded_ingredients
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut out = Vec::new();
    for meal in &diet.meals {
        for item in &meal.items {
            let push = |out: &mut Vec<Conflict>, reason| {
                out.push(Conflict {
                    meal: meal.time,
                    item: item.name.clone(),
                    reason,
                })
            };

            for allergen in item.allergens.intersection(&restrictions.allergies) {
                push(&mut out, ConflictReason::Allergen {
                    allergen: *allergen,
                });
            }

            let name = item.name.to_lowercase();
            for ingredient in excluded.iter().filter(|ex| name.contains(ex.as_str())) {
                push(&mut out, ConflictReason::ExcludedIngredient {
                    ingredient: ingredient.clone(),
                });
            }

            if let Some(diet_type) = restrictions.diet_type {
                if !item.diet_types.is_empty() && !item.diet_types.contains(&diet_type) {
                    push(&mut out, ConflictReason::DietType { diet_type });
                }
            }
        }
    }
    out
}
