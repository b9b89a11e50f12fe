use super::model::CustomizationOverlay;
use crate::catalog::{DietDetails, Meal};
use crate::schedule::Weekday;

/// The plan's meals for `day` with the member's meal overrides applied.
///
/// A removed override drops that meal; any other override replaces the
/// meal's items, adding the meal if the plan has none at that time.
pub fn resolve_day_meals(diet: &DietDetails, overlay: &CustomizationOverlay, day: Weekday) -> Vec<Meal> {
    let mut meals = diet.meals.clone();
    for ov in overlay.meal_overrides.iter().filter(|o| o.day == day) {
        let pos = meals.iter().position(|m| m.time == ov.meal);
        match (pos, ov.removed) {
            (Some(i), true) => {
                meals.remove(i);
            }
            (None, true) => {}
            (Some(i), false) => meals[i].items = ov.items.clone(),
            (None, false) => meals.push(Meal {
                time: ov.meal,
                items: ov.items.clone(),
            }),
        }
    }
    meals.sort_by_key(|m| m.time);
    meals
}
