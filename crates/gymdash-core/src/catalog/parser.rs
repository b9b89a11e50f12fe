//! Plan file parser.
//!
//! Turns a plan TOML string into a [`PlanDraft`], checking that:
//! - the name is not blank;
//! - every enum-like string names a known variant;
//! - the kind-specific fields are present for the declared kind;
//! - a diet plan has no exercises and a workout plan has no meals;
//! - meal times are not repeated.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::model::{
    Allergen, DietDetails, DietType, Difficulty, ExerciseSet, FoodItem, Goal, Meal, MealTime,
    PlanDetails, PlanTemplate, UnknownVariant, WorkoutDetails,
};
use super::toml_format::{DaysToml, FoodItemToml, PlanToml};
use crate::PlanKind;
use crate::schedule::{DayPreset, Weekday, WeekdaySet};

#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("plan name must not be blank")]
    BlankName,

    #[error("invalid plan kind {0:?} (expected diet or workout)")]
    InvalidKind(String),

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("invalid day {0:?}")]
    InvalidDay(String),

    #[error("invalid day preset {0:?}")]
    InvalidPreset(String),

    #[error("plan must be active on at least one day")]
    NoDays,

    #[error("{kind} plan is missing required field {field:?}")]
    MissingField { kind: PlanKind, field: &'static str },

    #[error("{kind} plan must not contain [[{section}]]")]
    UnexpectedSection {
        kind: PlanKind,
        section: &'static str,
    },

    #[error("meal time {0:?} appears more than once")]
    DuplicateMeal(MealTime),
}

/// A validated plan that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub name: String,
    pub goal: Goal,
    pub trainer: Option<String>,
    pub details: PlanDetails,
    pub default_active_days: WeekdaySet,
}

impl PlanDraft {
    pub fn into_template(self, now: DateTime<Utc>) -> PlanTemplate {
        PlanTemplate {
            id: Uuid::new_v4(),
            name: self.name,
            goal: self.goal,
            trainer: self.trainer,
            details: self.details,
            default_active_days: self.default_active_days,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Days used when a plan file does not say.
pub fn default_plan_days() -> WeekdaySet {
    DayPreset::MonWedFri.days()
}

/// Parse and validate a plan file.
pub fn parse_plan_toml(content: &str) -> Result<PlanDraft, PlanParseError> {
    let raw: PlanToml = toml::from_str(content)?;
    validate(raw)
}

fn validate(raw: PlanToml) -> Result<PlanDraft, PlanParseError> {
    let meta = raw.plan;

    let name = meta.name.trim().to_owned();
    if name.is_empty() {
        return Err(PlanParseError::BlankName);
    }

    let kind: PlanKind = meta
        .kind
        .parse()
        .map_err(|_| PlanParseError::InvalidKind(meta.kind.clone()))?;
    let goal: Goal = meta.goal.parse()?;

    let default_active_days = match meta.days {
        None => default_plan_days(),
        Some(DaysToml::Preset(p)) => p
            .parse::<DayPreset>()
            .map_err(|_| PlanParseError::InvalidPreset(p.clone()))?
            .days(),
        Some(DaysToml::List(names)) => {
            let mut set = WeekdaySet::EMPTY;
            for n in names {
                let day = n
                    .parse::<Weekday>()
                    .map_err(|_| PlanParseError::InvalidDay(n.clone()))?;
                set.insert(day);
            }
            set
        }
    };
    if default_active_days.is_empty() {
        return Err(PlanParseError::NoDays);
    }

    let details = match kind {
        PlanKind::Diet => {
            if !raw.exercises.is_empty() {
                return Err(PlanParseError::UnexpectedSection {
                    kind,
                    section: "exercises",
                });
            }
            let diet_type: DietType = meta
                .diet_type
                .ok_or(PlanParseError::MissingField {
                    kind,
                    field: "diet_type",
                })?
                .parse()?;
            let macros = meta.macros.ok_or(PlanParseError::MissingField {
                kind,
                field: "macros",
            })?;

            let mut seen = HashSet::new();
            let mut meals = Vec::with_capacity(raw.meals.len());
            for m in raw.meals {
                let time: MealTime = m.time.parse()?;
                if !seen.insert(time) {
                    return Err(PlanParseError::DuplicateMeal(time));
                }
                let items = m
                    .items
                    .into_iter()
                    .map(food_item)
                    .collect::<Result<Vec<_>, _>>()?;
                meals.push(Meal { time, items });
            }
            meals.sort_by_key(|m| m.time);

            PlanDetails::Diet(DietDetails {
                diet_type,
                target_calories: meta.target_calories.unwrap_or(macros.calories),
                macros,
                meals,
            })
        }
        PlanKind::Workout => {
            if !raw.meals.is_empty() {
                return Err(PlanParseError::UnexpectedSection {
                    kind,
                    section: "meals",
                });
            }
            let body_part = meta.body_part.ok_or(PlanParseError::MissingField {
                kind,
                field: "body_part",
            })?;
            let difficulty: Difficulty = meta
                .difficulty
                .ok_or(PlanParseError::MissingField {
                    kind,
                    field: "difficulty",
                })?
                .parse()?;
            let duration_minutes = meta.duration_minutes.ok_or(PlanParseError::MissingField {
                kind,
                field: "duration_minutes",
            })?;

            PlanDetails::Workout(WorkoutDetails {
                body_part,
                difficulty,
                duration_minutes,
                exercises: raw
                    .exercises
                    .into_iter()
                    .map(|e| ExerciseSet {
                        name: e.name,
                        sets: e.sets,
                        reps: e.reps,
                        rest_seconds: e.rest_seconds,
                    })
                    .collect(),
            })
        }
    };

    Ok(PlanDraft {
        name,
        goal,
        trainer: meta.trainer.filter(|t| !t.trim().is_empty()),
        details,
        default_active_days,
    })
}

fn food_item(raw: FoodItemToml) -> Result<FoodItem, PlanParseError> {
    let allergens = raw
        .allergens
        .iter()
        .map(|a| a.parse::<Allergen>())
        .collect::<Result<BTreeSet<_>, _>>()?;
    let diet_types = raw
        .diet_types
        .iter()
        .map(|d| d.parse::<DietType>())
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(FoodItem {
        name: raw.name,
        quantity: raw.quantity,
        calories: raw.calories,
        protein: raw.protein,
        carbs: raw.carbs,
        fat: raw.fat,
        allergens,
        diet_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KETO: &str = r#"
[plan]
kind = "diet"
name = "  Keto Cut  "
goal = "fat-loss"
trainer = "Priya"
days = "weekdays"
diet_type = "keto"
macros = { calories = 1800, protein = 150, carbs = 40, fat = 120 }

[[meals]]
time = "dinner"
items = [{ name = "Salmon", quantity = "200g", calories = 410, protein = 40.0, allergens = ["fish"] }]

[[meals]]
time = "breakfast"
items = [{ name = "Eggs", quantity = "3", calories = 210, allergens = ["eggs"], diet_types = ["keto", "vegetarian"] }]
"#;

    #[test]
    fn parses_diet_plan() {
        let draft = parse_plan_toml(KETO).unwrap();
        assert_eq!(draft.name, "Keto Cut");
        assert_eq!(draft.goal, Goal::FatLoss);
        assert_eq!(draft.default_active_days, DayPreset::Weekdays.days());

        let diet = draft.details.as_diet().unwrap();
        assert_eq!(diet.target_calories, 1800);
        let times: Vec<MealTime> = diet.meals.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![MealTime::Breakfast, MealTime::Dinner]);
        assert!(diet.meals[1].items[0].allergens.contains(&Allergen::Fish));
    }

    #[test]
    fn parses_workout_plan_with_default_days() {
        let draft = parse_plan_toml(
            r#"
[plan]
kind = "workout"
name = "Upper Body Power"
goal = "muscle-gain"
body_part = "Chest"
difficulty = "advanced"
duration_minutes = 60

[[exercises]]
name = "Bench Press"
sets = 5
reps = 5
rest_seconds = 180
"#,
        )
        .unwrap();
        assert_eq!(draft.default_active_days, default_plan_days());
        let workout = draft.details.as_workout().unwrap();
        assert_eq!(workout.difficulty, Difficulty::Advanced);
        assert_eq!(workout.exercises.len(), 1);
    }

    #[test]
    fn diet_without_macros_is_rejected() {
        let err = parse_plan_toml(
            r#"
[plan]
kind = "diet"
name = "Bare"
goal = "maintenance"
diet_type = "vegan"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlanParseError::MissingField {
                field: "macros",
                ..
            }
        ));
    }

    #[test]
    fn workout_with_meals_is_rejected() {
        let err = parse_plan_toml(
            r#"
[plan]
kind = "workout"
name = "Odd"
goal = "maintenance"
body_part = "Legs"
difficulty = "beginner"
duration_minutes = 30

[[meals]]
time = "lunch"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PlanParseError::UnexpectedSection {
                section: "meals",
                ..
            }
        ));
    }

    #[test]
    fn repeated_meal_time_is_rejected() {
        let err = parse_plan_toml(
            r#"
[plan]
kind = "diet"
name = "Twice"
goal = "maintenance"
diet_type = "vegan"
macros = { calories = 2000, protein = 100, carbs = 250, fat = 60 }

[[meals]]
time = "lunch"

[[meals]]
time = "lunch"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, PlanParseError::DuplicateMeal(MealTime::Lunch)));
    }

    #[test]
    fn unknown_values_are_reported() {
        let bad_goal = KETO.replace("fat-loss", "bulking");
        assert!(matches!(
            parse_plan_toml(&bad_goal).unwrap_err(),
            PlanParseError::UnknownVariant(_)
        ));

        let bad_days = KETO.replace(r#"days = "weekdays""#, r#"days = ["moonday"]"#);
        assert!(matches!(
            parse_plan_toml(&bad_days).unwrap_err(),
            PlanParseError::InvalidDay(_)
        ));

        let no_days = KETO.replace(r#"days = "weekdays""#, "days = []");
        assert!(matches!(
            parse_plan_toml(&no_days).unwrap_err(),
            PlanParseError::NoDays
        ));
    }
}
