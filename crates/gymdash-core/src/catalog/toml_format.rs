//! On-disk format for authored plan files.
//!
//! ```toml
//! [plan]
//! kind = "diet"
//! name = "Lean Cut"
//! goal = "fat-loss"
//! trainer = "Priya"
//! days = "weekdays"          # a preset, or a list: ["monday", "thursday"]
//! diet_type = "keto"
//! target_calories = 1800
//! macros = { calories = 1800, protein = 150, carbs = 60, fat = 100 }
//!
//! [[meals]]
//! time = "breakfast"
//! items = [{ name = "Eggs", quantity = "3 large", calories = 210, allergens = ["eggs"] }]
//! ```
//!
//! Workout files set `body_part`, `difficulty`, `duration_minutes` and list
//! `[[exercises]]` instead of meals. Enum-like fields are plain strings
//! here and are checked by the parser.

use serde::{Deserialize, Serialize};

use super::model::Macros;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanToml {
    pub plan: PlanMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meals: Vec<MealToml>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exercises: Vec<ExerciseToml>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanMeta {
    pub kind: String,
    pub name: String,
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<DaysToml>,

    // diet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,

    // workout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Either a preset name or an explicit list of days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DaysToml {
    Preset(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealToml {
    pub time: String,
    #[serde(default)]
    pub items: Vec<FoodItemToml>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItemToml {
    pub name: String,
    pub quantity: String,
    pub calories: u32,
    #[serde(default)]
    pub protein: f32,
    #[serde(default)]
    pub carbs: f32,
    #[serde(default)]
    pub fat: f32,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub diet_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseToml {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

fn default_rest_seconds() -> u32 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_accepts_preset_or_list() {
        let preset: PlanToml = toml::from_str(
            r#"
[plan]
kind = "workout"
name = "Legs"
goal = "muscle-gain"
days = "tts"
"#,
        )
        .unwrap();
        assert_eq!(preset.plan.days, Some(DaysToml::Preset("tts".into())));

        let list: PlanToml = toml::from_str(
            r#"
[plan]
kind = "workout"
name = "Legs"
goal = "muscle-gain"
days = ["tuesday", "friday"]
"#,
        )
        .unwrap();
        assert_eq!(
            list.plan.days,
            Some(DaysToml::List(vec!["tuesday".into(), "friday".into()]))
        );
    }

    #[test]
    fn exercise_rest_defaults_to_a_minute() {
        let plan: PlanToml = toml::from_str(
            r#"
[plan]
kind = "workout"
name = "Push"
goal = "muscle-gain"

[[exercises]]
name = "Bench Press"
sets = 4
reps = 8
"#,
        )
        .unwrap();
        assert_eq!(plan.exercises[0].rest_seconds, 60);
        assert!(plan.meals.is_empty());
    }
}
