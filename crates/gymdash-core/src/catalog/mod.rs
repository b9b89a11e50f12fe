//! Plan catalog: templates, authoring format, exercise library, food
//! catalog.

pub mod exercises;
pub mod food;
pub mod model;
pub mod parser;
pub mod service;
pub mod toml_format;

pub use exercises::{ExerciseEntry, Mechanics, exercise_categories, find_exercises, load_exercises};
pub use food::{FoodCatalog, FoodCategory, FoodDraft, FoodEntry, FoodQuery};
pub use model::{
    Allergen, DietDetails, DietType, Difficulty, ExerciseSet, FoodItem, Goal, Macros, Meal,
    MealTime, PlanDetails, PlanTemplate, PlanWithMembers, UnknownVariant, WorkoutDetails,
};
pub use parser::{PlanDraft, PlanParseError, default_plan_days, parse_plan_toml};
pub use service::PlanCatalog;
pub use toml_format::PlanToml;
